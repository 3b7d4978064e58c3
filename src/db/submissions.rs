use super::Database;
use crate::error::{Error, Result};
use crate::models::{ProjectSubmission, ProjectSubmissionInput, SubmissionStatus};

fn db_err(err: sqlx::Error) -> Error {
    Error::from_db("Project submission", err)
}

impl Database {
    pub async fn get_submissions(
        &self,
        user_id: i32,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<ProjectSubmission>> {
        sqlx::query_as::<_, ProjectSubmission>(
            r#"
            SELECT * FROM project_submissions
            WHERE user_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_all(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn get_submission(&self, user_id: i32, id: i32) -> Result<ProjectSubmission> {
        sqlx::query_as::<_, ProjectSubmission>(
            "SELECT * FROM project_submissions WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn create_submission(
        &self,
        user_id: i32,
        submission: &ProjectSubmissionInput,
    ) -> Result<ProjectSubmission> {
        sqlx::query_as::<_, ProjectSubmission>(
            r#"
            INSERT INTO project_submissions
                (user_id, title, description, client_name, client_email, budget, deadline, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&submission.title)
        .bind(&submission.description)
        .bind(&submission.client_name)
        .bind(&submission.client_email)
        .bind(submission.budget)
        .bind(submission.deadline)
        .bind(SubmissionStatus::Pending)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn update_submission(
        &self,
        user_id: i32,
        id: i32,
        submission: &ProjectSubmissionInput,
    ) -> Result<ProjectSubmission> {
        sqlx::query_as::<_, ProjectSubmission>(
            r#"
            UPDATE project_submissions
            SET title = $1, description = $2, client_name = $3, client_email = $4,
                budget = $5, deadline = $6, updated_at = now()
            WHERE id = $7 AND user_id = $8
            RETURNING *
            "#,
        )
        .bind(&submission.title)
        .bind(&submission.description)
        .bind(&submission.client_name)
        .bind(&submission.client_email)
        .bind(submission.budget)
        .bind(submission.deadline)
        .bind(id)
        .bind(user_id)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn set_submission_status(
        &self,
        user_id: i32,
        id: i32,
        status: SubmissionStatus,
    ) -> Result<ProjectSubmission> {
        sqlx::query_as::<_, ProjectSubmission>(
            r#"
            UPDATE project_submissions SET status = $1, updated_at = now()
            WHERE id = $2 AND user_id = $3
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(id)
        .bind(user_id)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn delete_submission(&self, user_id: i32, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM project_submissions WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.get_pool())
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Project submission".to_string()));
        }
        Ok(())
    }
}
