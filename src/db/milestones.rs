use chrono::NaiveDate;

use super::Database;
use crate::error::{Error, Result};
use crate::models::{Milestone, MilestoneInput, MilestoneStatus};

fn db_err(err: sqlx::Error) -> Error {
    Error::from_db("Milestone", err)
}

/// A milestone ready to insert, e.g. from generated output.
#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneDraft {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub amount: Option<f64>,
}

impl Database {
    pub async fn get_milestones(&self, user_id: i32, submission_id: i32) -> Result<Vec<Milestone>> {
        sqlx::query_as::<_, Milestone>(
            r#"
            SELECT * FROM milestones
            WHERE user_id = $1 AND submission_id = $2
            ORDER BY position ASC, id ASC
            "#,
        )
        .bind(user_id)
        .bind(submission_id)
        .fetch_all(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn get_milestone(&self, user_id: i32, id: i32) -> Result<Milestone> {
        sqlx::query_as::<_, Milestone>("SELECT * FROM milestones WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_one(self.get_pool())
            .await
            .map_err(db_err)
    }

    pub async fn create_milestone(
        &self,
        user_id: i32,
        submission_id: i32,
        milestone: &MilestoneInput,
    ) -> Result<Milestone> {
        sqlx::query_as::<_, Milestone>(
            r#"
            INSERT INTO milestones
                (user_id, submission_id, title, description, due_date, amount, position, status)
            VALUES ($1, $2, $3, $4, $5, $6,
                    COALESCE($7, (SELECT COALESCE(MAX(position) + 1, 0) FROM milestones WHERE submission_id = $2)),
                    $8)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(submission_id)
        .bind(&milestone.title)
        .bind(&milestone.description)
        .bind(milestone.due_date)
        .bind(milestone.amount)
        .bind(milestone.position)
        .bind(milestone.status.unwrap_or(MilestoneStatus::Pending))
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn update_milestone(
        &self,
        user_id: i32,
        id: i32,
        milestone: &MilestoneInput,
    ) -> Result<Milestone> {
        sqlx::query_as::<_, Milestone>(
            r#"
            UPDATE milestones
            SET title = $1, description = $2, due_date = $3, amount = $4,
                position = COALESCE($5, position), status = COALESCE($6, status),
                updated_at = now()
            WHERE id = $7 AND user_id = $8
            RETURNING *
            "#,
        )
        .bind(&milestone.title)
        .bind(&milestone.description)
        .bind(milestone.due_date)
        .bind(milestone.amount)
        .bind(milestone.position)
        .bind(milestone.status)
        .bind(id)
        .bind(user_id)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn set_milestone_status(
        &self,
        user_id: i32,
        id: i32,
        status: MilestoneStatus,
    ) -> Result<Milestone> {
        sqlx::query_as::<_, Milestone>(
            r#"
            UPDATE milestones SET status = $1, updated_at = now()
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

    /// Replace all milestones of a submission in one transaction.
    pub async fn replace_milestones(
        &self,
        user_id: i32,
        submission_id: i32,
        drafts: &[MilestoneDraft],
    ) -> Result<Vec<Milestone>> {
        let mut tx = self.get_pool().begin().await.map_err(db_err)?;

        sqlx::query("DELETE FROM milestones WHERE user_id = $1 AND submission_id = $2")
            .bind(user_id)
            .bind(submission_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let mut saved = Vec::with_capacity(drafts.len());
        for (position, draft) in drafts.iter().enumerate() {
            let milestone = sqlx::query_as::<_, Milestone>(
                r#"
                INSERT INTO milestones
                    (user_id, submission_id, title, description, due_date, amount, position, status)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
                "#,
            )
            .bind(user_id)
            .bind(submission_id)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(draft.due_date)
            .bind(draft.amount)
            .bind(position as i32)
            .bind(MilestoneStatus::Pending)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;
            saved.push(milestone);
        }

        tx.commit().await.map_err(db_err)?;
        Ok(saved)
    }

    pub async fn delete_milestone(&self, user_id: i32, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM milestones WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.get_pool())
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Milestone".to_string()));
        }
        Ok(())
    }
}
