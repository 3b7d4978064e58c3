use tracing::{info, warn};
use validator::Validate;

use super::today;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Milestone, ProjectSubmission, ProjectSubmissionInput, SubmissionStatus};
use crate::state::AppState;

fn normalize(input: ProjectSubmissionInput) -> ProjectSubmissionInput {
    ProjectSubmissionInput {
        title: input.title.trim().to_string(),
        description: input.description.trim().to_string(),
        client_name: input.client_name.trim().to_string(),
        client_email: input.client_email.trim().to_string(),
        ..input
    }
}

pub async fn list(
    db: &Database,
    user_id: i32,
    status: Option<SubmissionStatus>,
) -> Result<Vec<ProjectSubmission>> {
    db.get_submissions(user_id, status).await
}

pub async fn get(db: &Database, user_id: i32, id: i32) -> Result<ProjectSubmission> {
    db.get_submission(user_id, id).await
}

pub async fn create(
    db: &Database,
    user_id: i32,
    input: ProjectSubmissionInput,
) -> Result<ProjectSubmission> {
    let input = normalize(input);
    input.validate()?;
    let submission = db.create_submission(user_id, &input).await?;
    info!(user_id, submission_id = submission.id, "project submission received");
    Ok(submission)
}

pub async fn update(
    db: &Database,
    user_id: i32,
    id: i32,
    input: ProjectSubmissionInput,
) -> Result<ProjectSubmission> {
    let input = normalize(input);
    input.validate()?;
    db.update_submission(user_id, id, &input).await
}

pub async fn set_status(
    db: &Database,
    user_id: i32,
    id: i32,
    status: SubmissionStatus,
) -> Result<ProjectSubmission> {
    let submission = db.set_submission_status(user_id, id, status).await?;
    info!(user_id, submission_id = id, status = %status, "submission status changed");
    Ok(submission)
}

pub async fn delete(db: &Database, user_id: i32, id: i32) -> Result<()> {
    db.delete_submission(user_id, id).await
}

/// Ask the LLM for a milestone plan and replace the submission's
/// milestones with it.
pub async fn generate_milestones(state: &AppState, user_id: i32, id: i32) -> Result<Vec<Milestone>> {
    if !state.planner.is_configured() {
        return Err(Error::Config("LLM_API_KEY is not set".to_string()));
    }
    let submission = state.db.get_submission(user_id, id).await?;
    if submission.status == SubmissionStatus::Rejected {
        warn!(user_id, submission_id = id, "generating milestones for a rejected submission");
    }

    let drafts = state.planner.plan(&submission, today()).await?;
    let milestones = state.db.replace_milestones(user_id, id, &drafts).await?;
    info!(user_id, submission_id = id, count = milestones.len(), "milestones generated");
    Ok(milestones)
}
