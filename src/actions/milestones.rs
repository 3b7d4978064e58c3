use tracing::info;
use validator::Validate;

use crate::db::Database;
use crate::error::Result;
use crate::models::{Milestone, MilestoneInput, MilestoneStatus};
use crate::validation::clean_optional;

fn normalize(input: MilestoneInput) -> MilestoneInput {
    MilestoneInput {
        title: input.title.trim().to_string(),
        description: clean_optional(input.description),
        ..input
    }
}

pub async fn list(db: &Database, user_id: i32, submission_id: i32) -> Result<Vec<Milestone>> {
    // 404 for a submission of another tenant rather than an empty list.
    db.get_submission(user_id, submission_id).await?;
    db.get_milestones(user_id, submission_id).await
}

pub async fn get(db: &Database, user_id: i32, id: i32) -> Result<Milestone> {
    db.get_milestone(user_id, id).await
}

pub async fn create(
    db: &Database,
    user_id: i32,
    submission_id: i32,
    input: MilestoneInput,
) -> Result<Milestone> {
    let input = normalize(input);
    input.validate()?;
    db.get_submission(user_id, submission_id).await?;

    let milestone = db.create_milestone(user_id, submission_id, &input).await?;
    info!(user_id, submission_id, milestone_id = milestone.id, "milestone added");
    Ok(milestone)
}

pub async fn update(db: &Database, user_id: i32, id: i32, input: MilestoneInput) -> Result<Milestone> {
    let input = normalize(input);
    input.validate()?;
    db.update_milestone(user_id, id, &input).await
}

pub async fn set_status(
    db: &Database,
    user_id: i32,
    id: i32,
    status: MilestoneStatus,
) -> Result<Milestone> {
    db.set_milestone_status(user_id, id, status).await
}

pub async fn delete(db: &Database, user_id: i32, id: i32) -> Result<()> {
    db.delete_milestone(user_id, id).await
}
