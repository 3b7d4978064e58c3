//! Project submissions and their milestones.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use super::documents::StatusFilter;
use super::extract::{CurrentUser, Payload};
use crate::actions::{milestones, submissions};
use crate::error::Result;
use crate::models::{
    Milestone, MilestoneInput, MilestoneStatus, ProjectSubmission, ProjectSubmissionInput,
    StatusChange, SubmissionStatus,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/submissions", get(list_submissions).post(create_submission))
        .route(
            "/submissions/:id",
            get(get_submission).put(update_submission).delete(delete_submission),
        )
        .route("/submissions/:id/status", put(set_submission_status))
        .route(
            "/submissions/:id/milestones",
            get(list_milestones).post(create_milestone),
        )
        .route("/submissions/:id/milestones/generate", post(generate_milestones))
        .route(
            "/milestones/:id",
            get(get_milestone).put(update_milestone).delete(delete_milestone),
        )
        .route("/milestones/:id/status", put(set_milestone_status))
}

async fn list_submissions(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(filter): Query<StatusFilter<SubmissionStatus>>,
) -> Result<Json<Vec<ProjectSubmission>>> {
    Ok(Json(submissions::list(&state.db, user_id, filter.status).await?))
}

async fn get_submission(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ProjectSubmission>> {
    Ok(Json(submissions::get(&state.db, user_id, id).await?))
}

async fn create_submission(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Payload(input): Payload<ProjectSubmissionInput>,
) -> Result<(StatusCode, Json<ProjectSubmission>)> {
    let submission = submissions::create(&state.db, user_id, input).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

async fn update_submission(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
    Payload(input): Payload<ProjectSubmissionInput>,
) -> Result<Json<ProjectSubmission>> {
    Ok(Json(submissions::update(&state.db, user_id, id, input).await?))
}

async fn set_submission_status(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
    Payload(change): Payload<StatusChange<SubmissionStatus>>,
) -> Result<Json<ProjectSubmission>> {
    Ok(Json(submissions::set_status(&state.db, user_id, id, change.status).await?))
}

async fn delete_submission(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    submissions::delete(&state.db, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_milestones(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(submission_id): Path<i32>,
) -> Result<Json<Vec<Milestone>>> {
    Ok(Json(milestones::list(&state.db, user_id, submission_id).await?))
}

async fn create_milestone(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(submission_id): Path<i32>,
    Payload(input): Payload<MilestoneInput>,
) -> Result<(StatusCode, Json<Milestone>)> {
    let milestone = milestones::create(&state.db, user_id, submission_id, input).await?;
    Ok((StatusCode::CREATED, Json(milestone)))
}

async fn generate_milestones(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(submission_id): Path<i32>,
) -> Result<Json<Vec<Milestone>>> {
    Ok(Json(submissions::generate_milestones(&state, user_id, submission_id).await?))
}

async fn get_milestone(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<Milestone>> {
    Ok(Json(milestones::get(&state.db, user_id, id).await?))
}

async fn update_milestone(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
    Payload(input): Payload<MilestoneInput>,
) -> Result<Json<Milestone>> {
    Ok(Json(milestones::update(&state.db, user_id, id, input).await?))
}

async fn set_milestone_status(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
    Payload(change): Payload<StatusChange<MilestoneStatus>>,
) -> Result<Json<Milestone>> {
    Ok(Json(milestones::set_status(&state.db, user_id, id, change.status).await?))
}

async fn delete_milestone(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    milestones::delete(&state.db, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
