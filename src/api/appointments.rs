use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::{NaiveDateTime, Utc};
use serde::Deserialize;

use super::extract::{CurrentUser, Payload};
use crate::actions::appointments;
use crate::error::Result;
use crate::models::{Appointment, AppointmentInput, AppointmentStatus, StatusChange};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/appointments", get(list).post(create))
        .route("/appointments/upcoming", get(upcoming))
        .route("/appointments/:id", get(show).put(update).delete(remove))
        .route("/appointments/:id/status", put(set_status))
}

#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    pub from: Option<NaiveDateTime>,
    pub limit: Option<i64>,
}

async fn list(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Appointment>>> {
    Ok(Json(appointments::list(&state.db, user_id).await?))
}

async fn upcoming(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<UpcomingQuery>,
) -> Result<Json<Vec<Appointment>>> {
    let from = query.from.unwrap_or_else(|| Utc::now().naive_utc());
    Ok(Json(appointments::upcoming(&state.db, user_id, from, query.limit).await?))
}

async fn show(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<Appointment>> {
    Ok(Json(appointments::get(&state.db, user_id, id).await?))
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Payload(input): Payload<AppointmentInput>,
) -> Result<(StatusCode, Json<Appointment>)> {
    let appointment = appointments::create(&state.db, user_id, input).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

async fn update(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
    Payload(input): Payload<AppointmentInput>,
) -> Result<Json<Appointment>> {
    Ok(Json(appointments::update(&state.db, user_id, id, input).await?))
}

async fn set_status(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
    Payload(change): Payload<StatusChange<AppointmentStatus>>,
) -> Result<Json<Appointment>> {
    Ok(Json(appointments::set_status(&state.db, user_id, id, change.status).await?))
}

async fn remove(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    appointments::delete(&state.db, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
