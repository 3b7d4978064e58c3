use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::extract::{CurrentUser, Payload};
use crate::actions::users;
use crate::error::Result;
use crate::models::{User, UserInput};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/me", get(me).put(update_me))
}

async fn register(
    State(state): State<AppState>,
    Payload(input): Payload<UserInput>,
) -> Result<(StatusCode, Json<User>)> {
    let user = users::register(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn me(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<User>> {
    Ok(Json(users::get(&state.db, user_id).await?))
}

async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Payload(input): Payload<UserInput>,
) -> Result<Json<User>> {
    Ok(Json(users::update(&state.db, user_id, input).await?))
}
