//! Bookkeeping entries and the dashboard.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;

use super::extract::{CurrentUser, Payload};
use crate::actions::dashboard::{self, Dashboard};
use crate::actions::transactions;
use crate::error::Result;
use crate::models::{Transaction, TransactionInput, TransactionSummary};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list).post(create))
        .route("/transactions/summary", get(summary))
        .route("/transactions/:id", get(show).put(update).delete(remove))
        .route("/dashboard", get(load_dashboard))
}

#[derive(Debug, Default, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

async fn list(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(range): Query<DateRange>,
) -> Result<Json<Vec<Transaction>>> {
    Ok(Json(transactions::list(&state.db, user_id, range.from, range.to).await?))
}

async fn summary(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(range): Query<DateRange>,
) -> Result<Json<TransactionSummary>> {
    Ok(Json(transactions::summary(&state.db, user_id, range.from, range.to).await?))
}

async fn show(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<Transaction>> {
    Ok(Json(transactions::get(&state.db, user_id, id).await?))
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Payload(input): Payload<TransactionInput>,
) -> Result<(StatusCode, Json<Transaction>)> {
    let transaction = transactions::create(&state.db, user_id, input).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

async fn update(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
    Payload(input): Payload<TransactionInput>,
) -> Result<Json<Transaction>> {
    Ok(Json(transactions::update(&state.db, user_id, id, input).await?))
}

async fn remove(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    transactions::delete(&state.db, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn load_dashboard(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Dashboard>> {
    Ok(Json(dashboard::load(&state.db, user_id).await?))
}
