//! Invoices and quotes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::extract::{CurrentUser, Payload};
use crate::actions::{self, invoices, quotes};
use crate::error::Result;
use crate::models::{
    Invoice, InvoiceInput, InvoiceStatus, InvoiceWithItems, Quote, QuoteInput, QuoteStatus,
    QuoteWithItems, StatusChange, Transaction,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route("/invoices/next-number", get(next_invoice_number))
        .route("/invoices/overdue", post(sweep_overdue))
        .route(
            "/invoices/:id",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
        .route("/invoices/:id/status", put(set_invoice_status))
        .route("/invoices/:id/pay", post(pay_invoice))
        .route("/invoices/:id/email", post(email_invoice))
        .route("/quotes", get(list_quotes).post(create_quote))
        .route("/quotes/next-number", get(next_quote_number))
        .route(
            "/quotes/:id",
            get(get_quote).put(update_quote).delete(delete_quote),
        )
        .route("/quotes/:id/status", put(set_quote_status))
        .route("/quotes/:id/convert", post(convert_quote))
        .route("/quotes/:id/email", post(email_quote))
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter<S> {
    pub status: Option<S>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PayRequest {
    pub paid_on: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EmailRequest {
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OverdueRequest {
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct NextNumber {
    pub number: String,
}

#[derive(Debug, Serialize)]
pub struct PaidInvoice {
    pub invoice: Invoice,
    pub transaction: Transaction,
}

async fn list_invoices(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(filter): Query<StatusFilter<InvoiceStatus>>,
) -> Result<Json<Vec<Invoice>>> {
    Ok(Json(invoices::list(&state.db, user_id, filter.status).await?))
}

async fn next_invoice_number(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<NextNumber>> {
    let number = invoices::next_invoice_number(&state.db, user_id).await?;
    Ok(Json(NextNumber { number }))
}

async fn get_invoice(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<InvoiceWithItems>> {
    Ok(Json(invoices::get(&state.db, user_id, id).await?))
}

async fn create_invoice(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Payload(input): Payload<InvoiceInput>,
) -> Result<(StatusCode, Json<InvoiceWithItems>)> {
    let invoice = invoices::create(&state.db, user_id, input).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

async fn update_invoice(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
    Payload(input): Payload<InvoiceInput>,
) -> Result<Json<InvoiceWithItems>> {
    Ok(Json(invoices::update(&state.db, user_id, id, input).await?))
}

async fn set_invoice_status(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
    Payload(change): Payload<StatusChange<InvoiceStatus>>,
) -> Result<Json<Invoice>> {
    Ok(Json(invoices::set_status(&state.db, user_id, id, change.status).await?))
}

async fn pay_invoice(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
    body: Option<Payload<PayRequest>>,
) -> Result<Json<PaidInvoice>> {
    let Payload(request) = body.unwrap_or(Payload(PayRequest::default()));
    let (invoice, transaction) = invoices::mark_paid(&state.db, user_id, id, request.paid_on).await?;
    Ok(Json(PaidInvoice { invoice, transaction }))
}

async fn sweep_overdue(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    body: Option<Payload<OverdueRequest>>,
) -> Result<Json<Vec<Invoice>>> {
    let Payload(request) = body.unwrap_or(Payload(OverdueRequest::default()));
    let today = request.today.unwrap_or_else(actions::today);
    Ok(Json(invoices::sweep_overdue(&state.db, user_id, today).await?))
}

async fn email_invoice(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
    body: Option<Payload<EmailRequest>>,
) -> Result<Json<Invoice>> {
    let Payload(request) = body.unwrap_or(Payload(EmailRequest::default()));
    Ok(Json(invoices::email(&state, user_id, id, request.message).await?))
}

async fn delete_invoice(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    invoices::delete(&state.db, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_quotes(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(filter): Query<StatusFilter<QuoteStatus>>,
) -> Result<Json<Vec<Quote>>> {
    Ok(Json(quotes::list(&state.db, user_id, filter.status).await?))
}

async fn next_quote_number(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<NextNumber>> {
    let number = quotes::next_quote_number(&state.db, user_id).await?;
    Ok(Json(NextNumber { number }))
}

async fn get_quote(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<QuoteWithItems>> {
    Ok(Json(quotes::get(&state.db, user_id, id).await?))
}

async fn create_quote(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Payload(input): Payload<QuoteInput>,
) -> Result<(StatusCode, Json<QuoteWithItems>)> {
    let quote = quotes::create(&state.db, user_id, input).await?;
    Ok((StatusCode::CREATED, Json(quote)))
}

async fn update_quote(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
    Payload(input): Payload<QuoteInput>,
) -> Result<Json<QuoteWithItems>> {
    Ok(Json(quotes::update(&state.db, user_id, id, input).await?))
}

async fn set_quote_status(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
    Payload(change): Payload<StatusChange<QuoteStatus>>,
) -> Result<Json<Quote>> {
    Ok(Json(quotes::set_status(&state.db, user_id, id, change.status).await?))
}

async fn convert_quote(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<InvoiceWithItems>)> {
    let invoice = quotes::convert_to_invoice(&state.db, user_id, id).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

async fn email_quote(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
    body: Option<Payload<EmailRequest>>,
) -> Result<Json<Quote>> {
    let Payload(request) = body.unwrap_or(Payload(EmailRequest::default()));
    Ok(Json(quotes::email(&state, user_id, id, request.message).await?))
}

async fn delete_quote(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    quotes::delete(&state.db, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
