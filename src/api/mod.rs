//! HTTP JSON API.
//!
//! Routes live under `/api`; the acting tenant is read from the
//! `x-user-id` header by [`extract::CurrentUser`].

pub mod appointments;
pub mod blogs;
pub mod catalog;
pub mod documents;
pub mod extract;
pub mod ledger;
pub mod projects;
pub mod users;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use validator::Validate;

use crate::error::Result;
use crate::models::LineItemInput;
use crate::state::AppState;
use crate::totals::{self, Adjustment, Totals};
use crate::validation::adjustment_in_range;

/// Build the application router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(users::routes())
        .merge(catalog::routes())
        .merge(documents::routes())
        .merge(appointments::routes())
        .merge(blogs::routes(state.image_host.max_bytes()))
        .merge(projects::routes())
        .merge(ledger::routes())
        .route("/totals/preview", post(preview_totals));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct TotalsPreview {
    pub items: Vec<LineItemInput>,
    #[serde(default = "Adjustment::none")]
    #[validate(custom(function = "adjustment_in_range"))]
    pub discount: Adjustment,
    #[serde(default = "Adjustment::none")]
    #[validate(custom(function = "adjustment_in_range"))]
    pub tax: Adjustment,
}

/// Live totals for a document being edited. Nothing is stored.
async fn preview_totals(
    extract::Payload(preview): extract::Payload<TotalsPreview>,
) -> Result<Json<Totals>> {
    preview.validate()?;

    Ok(Json(totals::calculate(
        preview.items.iter().map(LineItemInput::line),
        preview.discount,
        preview.tax,
    )))
}
