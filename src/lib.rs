//! Ledgerly: a multi-tenant back office for small businesses.
//!
//! Customers, suppliers, inventory, invoices and quotes, appointments,
//! blog posts, project submissions with milestones and bookkeeping, served
//! as a JSON API over Postgres.

#[macro_use]
mod text_enum;

pub mod actions;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod seed;
pub mod services;
pub mod state;
pub mod totals;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;
