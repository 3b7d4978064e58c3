use chrono::Utc;
use serde::Serialize;

use crate::db::{DashboardStats, Database};
use crate::error::Result;
use crate::models::{Appointment, Invoice, Product};

const RECENT_LIMIT: usize = 5;

/// Everything the dashboard page shows.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_invoices: Vec<Invoice>,
    pub upcoming_appointments: Vec<Appointment>,
    pub low_stock: Vec<Product>,
}

pub async fn load(db: &Database, user_id: i32) -> Result<Dashboard> {
    let stats = db.get_dashboard_stats(user_id).await?;

    let mut recent_invoices = db.get_invoices(user_id, None).await?;
    recent_invoices.truncate(RECENT_LIMIT);

    let upcoming_appointments = db
        .get_upcoming_appointments(user_id, Utc::now().naive_utc(), RECENT_LIMIT as i64)
        .await?;
    let low_stock = db.get_low_stock_products(user_id).await?;

    Ok(Dashboard {
        stats,
        recent_invoices,
        upcoming_appointments,
        low_stock,
    })
}
