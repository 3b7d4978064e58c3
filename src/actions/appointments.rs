use chrono::NaiveDateTime;
use tracing::info;
use validator::Validate;

use super::{ensure_customer, missing_reference};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Appointment, AppointmentInput, AppointmentStatus};
use crate::validation::clean_optional;

pub const DEFAULT_UPCOMING_LIMIT: i64 = 10;
const MAX_UPCOMING_LIMIT: i64 = 100;

fn normalize(input: AppointmentInput) -> AppointmentInput {
    AppointmentInput {
        title: input.title.trim().to_string(),
        notes: clean_optional(input.notes),
        ..input
    }
}

async fn check_references(db: &Database, user_id: i32, input: &AppointmentInput) -> Result<()> {
    ensure_customer(db, user_id, input.customer_id).await?;
    if let Some(service_id) = input.service_id {
        db.get_service(user_id, service_id)
            .await
            .map_err(|e| missing_reference("service_id", e))?;
    }
    Ok(())
}

/// Fail when the slot collides with another live appointment.
async fn ensure_free(
    db: &Database,
    user_id: i32,
    starts_at: NaiveDateTime,
    ends_at: NaiveDateTime,
    exclude_id: Option<i32>,
) -> Result<()> {
    let clashes = db
        .get_overlapping_appointments(user_id, starts_at, ends_at, exclude_id)
        .await?;
    match clashes.first() {
        None => Ok(()),
        Some(clash) => Err(Error::Conflict(format!(
            "time slot overlaps with '{}' ({} - {})",
            clash.title,
            clash.starts_at.format("%Y-%m-%d %H:%M"),
            clash.ends_at.format("%H:%M")
        ))),
    }
}

pub async fn list(db: &Database, user_id: i32) -> Result<Vec<Appointment>> {
    db.get_appointments(user_id).await
}

/// Live appointments starting at or after `from`, soonest first.
pub async fn upcoming(
    db: &Database,
    user_id: i32,
    from: NaiveDateTime,
    limit: Option<i64>,
) -> Result<Vec<Appointment>> {
    let limit = limit.unwrap_or(DEFAULT_UPCOMING_LIMIT).clamp(1, MAX_UPCOMING_LIMIT);
    db.get_upcoming_appointments(user_id, from, limit).await
}

pub async fn get(db: &Database, user_id: i32, id: i32) -> Result<Appointment> {
    db.get_appointment(user_id, id).await
}

pub async fn create(db: &Database, user_id: i32, input: AppointmentInput) -> Result<Appointment> {
    let input = normalize(input);
    input.validate()?;
    check_references(db, user_id, &input).await?;

    let status = input.status.unwrap_or(AppointmentStatus::Scheduled);
    if status.blocks_slot() {
        ensure_free(db, user_id, input.starts_at, input.ends_at, None).await?;
    }

    let appointment = db.create_appointment(user_id, &input, status).await?;
    info!(
        user_id,
        appointment_id = appointment.id,
        starts_at = %appointment.starts_at,
        "appointment booked"
    );
    Ok(appointment)
}

pub async fn update(
    db: &Database,
    user_id: i32,
    id: i32,
    input: AppointmentInput,
) -> Result<Appointment> {
    let input = normalize(input);
    input.validate()?;

    let current = db.get_appointment(user_id, id).await?;
    let status = input.status.unwrap_or(current.status);
    if !current.status.can_transition_to(status) {
        return Err(transition_error(current.status, status));
    }
    check_references(db, user_id, &input).await?;
    if status.blocks_slot() {
        ensure_free(db, user_id, input.starts_at, input.ends_at, Some(id)).await?;
    }

    db.update_appointment(user_id, id, &input, status).await
}

fn transition_error(from: AppointmentStatus, to: AppointmentStatus) -> Error {
    Error::Conflict(format!("appointment cannot move from {} to {}", from, to))
}

pub async fn set_status(
    db: &Database,
    user_id: i32,
    id: i32,
    status: AppointmentStatus,
) -> Result<Appointment> {
    let current = db.get_appointment(user_id, id).await?;
    if current.status == status {
        return Ok(current);
    }
    if !current.status.can_transition_to(status) {
        return Err(transition_error(current.status, status));
    }

    let appointment = db.set_appointment_status(user_id, id, status).await?;
    info!(user_id, appointment_id = id, from = %current.status, to = %status, "appointment status changed");
    Ok(appointment)
}

pub async fn delete(db: &Database, user_id: i32, id: i32) -> Result<()> {
    db.delete_appointment(user_id, id).await
}
