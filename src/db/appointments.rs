use chrono::NaiveDateTime;

use super::Database;
use crate::error::{Error, Result};
use crate::models::{Appointment, AppointmentInput, AppointmentStatus};

fn db_err(err: sqlx::Error) -> Error {
    Error::from_db("Appointment", err)
}

impl Database {
    pub async fn get_appointments(&self, user_id: i32) -> Result<Vec<Appointment>> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE user_id = $1 ORDER BY starts_at ASC",
        )
        .bind(user_id)
        .fetch_all(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn get_upcoming_appointments(
        &self,
        user_id: i32,
        from: NaiveDateTime,
        limit: i64,
    ) -> Result<Vec<Appointment>> {
        sqlx::query_as::<_, Appointment>(
            r#"
            SELECT * FROM appointments
            WHERE user_id = $1 AND starts_at >= $2 AND status IN ('scheduled', 'confirmed')
            ORDER BY starts_at ASC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(limit)
        .fetch_all(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn get_appointment(&self, user_id: i32, id: i32) -> Result<Appointment> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    /// Slot-holding appointments intersecting `[starts_at, ends_at)`,
    /// ignoring `exclude_id` (the appointment being edited).
    pub async fn get_overlapping_appointments(
        &self,
        user_id: i32,
        starts_at: NaiveDateTime,
        ends_at: NaiveDateTime,
        exclude_id: Option<i32>,
    ) -> Result<Vec<Appointment>> {
        sqlx::query_as::<_, Appointment>(
            r#"
            SELECT * FROM appointments
            WHERE user_id = $1
              AND starts_at < $3 AND $2 < ends_at
              AND status IN ('scheduled', 'confirmed')
              AND ($4::int IS NULL OR id <> $4)
            ORDER BY starts_at ASC
            "#,
        )
        .bind(user_id)
        .bind(starts_at)
        .bind(ends_at)
        .bind(exclude_id)
        .fetch_all(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn create_appointment(
        &self,
        user_id: i32,
        appointment: &AppointmentInput,
        status: AppointmentStatus,
    ) -> Result<Appointment> {
        sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments
                (user_id, customer_id, service_id, title, starts_at, ends_at, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(appointment.customer_id)
        .bind(appointment.service_id)
        .bind(&appointment.title)
        .bind(appointment.starts_at)
        .bind(appointment.ends_at)
        .bind(status)
        .bind(&appointment.notes)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn update_appointment(
        &self,
        user_id: i32,
        id: i32,
        appointment: &AppointmentInput,
        status: AppointmentStatus,
    ) -> Result<Appointment> {
        sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments
            SET customer_id = $1, service_id = $2, title = $3, starts_at = $4, ends_at = $5,
                status = $6, notes = $7, updated_at = now()
            WHERE id = $8 AND user_id = $9
            RETURNING *
            "#,
        )
        .bind(appointment.customer_id)
        .bind(appointment.service_id)
        .bind(&appointment.title)
        .bind(appointment.starts_at)
        .bind(appointment.ends_at)
        .bind(status)
        .bind(&appointment.notes)
        .bind(id)
        .bind(user_id)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn set_appointment_status(
        &self,
        user_id: i32,
        id: i32,
        status: AppointmentStatus,
    ) -> Result<Appointment> {
        sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments SET status = $1, updated_at = now()
            WHERE id = $2 AND user_id = $3
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(id)
        .bind(user_id)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn delete_appointment(&self, user_id: i32, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.get_pool())
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Appointment".to_string()));
        }
        Ok(())
    }
}
