use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use validator::{Validate, ValidationError};

use crate::validation::rule;

text_enum! {
    pub enum AppointmentStatus {
        Scheduled => "scheduled",
        Confirmed => "confirmed",
        Completed => "completed",
        Cancelled => "cancelled",
        NoShow => "no_show",
    }
}

impl AppointmentStatus {
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::NoShow
        )
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        *self == next || !self.is_final()
    }

    /// Whether the appointment still occupies its time slot.
    pub fn blocks_slot(&self) -> bool {
        matches!(self, AppointmentStatus::Scheduled | AppointmentStatus::Confirmed)
    }
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Appointment {
    pub id: i32,
    pub user_id: i32,
    pub customer_id: i32,
    pub service_id: Option<i32>,
    pub title: String,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Half-open interval overlap: back-to-back bookings do not collide.
    pub fn overlaps(&self, starts_at: NaiveDateTime, ends_at: NaiveDateTime) -> bool {
        self.starts_at < ends_at && starts_at < self.ends_at
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "ends_after_start", skip_on_field_errors = false))]
pub struct AppointmentInput {
    pub customer_id: i32,
    pub service_id: Option<i32>,
    #[validate(length(min = 1, max = 200, message = "is required (at most 200 characters)"))]
    pub title: String,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

fn ends_after_start(input: &AppointmentInput) -> Result<(), ValidationError> {
    if input.ends_at <= input.starts_at {
        return Err(rule("ends_at", "must be after the start time"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn booked(start: u32, end: u32) -> Appointment {
        Appointment {
            id: 1,
            user_id: 1,
            customer_id: 1,
            service_id: None,
            title: "Haircut".into(),
            starts_at: at(start),
            ends_at: at(end),
            status: AppointmentStatus::Scheduled,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn overlap_is_half_open() {
        let slot = booked(10, 11);
        assert!(slot.overlaps(at(10), at(12)));
        assert!(slot.overlaps(at(9), at(11)));
        assert!(!slot.overlaps(at(11), at(12)));
        assert!(!slot.overlaps(at(8), at(10)));
    }

    #[test]
    fn final_states_do_not_move() {
        assert!(AppointmentStatus::Scheduled.can_transition_to(AppointmentStatus::Confirmed));
        assert!(!AppointmentStatus::Completed.can_transition_to(AppointmentStatus::Scheduled));
        assert!(!AppointmentStatus::NoShow.blocks_slot());
        assert_eq!("no_show".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::NoShow);
    }

    #[test]
    fn end_must_follow_start() {
        let input = AppointmentInput {
            customer_id: 1,
            service_id: None,
            title: "Consultation".into(),
            starts_at: at(14),
            ends_at: at(14),
            status: None,
            notes: None,
        };
        assert!(input.validate().is_err());
    }
}
