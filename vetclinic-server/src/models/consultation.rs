//! Consultation (appointment) records

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Status written on creation. Later values are free-form.
pub const DEFAULT_STATUS: &str = "scheduled";

/// Digits of sub-second precision kept for `scheduled_at` (TIMESTAMPTZ stores microseconds).
const SLOT_SUBSEC_DIGITS: u16 = 6;

/// Consultation row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Consultation {
    pub id: i64,
    pub animal_id: i64,
    pub user_id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub symptoms: Option<String>,
    pub status: String,
    pub treatment_note: Option<String>,
}

/// Consultation joined with animal, tutor and veterinarian names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ConsultationDetails {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub consultation: Consultation,
    pub animal_name: String,
    pub tutor_name: String,
    pub veterinarian_name: String,
}

/// Consultation joined with the veterinarian name, used by animal history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ConsultationWithVet {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub consultation: Consultation,
    pub veterinarian_name: String,
}

/// Consultation to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConsultation {
    pub animal_id: i64,
    pub user_id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub symptoms: Option<String>,
}

impl NewConsultation {
    /// Build an input with `scheduled_at` truncated to storage precision, so
    /// exact-equality slot checks agree with what PostgreSQL persists.
    pub fn new(
        animal_id: i64,
        user_id: i64,
        scheduled_at: DateTime<Utc>,
        symptoms: Option<String>,
    ) -> Self {
        Self {
            animal_id,
            user_id,
            scheduled_at: scheduled_at.trunc_subsecs(SLOT_SUBSEC_DIGITS),
            symptoms,
        }
    }

    pub fn into_record(self, id: i64) -> Consultation {
        Consultation {
            id,
            animal_id: self.animal_id,
            user_id: self.user_id,
            scheduled_at: self.scheduled_at,
            symptoms: self.symptoms,
            status: DEFAULT_STATUS.to_owned(),
            treatment_note: None,
        }
    }
}

/// Partial update of a consultation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: String,
    /// `None` keeps the stored note, `Some(None)` clears it.
    pub treatment_note: Option<Option<String>>,
}

impl Consultation {
    pub fn apply(&mut self, update: StatusUpdate) {
        self.status = update.status;
        if let Some(note) = update.treatment_note {
            self.treatment_note = note;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn new_truncates_to_microseconds() {
        let at = Utc
            .with_ymd_and_hms(2025, 3, 10, 14, 30, 0)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        let input = NewConsultation::new(1, 2, at, None);
        assert_eq!(input.scheduled_at.nanosecond(), 123_456_000);
    }

    #[test]
    fn fresh_record_is_scheduled() {
        let at = Utc.with_ymd_and_hms(2025, 3, 10, 14, 30, 0).unwrap();
        let record = NewConsultation::new(1, 2, at, Some("cough".into())).into_record(9);
        assert_eq!(record.status, DEFAULT_STATUS);
        assert_eq!(record.treatment_note, None);
        assert_eq!(record.symptoms.as_deref(), Some("cough"));
    }

    #[test]
    fn apply_keeps_note_when_absent() {
        let at = Utc.with_ymd_and_hms(2025, 3, 10, 14, 30, 0).unwrap();
        let mut record = NewConsultation::new(1, 2, at, None).into_record(9);

        record.apply(StatusUpdate {
            status: "in_progress".into(),
            treatment_note: Some(Some("rest".into())),
        });
        record.apply(StatusUpdate {
            status: "completed".into(),
            treatment_note: None,
        });

        assert_eq!(record.status, "completed");
        assert_eq!(record.treatment_note.as_deref(), Some("rest"));

        record.apply(StatusUpdate {
            status: "reopened".into(),
            treatment_note: Some(None),
        });
        assert_eq!(record.treatment_note, None);
    }
}
