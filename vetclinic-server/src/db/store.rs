//! Record store trait and storage errors
//!
//! The gateway only talks to storage through [`RecordStore`], so the
//! PostgreSQL store and the in-process store are interchangeable.

use async_trait::async_trait;
use sqlx::error::ErrorKind;

use crate::models::{
    Animal, AnimalWithTutor, Consultation, ConsultationDetails, ConsultationWithVet, NewAnimal,
    NewConsultation, NewTutor, NewUser, StatusUpdate, Tutor, User,
};
use crate::scheduling::{SlotKey, SlotPolicy};

/// Storage error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {constraint}")]
    Uniqueness { constraint: String },

    #[error("foreign key violated: {constraint}")]
    Referential { constraint: String },

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let constraint = db.constraint().unwrap_or("unknown").to_owned();
            match db.kind() {
                ErrorKind::UniqueViolation => return Self::Uniqueness { constraint },
                ErrorKind::ForeignKeyViolation => return Self::Referential { constraint },
                _ => {}
            }
        }

        let unavailable = matches!(
            err,
            sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
        );
        if unavailable {
            Self::Unavailable(err.to_string())
        } else {
            Self::Sqlx(err)
        }
    }
}

/// Persistence of users, tutors, animals and consultations.
///
/// Implementations enforce the relational constraints themselves: foreign
/// keys surface as [`StoreError::Referential`], unique fields (email,
/// national id, consultation slot) as [`StoreError::Uniqueness`].
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Slot policy whose uniqueness this store enforces.
    fn slot_policy(&self) -> SlotPolicy;

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn list_tutors(&self) -> Result<Vec<Tutor>, StoreError>;

    async fn insert_tutor(&self, tutor: NewTutor) -> Result<Tutor, StoreError>;

    async fn list_animals(&self) -> Result<Vec<Animal>, StoreError>;

    async fn list_animals_with_tutor(&self) -> Result<Vec<AnimalWithTutor>, StoreError>;

    async fn insert_animal(&self, animal: NewAnimal) -> Result<Animal, StoreError>;

    async fn list_consultations(&self) -> Result<Vec<Consultation>, StoreError>;

    async fn list_consultation_details(&self) -> Result<Vec<ConsultationDetails>, StoreError>;

    /// First consultation (lowest id) holding the slot, if any.
    async fn find_consultation_at(
        &self,
        slot: &SlotKey,
    ) -> Result<Option<Consultation>, StoreError>;

    async fn insert_consultation(
        &self,
        consultation: NewConsultation,
    ) -> Result<Consultation, StoreError>;

    /// Returns `None` when no consultation has `id`.
    async fn update_consultation(
        &self,
        id: i64,
        update: StatusUpdate,
    ) -> Result<Option<Consultation>, StoreError>;

    /// Consultations of one animal, most recent `scheduled_at` first.
    async fn animal_history(&self, animal_id: i64) -> Result<Vec<Consultation>, StoreError>;

    async fn animal_history_with_vet(
        &self,
        animal_id: i64,
    ) -> Result<Vec<ConsultationWithVet>, StoreError>;

    /// Round-trip to the backing storage.
    async fn ping(&self) -> Result<(), StoreError>;
}
