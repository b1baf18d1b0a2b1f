//! Query gateway - one storage operation per request
//!
//! Owns the record store handle and the conflict checker. Every operation
//! returns an explicit [`GatewayError`] instead of a generic failure, so the
//! HTTP layer can tell conflicts, missing rows and storage trouble apart.

use std::sync::Arc;

use crate::db::{schema, RecordStore, StoreError};
use crate::models::{
    Animal, AnimalWithTutor, Consultation, ConsultationDetails, ConsultationWithVet, NewAnimal,
    NewConsultation, NewTutor, NewUser, Registration, StatusUpdate, Tutor, User,
};
use crate::password::hash_password;
use crate::scheduling::{Booking, ConflictChecker, SlotPolicy};

/// Gateway error type
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: i64 },

    #[error("slot already booked by consultation {}", .existing.id)]
    ScheduleConflict { existing: Box<Consultation> },

    #[error("referenced {reference} does not exist")]
    Referential { reference: &'static str },

    #[error("duplicate {field}")]
    Uniqueness { field: &'static str },

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage error: {0}")]
    Storage(StoreError),

    #[error("credential hashing failed: {0}")]
    Credential(String),
}

impl From<StoreError> for GatewayError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Referential { constraint } => Self::Referential {
                reference: schema::subject_of(&constraint),
            },
            StoreError::Uniqueness { constraint } => Self::Uniqueness {
                field: schema::subject_of(&constraint),
            },
            StoreError::Unavailable(message) => Self::Unavailable(message),
            other => Self::Storage(other),
        }
    }
}

/// Entry point for every clinic operation
#[derive(Clone)]
pub struct QueryGateway {
    store: Arc<dyn RecordStore>,
    checker: ConflictChecker,
}

impl QueryGateway {
    /// The conflict check follows the policy the store's backstop enforces.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        let checker = ConflictChecker::new(store.slot_policy());
        Self { store, checker }
    }

    pub fn slot_policy(&self) -> SlotPolicy {
        self.checker.policy()
    }

    /// Register a user. The password is hashed off the async runtime.
    pub async fn create_user(&self, registration: Registration) -> Result<User, GatewayError> {
        let Registration {
            name,
            email,
            password,
            profile,
        } = registration;

        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| GatewayError::Credential(e.to_string()))?
            .map_err(|e| GatewayError::Credential(e.to_string()))?;

        let user = self
            .store
            .insert_user(NewUser {
                name,
                email,
                password_hash,
                profile,
            })
            .await?;
        tracing::debug!(user_id = user.id, "user created");
        Ok(user)
    }

    pub async fn list_tutors(&self) -> Result<Vec<Tutor>, GatewayError> {
        Ok(self.store.list_tutors().await?)
    }

    pub async fn create_tutor(&self, tutor: NewTutor) -> Result<Tutor, GatewayError> {
        let tutor = self.store.insert_tutor(tutor).await?;
        tracing::debug!(tutor_id = tutor.id, "tutor created");
        Ok(tutor)
    }

    /// Animals without owner details.
    pub async fn list_animals(&self) -> Result<Vec<Animal>, GatewayError> {
        Ok(self.store.list_animals().await?)
    }

    /// Joined variant: each animal with its tutor's name.
    pub async fn list_animals_with_tutor(&self) -> Result<Vec<AnimalWithTutor>, GatewayError> {
        Ok(self.store.list_animals_with_tutor().await?)
    }

    pub async fn create_animal(&self, animal: NewAnimal) -> Result<Animal, GatewayError> {
        let animal = self.store.insert_animal(animal).await?;
        tracing::debug!(animal_id = animal.id, tutor_id = animal.tutor_id, "animal created");
        Ok(animal)
    }

    pub async fn list_consultations(&self) -> Result<Vec<Consultation>, GatewayError> {
        Ok(self.store.list_consultations().await?)
    }

    /// Joined variant: animal, tutor and veterinarian names attached.
    pub async fn list_consultation_details(
        &self,
    ) -> Result<Vec<ConsultationDetails>, GatewayError> {
        Ok(self.store.list_consultation_details().await?)
    }

    /// Book a consultation, rejecting a taken slot with the record holding it.
    pub async fn create_consultation(
        &self,
        consultation: NewConsultation,
    ) -> Result<Consultation, GatewayError> {
        match self.checker.book(self.store.as_ref(), consultation).await? {
            Booking::Booked(created) => {
                tracing::debug!(
                    consultation_id = created.id,
                    scheduled_at = %created.scheduled_at,
                    "consultation booked"
                );
                Ok(created)
            }
            Booking::Conflict(existing) => Err(GatewayError::ScheduleConflict {
                existing: Box::new(existing),
            }),
        }
    }

    pub async fn update_consultation_status(
        &self,
        id: i64,
        update: StatusUpdate,
    ) -> Result<Consultation, GatewayError> {
        self.store
            .update_consultation(id, update)
            .await?
            .ok_or(GatewayError::NotFound {
                resource: "consultation",
                id,
            })
    }

    /// Consultations of one animal, most recent first.
    pub async fn animal_history(&self, animal_id: i64) -> Result<Vec<Consultation>, GatewayError> {
        Ok(self.store.animal_history(animal_id).await?)
    }

    /// Joined variant of [`Self::animal_history`] with the veterinarian name.
    pub async fn animal_history_with_vet(
        &self,
        animal_id: i64,
    ) -> Result<Vec<ConsultationWithVet>, GatewayError> {
        Ok(self.store.animal_history_with_vet(animal_id).await?)
    }

    pub async fn ping(&self) -> Result<(), GatewayError> {
        Ok(self.store.ping().await?)
    }
}
