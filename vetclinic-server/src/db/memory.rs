//! In-process record store
//!
//! Mirrors the PostgreSQL constraints (foreign keys, unique email, unique
//! national id, unique slot per policy) under a single async mutex, so every
//! operation is atomic. Used by tests and by `serve --in-memory`.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::schema::constraint;
use super::store::{RecordStore, StoreError};
use crate::models::{
    Animal, AnimalWithTutor, Consultation, ConsultationDetails, ConsultationWithVet, NewAnimal,
    NewConsultation, NewTutor, NewUser, StatusUpdate, Tutor, User,
};
use crate::scheduling::{SlotKey, SlotPolicy};

/// Row ids start at 1 and follow insertion order; rows are never deleted.
#[derive(Default)]
struct Tables {
    users: Vec<(User, String)>,
    tutors: Vec<Tutor>,
    animals: Vec<Animal>,
    consultations: Vec<Consultation>,
}

impl Tables {
    fn user(&self, id: i64) -> Option<&User> {
        self.users.iter().map(|(u, _)| u).find(|u| u.id == id)
    }

    fn tutor(&self, id: i64) -> Option<&Tutor> {
        self.tutors.iter().find(|t| t.id == id)
    }

    fn animal(&self, id: i64) -> Option<&Animal> {
        self.animals.iter().find(|a| a.id == id)
    }

    fn next_id(len: usize) -> i64 {
        len as i64 + 1
    }
}

/// Record store held entirely in memory
pub struct MemoryRecordStore {
    policy: SlotPolicy,
    tables: Mutex<Tables>,
}

impl MemoryRecordStore {
    pub fn new(policy: SlotPolicy) -> Self {
        Self {
            policy,
            tables: Mutex::new(Tables::default()),
        }
    }

    /// Stored credential hash for `email`.
    pub async fn password_hash(&self, email: &str) -> Option<String> {
        let tables = self.tables.lock().await;
        tables
            .users
            .iter()
            .find(|(u, _)| u.email == email)
            .map(|(_, hash)| hash.clone())
    }
}

fn uniqueness(name: &str) -> StoreError {
    StoreError::Uniqueness {
        constraint: name.to_owned(),
    }
}

fn referential(name: &str) -> StoreError {
    StoreError::Referential {
        constraint: name.to_owned(),
    }
}

fn history_order(a: &Consultation, b: &Consultation) -> std::cmp::Ordering {
    b.scheduled_at
        .cmp(&a.scheduled_at)
        .then_with(|| b.id.cmp(&a.id))
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    fn slot_policy(&self) -> SlotPolicy {
        self.policy
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|(u, _)| u.email == user.email) {
            return Err(uniqueness(constraint::USERS_EMAIL));
        }

        let hash = user.password_hash.clone();
        let record = user.into_record(Tables::next_id(tables.users.len()));
        tables.users.push((record.clone(), hash));
        Ok(record)
    }

    async fn list_tutors(&self) -> Result<Vec<Tutor>, StoreError> {
        Ok(self.tables.lock().await.tutors.clone())
    }

    async fn insert_tutor(&self, tutor: NewTutor) -> Result<Tutor, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables
            .tutors
            .iter()
            .any(|t| t.national_id == tutor.national_id)
        {
            return Err(uniqueness(constraint::TUTORS_NATIONAL_ID));
        }

        let record = tutor.into_record(Tables::next_id(tables.tutors.len()));
        tables.tutors.push(record.clone());
        Ok(record)
    }

    async fn list_animals(&self) -> Result<Vec<Animal>, StoreError> {
        Ok(self.tables.lock().await.animals.clone())
    }

    async fn list_animals_with_tutor(&self) -> Result<Vec<AnimalWithTutor>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .animals
            .iter()
            .filter_map(|animal| {
                tables.tutor(animal.tutor_id).map(|tutor| AnimalWithTutor {
                    animal: animal.clone(),
                    tutor_name: tutor.name.clone(),
                })
            })
            .collect())
    }

    async fn insert_animal(&self, animal: NewAnimal) -> Result<Animal, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.tutor(animal.tutor_id).is_none() {
            return Err(referential(constraint::ANIMALS_TUTOR));
        }

        let record = animal.into_record(Tables::next_id(tables.animals.len()));
        tables.animals.push(record.clone());
        Ok(record)
    }

    async fn list_consultations(&self) -> Result<Vec<Consultation>, StoreError> {
        Ok(self.tables.lock().await.consultations.clone())
    }

    async fn list_consultation_details(&self) -> Result<Vec<ConsultationDetails>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .consultations
            .iter()
            .filter_map(|c| {
                let animal = tables.animal(c.animal_id)?;
                let tutor = tables.tutor(animal.tutor_id)?;
                let vet = tables.user(c.user_id)?;
                Some(ConsultationDetails {
                    consultation: c.clone(),
                    animal_name: animal.name.clone(),
                    tutor_name: tutor.name.clone(),
                    veterinarian_name: vet.name.clone(),
                })
            })
            .collect())
    }

    async fn find_consultation_at(
        &self,
        slot: &SlotKey,
    ) -> Result<Option<Consultation>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .consultations
            .iter()
            .find(|c| slot.matches(c))
            .cloned())
    }

    async fn insert_consultation(
        &self,
        consultation: NewConsultation,
    ) -> Result<Consultation, StoreError> {
        let mut tables = self.tables.lock().await;

        let slot = self.policy.key_for(&consultation);
        if tables.consultations.iter().any(|c| slot.matches(c)) {
            return Err(uniqueness(self.policy.index_name()));
        }
        if tables.animal(consultation.animal_id).is_none() {
            return Err(referential(constraint::CONSULTATIONS_ANIMAL));
        }
        if tables.user(consultation.user_id).is_none() {
            return Err(referential(constraint::CONSULTATIONS_USER));
        }

        let record = consultation.into_record(Tables::next_id(tables.consultations.len()));
        tables.consultations.push(record.clone());
        Ok(record)
    }

    async fn update_consultation(
        &self,
        id: i64,
        update: StatusUpdate,
    ) -> Result<Option<Consultation>, StoreError> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .consultations
            .iter_mut()
            .find(|c| c.id == id)
            .map(|c| {
                c.apply(update);
                c.clone()
            }))
    }

    async fn animal_history(&self, animal_id: i64) -> Result<Vec<Consultation>, StoreError> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<Consultation> = tables
            .consultations
            .iter()
            .filter(|c| c.animal_id == animal_id)
            .cloned()
            .collect();
        rows.sort_by(history_order);
        Ok(rows)
    }

    async fn animal_history_with_vet(
        &self,
        animal_id: i64,
    ) -> Result<Vec<ConsultationWithVet>, StoreError> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<&Consultation> = tables
            .consultations
            .iter()
            .filter(|c| c.animal_id == animal_id)
            .collect();
        rows.sort_by(|a, b| history_order(a, b));

        Ok(rows
            .into_iter()
            .filter_map(|c| {
                tables.user(c.user_id).map(|vet| ConsultationWithVet {
                    consultation: c.clone(),
                    veterinarian_name: vet.name.clone(),
                })
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
