//! Appointment slot policy and conflict checking
//!
//! A slot is taken when another consultation has the exact same
//! `scheduled_at` (and, under [`SlotPolicy::PerVeterinarian`], the same
//! veterinarian). The application-level check gives callers a readable
//! conflict; the unique index created by schema bootstrap is what actually
//! prevents two racing inserts from both landing. When the index rejects an
//! insert, [`ConflictChecker::book`] re-reads the survivor so both paths
//! report the same outcome.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::db::{schema, RecordStore, StoreError};
use crate::models::{Consultation, NewConsultation, ValidationError};

/// Which consultations compete for the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotPolicy {
    /// One consultation per instant across the whole clinic.
    #[default]
    Global,
    /// One consultation per instant per veterinarian.
    PerVeterinarian,
}

impl SlotPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::PerVeterinarian => "per-veterinarian",
        }
    }

    /// Slot key of a proposed booking under this policy.
    pub fn key_for(&self, booking: &NewConsultation) -> SlotKey {
        SlotKey {
            scheduled_at: booking.scheduled_at,
            user_id: match self {
                Self::Global => None,
                Self::PerVeterinarian => Some(booking.user_id),
            },
        }
    }

    /// Name of the unique index backing this policy.
    pub fn index_name(&self) -> &'static str {
        match self {
            Self::Global => schema::constraint::SLOT_GLOBAL,
            Self::PerVeterinarian => schema::constraint::SLOT_PER_VET,
        }
    }
}

impl fmt::Display for SlotPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "per-veterinarian" | "per_veterinarian" | "per-vet" => Ok(Self::PerVeterinarian),
            _ => Err(ValidationError::InvalidVariant {
                field: "slot policy",
                value: s.to_owned(),
            }),
        }
    }
}

/// Identity of an appointment slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotKey {
    pub scheduled_at: DateTime<Utc>,
    /// Set only under the per-veterinarian policy.
    pub user_id: Option<i64>,
}

impl SlotKey {
    pub fn matches(&self, consultation: &Consultation) -> bool {
        consultation.scheduled_at == self.scheduled_at
            && self.user_id.map_or(true, |id| consultation.user_id == id)
    }
}

/// Result of checking a slot before insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Admit,
    Reject(Consultation),
}

/// Result of a booking attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Booking {
    Booked(Consultation),
    Conflict(Consultation),
}

/// Decides whether a proposed consultation may take its slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictChecker {
    policy: SlotPolicy,
}

impl ConflictChecker {
    pub fn new(policy: SlotPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SlotPolicy {
        self.policy
    }

    /// Look for an existing consultation holding the slot.
    pub async fn check(
        &self,
        store: &dyn RecordStore,
        slot: &SlotKey,
    ) -> Result<Admission, StoreError> {
        Ok(match store.find_consultation_at(slot).await? {
            Some(existing) => Admission::Reject(existing),
            None => Admission::Admit,
        })
    }

    /// Check the slot, then insert. A unique-index rejection on the slot
    /// (a concurrent booking won the race) is resolved to the survivor.
    pub async fn book(
        &self,
        store: &dyn RecordStore,
        booking: NewConsultation,
    ) -> Result<Booking, StoreError> {
        let slot = self.policy.key_for(&booking);

        if let Admission::Reject(existing) = self.check(store, &slot).await? {
            tracing::warn!(
                scheduled_at = %slot.scheduled_at,
                existing_id = existing.id,
                "slot already booked"
            );
            return Ok(Booking::Conflict(existing));
        }

        match store.insert_consultation(booking).await {
            Ok(created) => Ok(Booking::Booked(created)),
            Err(StoreError::Uniqueness { constraint }) if constraint == self.policy.index_name() => {
                match store.find_consultation_at(&slot).await? {
                    Some(existing) => {
                        tracing::warn!(
                            scheduled_at = %slot.scheduled_at,
                            existing_id = existing.id,
                            "slot taken by concurrent booking"
                        );
                        Ok(Booking::Conflict(existing))
                    }
                    None => Err(StoreError::Uniqueness { constraint }),
                }
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryRecordStore;
    use crate::models::{NewAnimal, NewTutor, NewUser};
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, hour, 0, 0).unwrap()
    }

    async fn seeded(policy: SlotPolicy) -> (MemoryRecordStore, i64, i64, i64) {
        let store = MemoryRecordStore::new(policy);
        let tutor = store
            .insert_tutor(NewTutor {
                name: "Ana".into(),
                national_id: "123".into(),
                phone: None,
                email: None,
                address: None,
            })
            .await
            .unwrap();
        let animal = store
            .insert_animal(NewAnimal {
                name: "Rex".into(),
                species: "dog".into(),
                breed: None,
                birth_date: None,
                sex: None,
                tutor_id: tutor.id,
            })
            .await
            .unwrap();
        let mut vets = Vec::new();
        for (name, email) in [("Lima", "lima@clinic.test"), ("Souza", "souza@clinic.test")] {
            let vet = store
                .insert_user(NewUser {
                    name: name.into(),
                    email: email.into(),
                    password_hash: "x".into(),
                    profile: "vet".into(),
                })
                .await
                .unwrap();
            vets.push(vet.id);
        }
        (store, animal.id, vets[0], vets[1])
    }

    #[test]
    fn policy_parsing() {
        assert_eq!("global".parse::<SlotPolicy>().unwrap(), SlotPolicy::Global);
        assert_eq!(
            "Per-Veterinarian".parse::<SlotPolicy>().unwrap(),
            SlotPolicy::PerVeterinarian
        );
        assert!(matches!(
            "hourly".parse::<SlotPolicy>(),
            Err(ValidationError::InvalidVariant { .. })
        ));
    }

    #[test]
    fn key_ignores_vet_under_global_policy() {
        let booking = NewConsultation::new(1, 42, at(9), None);
        assert_eq!(SlotPolicy::Global.key_for(&booking).user_id, None);
        assert_eq!(SlotPolicy::PerVeterinarian.key_for(&booking).user_id, Some(42));
    }

    #[tokio::test]
    async fn check_admits_free_slot() {
        let (store, _, _, _) = seeded(SlotPolicy::Global).await;
        let checker = ConflictChecker::new(SlotPolicy::Global);
        let slot = SlotKey {
            scheduled_at: at(9),
            user_id: None,
        };
        assert_eq!(checker.check(&store, &slot).await.unwrap(), Admission::Admit);
    }

    #[tokio::test]
    async fn global_policy_rejects_other_vet_at_same_time() {
        let (store, animal, vet_a, vet_b) = seeded(SlotPolicy::Global).await;
        let checker = ConflictChecker::new(SlotPolicy::Global);

        let first = checker
            .book(&store, NewConsultation::new(animal, vet_a, at(9), None))
            .await
            .unwrap();
        let Booking::Booked(first) = first else {
            panic!("first booking should succeed");
        };

        let second = checker
            .book(&store, NewConsultation::new(animal, vet_b, at(9), None))
            .await
            .unwrap();
        assert_eq!(second, Booking::Conflict(first));
    }

    #[tokio::test]
    async fn per_vet_policy_admits_other_vet() {
        let (store, animal, vet_a, vet_b) = seeded(SlotPolicy::PerVeterinarian).await;
        let checker = ConflictChecker::new(SlotPolicy::PerVeterinarian);

        let a = checker
            .book(&store, NewConsultation::new(animal, vet_a, at(9), None))
            .await
            .unwrap();
        let b = checker
            .book(&store, NewConsultation::new(animal, vet_b, at(9), None))
            .await
            .unwrap();
        assert!(matches!(a, Booking::Booked(_)));
        assert!(matches!(b, Booking::Booked(_)));

        let again = checker
            .book(&store, NewConsultation::new(animal, vet_a, at(9), None))
            .await
            .unwrap();
        let Booking::Conflict(existing) = again else {
            panic!("same vet twice must conflict");
        };
        assert_eq!(existing.user_id, vet_a);
    }

    #[tokio::test]
    async fn different_times_do_not_conflict() {
        let (store, animal, vet_a, _) = seeded(SlotPolicy::Global).await;
        let checker = ConflictChecker::new(SlotPolicy::Global);

        for hour in [9, 10, 11] {
            let booking = checker
                .book(&store, NewConsultation::new(animal, vet_a, at(hour), None))
                .await
                .unwrap();
            assert!(matches!(booking, Booking::Booked(_)));
        }
    }
}
