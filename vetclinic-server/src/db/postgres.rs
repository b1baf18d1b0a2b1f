//! PostgreSQL record store
//!
//! One parameterized statement per operation:
//! - inserts use RETURNING, so the created row comes back in the same round trip
//! - joined listings use JOINs, no per-row lookups
//! - uniqueness and references are left to the database constraints

use async_trait::async_trait;
use sqlx::PgPool;

use super::pool::{create_pool, PoolSettings};
use super::schema;
use super::store::{RecordStore, StoreError};
use crate::models::{
    Animal, AnimalWithTutor, Consultation, ConsultationDetails, ConsultationWithVet, NewAnimal,
    NewConsultation, NewTutor, NewUser, StatusUpdate, Tutor, User,
};
use crate::scheduling::{SlotKey, SlotPolicy};

/// Record store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
    policy: SlotPolicy,
}

impl PgRecordStore {
    /// Wrap a pool whose schema was bootstrapped for `policy`.
    pub fn new(pool: PgPool, policy: SlotPolicy) -> Self {
        Self { pool, policy }
    }

    /// Connect, then bootstrap the schema for `policy`.
    pub async fn connect(
        database_url: &str,
        settings: PoolSettings,
        policy: SlotPolicy,
    ) -> Result<Self, StoreError> {
        let pool = create_pool(database_url, settings).await?;
        schema::bootstrap(&pool, policy).await?;
        Ok(Self::new(pool, policy))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    fn slot_policy(&self) -> SlotPolicy {
        self.policy
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, profile)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, profile
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.profile)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_tutors(&self) -> Result<Vec<Tutor>, StoreError> {
        let rows = sqlx::query_as::<_, Tutor>(
            "SELECT id, name, national_id, phone, email, address FROM tutors ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn insert_tutor(&self, tutor: NewTutor) -> Result<Tutor, StoreError> {
        let row = sqlx::query_as::<_, Tutor>(
            r#"
            INSERT INTO tutors (name, national_id, phone, email, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, national_id, phone, email, address
            "#,
        )
        .bind(&tutor.name)
        .bind(&tutor.national_id)
        .bind(&tutor.phone)
        .bind(&tutor.email)
        .bind(&tutor.address)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_animals(&self) -> Result<Vec<Animal>, StoreError> {
        let rows = sqlx::query_as::<_, Animal>(
            "SELECT id, name, species, breed, birth_date, sex, tutor_id FROM animals ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list_animals_with_tutor(&self) -> Result<Vec<AnimalWithTutor>, StoreError> {
        let rows = sqlx::query_as::<_, AnimalWithTutor>(
            r#"
            SELECT
                a.id, a.name, a.species, a.breed, a.birth_date, a.sex, a.tutor_id,
                t.name AS tutor_name
            FROM animals a
            JOIN tutors t ON t.id = a.tutor_id
            ORDER BY a.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn insert_animal(&self, animal: NewAnimal) -> Result<Animal, StoreError> {
        let row = sqlx::query_as::<_, Animal>(
            r#"
            INSERT INTO animals (name, species, breed, birth_date, sex, tutor_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, species, breed, birth_date, sex, tutor_id
            "#,
        )
        .bind(&animal.name)
        .bind(&animal.species)
        .bind(&animal.breed)
        .bind(animal.birth_date)
        .bind(&animal.sex)
        .bind(animal.tutor_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_consultations(&self) -> Result<Vec<Consultation>, StoreError> {
        let rows = sqlx::query_as::<_, Consultation>(
            r#"
            SELECT id, animal_id, user_id, scheduled_at, symptoms, status, treatment_note
            FROM consultations
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list_consultation_details(&self) -> Result<Vec<ConsultationDetails>, StoreError> {
        let rows = sqlx::query_as::<_, ConsultationDetails>(
            r#"
            SELECT
                c.id, c.animal_id, c.user_id, c.scheduled_at, c.symptoms, c.status,
                c.treatment_note,
                a.name AS animal_name,
                t.name AS tutor_name,
                u.name AS veterinarian_name
            FROM consultations c
            JOIN animals a ON a.id = c.animal_id
            JOIN tutors t ON t.id = a.tutor_id
            JOIN users u ON u.id = c.user_id
            ORDER BY c.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_consultation_at(
        &self,
        slot: &SlotKey,
    ) -> Result<Option<Consultation>, StoreError> {
        let row = sqlx::query_as::<_, Consultation>(
            r#"
            SELECT id, animal_id, user_id, scheduled_at, symptoms, status, treatment_note
            FROM consultations
            WHERE scheduled_at = $1
              AND ($2::BIGINT IS NULL OR user_id = $2)
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(slot.scheduled_at)
        .bind(slot.user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn insert_consultation(
        &self,
        consultation: NewConsultation,
    ) -> Result<Consultation, StoreError> {
        let row = sqlx::query_as::<_, Consultation>(
            r#"
            INSERT INTO consultations (animal_id, user_id, scheduled_at, symptoms)
            VALUES ($1, $2, $3, $4)
            RETURNING id, animal_id, user_id, scheduled_at, symptoms, status, treatment_note
            "#,
        )
        .bind(consultation.animal_id)
        .bind(consultation.user_id)
        .bind(consultation.scheduled_at)
        .bind(&consultation.symptoms)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_consultation(
        &self,
        id: i64,
        update: StatusUpdate,
    ) -> Result<Option<Consultation>, StoreError> {
        let (touch_note, note) = match update.treatment_note {
            Some(note) => (true, note),
            None => (false, None),
        };

        let row = sqlx::query_as::<_, Consultation>(
            r#"
            UPDATE consultations
            SET status = $1,
                treatment_note = CASE WHEN $2 THEN $3 ELSE treatment_note END
            WHERE id = $4
            RETURNING id, animal_id, user_id, scheduled_at, symptoms, status, treatment_note
            "#,
        )
        .bind(&update.status)
        .bind(touch_note)
        .bind(note)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn animal_history(&self, animal_id: i64) -> Result<Vec<Consultation>, StoreError> {
        let rows = sqlx::query_as::<_, Consultation>(
            r#"
            SELECT id, animal_id, user_id, scheduled_at, symptoms, status, treatment_note
            FROM consultations
            WHERE animal_id = $1
            ORDER BY scheduled_at DESC, id DESC
            "#,
        )
        .bind(animal_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn animal_history_with_vet(
        &self,
        animal_id: i64,
    ) -> Result<Vec<ConsultationWithVet>, StoreError> {
        let rows = sqlx::query_as::<_, ConsultationWithVet>(
            r#"
            SELECT
                c.id, c.animal_id, c.user_id, c.scheduled_at, c.symptoms, c.status,
                c.treatment_note,
                u.name AS veterinarian_name
            FROM consultations c
            JOIN users u ON u.id = c.user_id
            WHERE c.animal_id = $1
            ORDER BY c.scheduled_at DESC, c.id DESC
            "#,
        )
        .bind(animal_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
