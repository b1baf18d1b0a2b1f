//! Schema bootstrap for the clinic tables

use sqlx::PgPool;

use super::StoreError;
use crate::scheduling::SlotPolicy;

/// Constraint and index names referenced by error mapping.
pub mod constraint {
    pub const USERS_EMAIL: &str = "users_email_key";
    pub const TUTORS_NATIONAL_ID: &str = "tutors_national_id_key";
    pub const ANIMALS_TUTOR: &str = "animals_tutor_id_fkey";
    pub const CONSULTATIONS_ANIMAL: &str = "consultations_animal_id_fkey";
    pub const CONSULTATIONS_USER: &str = "consultations_user_id_fkey";
    pub const SLOT_GLOBAL: &str = "consultations_slot_global_key";
    pub const SLOT_PER_VET: &str = "consultations_slot_per_vet_key";
}

/// Field or relation a constraint protects, for client-facing messages.
pub fn subject_of(constraint_name: &str) -> &'static str {
    match constraint_name {
        constraint::USERS_EMAIL => "email",
        constraint::TUTORS_NATIONAL_ID => "national_id",
        constraint::SLOT_GLOBAL | constraint::SLOT_PER_VET => "scheduled_at",
        constraint::ANIMALS_TUTOR => "tutor",
        constraint::CONSULTATIONS_ANIMAL => "animal",
        constraint::CONSULTATIONS_USER => "user",
        _ => "record",
    }
}

const TABLES: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL CONSTRAINT users_email_key UNIQUE,
        password_hash TEXT NOT NULL,
        profile TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tutors (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        national_id TEXT NOT NULL CONSTRAINT tutors_national_id_key UNIQUE,
        phone TEXT,
        email TEXT,
        address TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS animals (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        species TEXT NOT NULL,
        breed TEXT,
        birth_date DATE,
        sex TEXT,
        tutor_id BIGINT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT animals_tutor_id_fkey FOREIGN KEY (tutor_id) REFERENCES tutors(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS consultations (
        id BIGSERIAL PRIMARY KEY,
        animal_id BIGINT NOT NULL,
        user_id BIGINT NOT NULL,
        scheduled_at TIMESTAMPTZ NOT NULL,
        symptoms TEXT,
        status TEXT NOT NULL DEFAULT 'scheduled',
        treatment_note TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT consultations_animal_id_fkey FOREIGN KEY (animal_id) REFERENCES animals(id),
        CONSTRAINT consultations_user_id_fkey FOREIGN KEY (user_id) REFERENCES users(id)
    )
    "#,
];

/// Create tables and indexes if missing, and install the slot index for `policy`.
///
/// Switching policy drops the other policy's index in the same transaction
/// that creates the new one. Moving from per-veterinarian to global fails if
/// two vets already share a time; the per-veterinarian index is then kept.
pub async fn bootstrap(pool: &PgPool, policy: SlotPolicy) -> Result<(), StoreError> {
    tracing::info!(slot_policy = %policy, "bootstrapping schema");

    for ddl in TABLES {
        sqlx::query(ddl).execute(pool).await?;
    }

    create_indexes(pool).await?;
    install_slot_index(pool, policy).await?;

    tracing::info!("schema ready");
    Ok(())
}

async fn create_indexes(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_animals_tutor ON animals(tutor_id)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_consultations_animal_time ON consultations(animal_id, scheduled_at DESC)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_consultations_user ON consultations(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn install_slot_index(pool: &PgPool, policy: SlotPolicy) -> Result<(), StoreError> {
    let (keep, drop, columns) = match policy {
        SlotPolicy::Global => (
            constraint::SLOT_GLOBAL,
            constraint::SLOT_PER_VET,
            "scheduled_at",
        ),
        SlotPolicy::PerVeterinarian => (
            constraint::SLOT_PER_VET,
            constraint::SLOT_GLOBAL,
            "user_id, scheduled_at",
        ),
    };

    // Postgres DDL is transactional: a failed CREATE rolls back the DROP,
    // so the previous slot index stays in force.
    let mut tx = pool.begin().await?;
    sqlx::query(&format!("DROP INDEX IF EXISTS {drop}"))
        .execute(&mut *tx)
        .await?;
    sqlx::query(&format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS {keep} ON consultations({columns})"
    ))
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(())
}
