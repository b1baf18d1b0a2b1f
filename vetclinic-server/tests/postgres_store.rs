//! PostgreSQL record store against a live database
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p vetclinic-server -- --ignored

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};

use vetclinic_server::db::schema::{self, constraint};
use vetclinic_server::db::{create_pool, PgRecordStore, PoolSettings, RecordStore, StoreError};
use vetclinic_server::models::{
    NewAnimal, NewConsultation, NewTutor, NewUser, Registration, StatusUpdate,
};
use vetclinic_server::{GatewayError, QueryGateway, SlotPolicy};

async fn gateway() -> (QueryGateway, Arc<PgRecordStore>) {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let store = Arc::new(
        PgRecordStore::connect(&url, PoolSettings::default(), SlotPolicy::Global)
            .await
            .expect("connect failed"),
    );
    (QueryGateway::new(store.clone()), store)
}

/// Unique suffix so repeated runs do not collide on unique columns.
fn tag() -> String {
    Utc::now().timestamp_micros().to_string()
}

/// A slot nobody else books: the current instant, pushed a year ahead.
fn fresh_slot() -> DateTime<Utc> {
    Utc::now() + Duration::days(365)
}

async fn seed(gw: &QueryGateway, vets: usize) -> (i64, Vec<i64>) {
    let tag = tag();
    let tutor = gw
        .create_tutor(NewTutor {
            name: "Ana".into(),
            national_id: format!("cpf-{}", tag),
            phone: None,
            email: None,
            address: None,
        })
        .await
        .unwrap();
    let animal = gw
        .create_animal(NewAnimal {
            name: "Rex".into(),
            species: "dog".into(),
            breed: Some("mixed".into()),
            birth_date: None,
            sex: None,
            tutor_id: tutor.id,
        })
        .await
        .unwrap();

    let mut ids = Vec::new();
    for n in 0..vets {
        let vet = gw
            .create_user(Registration {
                name: format!("Vet {}", n),
                email: format!("vet{}-{}@clinic.test", n, tag),
                password: "pw".into(),
                profile: "vet".into(),
            })
            .await
            .unwrap();
        ids.push(vet.id);
    }
    (animal.id, ids)
}

#[tokio::test]
#[ignore = "requires database"]
async fn ping_succeeds() {
    let (gw, _) = gateway().await;
    gw.ping().await.unwrap();
}

#[tokio::test]
#[ignore = "requires database"]
async fn booking_flow_round_trips() {
    let (gw, _) = gateway().await;
    let (animal_id, vets) = seed(&gw, 2).await;
    let at = fresh_slot();

    let first = gw
        .create_consultation(NewConsultation::new(animal_id, vets[0], at, Some("cough".into())))
        .await
        .unwrap();
    assert_eq!(first.status, "scheduled");
    assert_eq!(first.scheduled_at, NewConsultation::new(animal_id, vets[0], at, None).scheduled_at);

    let err = gw
        .create_consultation(NewConsultation::new(animal_id, vets[1], at, None))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::ScheduleConflict { existing } if existing.id == first.id));

    let updated = gw
        .update_consultation_status(
            first.id,
            StatusUpdate {
                status: "done".into(),
                treatment_note: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.symptoms.as_deref(), Some("cough"));
    assert_eq!(updated.treatment_note, None);

    let history = gw.animal_history_with_vet(animal_id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].veterinarian_name, "Vet 0");
}

#[tokio::test]
#[ignore = "requires database"]
async fn missing_tutor_is_referential() {
    let (_, store) = gateway().await;
    let err = store
        .insert_animal(NewAnimal {
            name: "Ghost".into(),
            species: "cat".into(),
            breed: None,
            birth_date: None,
            sex: None,
            tutor_id: i64::MAX,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Referential { .. }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn concurrent_same_slot_bookings_leave_one_row() {
    let (gw, store) = gateway().await;
    let (animal_id, vets) = seed(&gw, 6).await;
    let at = fresh_slot();

    let attempts = vets.iter().map(|&vet| {
        let gw = gw.clone();
        async move {
            gw.create_consultation(NewConsultation::new(animal_id, vet, at, None))
                .await
        }
    });
    let results = join_all(attempts).await;

    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    for result in &results {
        if let Err(e) = result {
            assert!(
                matches!(e, GatewayError::ScheduleConflict { existing } if existing.id == winners[0].id),
                "unexpected error: {e:?}"
            );
        }
    }

    let stored = store.animal_history(animal_id).await.unwrap();
    assert_eq!(stored.len(), 1);
}

/// Pool whose connections all resolve tables in a fresh schema.
async fn isolated_pool(url: &str, schema_name: &str) -> PgPool {
    let admin = create_pool(url, PoolSettings::default()).await.unwrap();
    admin
        .execute(format!("CREATE SCHEMA {}", schema_name).as_str())
        .await
        .unwrap();
    admin.close().await;

    let set_path = format!("SET search_path TO {}", schema_name);
    PgPoolOptions::new()
        .max_connections(2)
        .after_connect(move |conn, _meta| {
            let set_path = set_path.clone();
            Box::pin(async move {
                conn.execute(set_path.as_str()).await?;
                Ok(())
            })
        })
        .connect(url)
        .await
        .unwrap()
}

async fn slot_indexes(pool: &PgPool, schema_name: &str) -> Vec<String> {
    sqlx::query_scalar(
        "SELECT indexname::TEXT FROM pg_indexes \
         WHERE schemaname = $1 AND indexname LIKE 'consultations_slot_%' ORDER BY indexname",
    )
    .bind(schema_name)
    .fetch_all(pool)
    .await
    .unwrap()
}

#[tokio::test]
#[ignore = "requires database"]
async fn failed_policy_switch_keeps_previous_index() {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let schema_name = format!("slot_switch_{}", tag());
    let pool = isolated_pool(&url, &schema_name).await;

    schema::bootstrap(&pool, SlotPolicy::PerVeterinarian)
        .await
        .unwrap();
    let store = PgRecordStore::new(pool.clone(), SlotPolicy::PerVeterinarian);

    let tutor = store
        .insert_tutor(NewTutor {
            name: "Ana".into(),
            national_id: "111".into(),
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
    for n in 0..2 {
        let vet = store
            .insert_user(NewUser {
                name: format!("Vet {}", n),
                email: format!("vet{}@clinic.test", n),
                password_hash: "x".into(),
                profile: "vet".into(),
            })
            .await
            .unwrap();
        vets.push(vet.id);
    }

    // Two vets at one time: legal per vet, impossible under a global index
    let at = fresh_slot();
    for &vet in &vets {
        store
            .insert_consultation(NewConsultation::new(animal.id, vet, at, None))
            .await
            .unwrap();
    }

    assert!(schema::bootstrap(&pool, SlotPolicy::Global).await.is_err());
    assert_eq!(
        slot_indexes(&pool, &schema_name).await,
        vec![constraint::SLOT_PER_VET.to_owned()]
    );

    let err = store
        .insert_consultation(NewConsultation::new(animal.id, vets[0], at, None))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Uniqueness { constraint: ref name } if name == constraint::SLOT_PER_VET
    ));

    pool.close().await;
    let admin = create_pool(&url, PoolSettings::default()).await.unwrap();
    admin
        .execute(format!("DROP SCHEMA {} CASCADE", schema_name).as_str())
        .await
        .unwrap();
}
