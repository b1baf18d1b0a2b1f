//! Animal endpoints, including consultation history

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::http::extractors::{RecordId, ValidJson};
use crate::http::server::AppState;
use crate::models::validation::{require, require_text};
use crate::models::{
    Animal, AnimalWithTutor, Consultation, ConsultationWithVet, NewAnimal, ValidationError,
};

/// Create animal request
#[derive(Deserialize)]
pub struct CreateAnimalRequest {
    #[serde(alias = "nome")]
    pub name: Option<String>,
    #[serde(alias = "especie")]
    pub species: Option<String>,
    #[serde(alias = "raca")]
    pub breed: Option<String>,
    #[serde(alias = "data_nascimento")]
    pub birth_date: Option<NaiveDate>,
    #[serde(alias = "sexo")]
    pub sex: Option<String>,
    #[serde(alias = "id_tutor")]
    pub tutor_id: Option<i64>,
}

impl TryFrom<CreateAnimalRequest> for NewAnimal {
    type Error = ValidationError;

    fn try_from(req: CreateAnimalRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: require_text("name", req.name)?,
            species: require_text("species", req.species)?,
            breed: req.breed,
            birth_date: req.birth_date,
            sex: req.sex,
            tutor_id: require("tutor_id", req.tutor_id)?,
        })
    }
}

/// GET /animais - animals with their tutor's name
async fn list_animals(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AnimalWithTutor>>, ApiError> {
    Ok(Json(state.gateway.list_animals_with_tutor().await?))
}

/// GET /animais/simples
async fn list_animals_plain(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Animal>>, ApiError> {
    Ok(Json(state.gateway.list_animals().await?))
}

/// POST /animais - register an animal under an existing tutor
async fn create_animal(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateAnimalRequest>,
) -> Result<(StatusCode, Json<Animal>), ApiError> {
    let animal = NewAnimal::try_from(req)?;
    let animal = state.gateway.create_animal(animal).await?;

    Ok((StatusCode::CREATED, Json(animal)))
}

/// GET /animais/{id}/historico - most recent first
async fn history(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
) -> Result<Json<Vec<ConsultationWithVet>>, ApiError> {
    Ok(Json(state.gateway.animal_history_with_vet(id).await?))
}

/// GET /animais/{id}/historico/simples
async fn history_plain(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
) -> Result<Json<Vec<Consultation>>, ApiError> {
    Ok(Json(state.gateway.animal_history(id).await?))
}

/// Animal routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/animais", get(list_animals).post(create_animal))
        .route("/animais/simples", get(list_animals_plain))
        .route("/animais/{id}/historico", get(history))
        .route("/animais/{id}/historico/simples", get(history_plain))
}
