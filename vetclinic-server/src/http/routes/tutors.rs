//! Tutor endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::http::extractors::ValidJson;
use crate::http::server::AppState;
use crate::models::validation::require_text;
use crate::models::{NewTutor, Tutor, ValidationError};

/// Create tutor request
#[derive(Deserialize)]
pub struct CreateTutorRequest {
    #[serde(alias = "nome")]
    pub name: Option<String>,
    #[serde(alias = "cpf")]
    pub national_id: Option<String>,
    #[serde(alias = "telefone")]
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "endereco")]
    pub address: Option<String>,
}

impl TryFrom<CreateTutorRequest> for NewTutor {
    type Error = ValidationError;

    fn try_from(req: CreateTutorRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: require_text("name", req.name)?,
            national_id: require_text("national_id", req.national_id)?,
            phone: req.phone,
            email: req.email,
            address: req.address,
        })
    }
}

/// GET /tutores - list all tutors
async fn list_tutors(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Tutor>>, ApiError> {
    let tutors = state.gateway.list_tutors().await?;
    Ok(Json(tutors))
}

/// POST /tutores - create a tutor
async fn create_tutor(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateTutorRequest>,
) -> Result<(StatusCode, Json<Tutor>), ApiError> {
    let tutor = NewTutor::try_from(req)?;
    let tutor = state.gateway.create_tutor(tutor).await?;

    Ok((StatusCode::CREATED, Json(tutor)))
}

/// Tutor routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/tutores", get(list_tutors).post(create_tutor))
}
