//! Consultation endpoints
//!
//! Booking goes through the gateway's conflict check; a taken slot is
//! answered with 400 and the consultation already holding it.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::http::de::{double_option, lenient_timestamp};
use crate::http::error::ApiError;
use crate::http::extractors::{RecordId, ValidJson};
use crate::http::server::AppState;
use crate::models::validation::{require, require_text};
use crate::models::{
    Consultation, ConsultationDetails, NewConsultation, StatusUpdate, ValidationError,
};

/// Book consultation request
#[derive(Deserialize)]
pub struct CreateConsultationRequest {
    pub animal_id: Option<i64>,
    #[serde(alias = "usuario_id")]
    pub user_id: Option<i64>,
    #[serde(
        default,
        alias = "data_hora_agendamento",
        deserialize_with = "lenient_timestamp"
    )]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(alias = "sintomas")]
    pub symptoms: Option<String>,
}

impl TryFrom<CreateConsultationRequest> for NewConsultation {
    type Error = ValidationError;

    fn try_from(req: CreateConsultationRequest) -> Result<Self, Self::Error> {
        Ok(NewConsultation::new(
            require("animal_id", req.animal_id)?,
            require("user_id", req.user_id)?,
            require("scheduled_at", req.scheduled_at)?,
            req.symptoms,
        ))
    }
}

/// Status update request. An explicit `null` note clears the stored one.
#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
    #[serde(
        default,
        alias = "tratamento_prescrito",
        deserialize_with = "double_option"
    )]
    pub treatment_note: Option<Option<String>>,
}

impl TryFrom<UpdateStatusRequest> for StatusUpdate {
    type Error = ValidationError;

    fn try_from(req: UpdateStatusRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            status: require_text("status", req.status)?,
            treatment_note: req.treatment_note,
        })
    }
}

/// GET /consultas - consultations with animal, tutor and veterinarian names
async fn list_consultations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ConsultationDetails>>, ApiError> {
    Ok(Json(state.gateway.list_consultation_details().await?))
}

/// GET /consultas/simples
async fn list_consultations_plain(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Consultation>>, ApiError> {
    Ok(Json(state.gateway.list_consultations().await?))
}

/// POST /consultas - book a slot
async fn create_consultation(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateConsultationRequest>,
) -> Result<(StatusCode, Json<Consultation>), ApiError> {
    let booking = NewConsultation::try_from(req)?;
    let created = state.gateway.create_consultation(booking).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// PATCH /consultas/{id} - set status and optionally the treatment note
async fn update_status(
    State(state): State<Arc<AppState>>,
    RecordId(id): RecordId,
    ValidJson(req): ValidJson<UpdateStatusRequest>,
) -> Result<Json<Consultation>, ApiError> {
    let update = StatusUpdate::try_from(req)?;
    let updated = state.gateway.update_consultation_status(id, update).await?;

    Ok(Json(updated))
}

/// Consultation routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/consultas",
            get(list_consultations).post(create_consultation),
        )
        .route("/consultas/simples", get(list_consultations_plain))
        .route("/consultas/{id}", patch(update_status))
}
