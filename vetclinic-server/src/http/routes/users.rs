//! User registration endpoint

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::http::extractors::ValidJson;
use crate::http::server::AppState;
use crate::models::validation::require_text;
use crate::models::{Registration, User, ValidationError};

/// Register user request
#[derive(Deserialize)]
pub struct CreateUserRequest {
    #[serde(alias = "nome")]
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "senha")]
    pub password: Option<String>,
    #[serde(alias = "perfil")]
    pub profile: Option<String>,
}

impl TryFrom<CreateUserRequest> for Registration {
    type Error = ValidationError;

    fn try_from(req: CreateUserRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: require_text("name", req.name)?,
            email: require_text("email", req.email)?,
            password: require_text("password", req.password)?,
            profile: require_text("profile", req.profile)?,
        })
    }
}

/// POST /usuarios - register a user
async fn create_user(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let registration = Registration::try_from(req)?;
    let user = state.gateway.create_user(registration).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// User routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/usuarios", post(create_user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_legacy_field_names() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"nome": "Dr. Lima", "email": "lima@clinic.test", "senha": "pw", "perfil": "vet"}"#,
        )
        .unwrap();
        let reg = Registration::try_from(req).unwrap();
        assert_eq!(reg.name, "Dr. Lima");
        assert_eq!(reg.profile, "vet");
    }

    #[test]
    fn missing_password_rejected() {
        let req: CreateUserRequest =
            serde_json::from_str(r#"{"name": "x", "email": "x@y.z", "profile": "vet"}"#).unwrap();
        assert_eq!(
            Registration::try_from(req).unwrap_err(),
            ValidationError::Missing { field: "password" }
        );
    }
}
