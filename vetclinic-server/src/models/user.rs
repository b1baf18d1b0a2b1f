//! Clinic users (veterinarians and staff)

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User row as exposed to clients. The credential hash never leaves the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub profile: String,
}

/// Registration input carrying the plain password.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub profile: String,
}

// Keeps the password out of logs.
impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("profile", &self.profile)
            .finish()
    }
}

/// User to insert, credential already hashed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub profile: String,
}

impl NewUser {
    pub fn into_record(self, id: i64) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            profile: self.profile,
        }
    }
}
