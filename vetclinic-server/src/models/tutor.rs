//! Tutor (pet owner) records

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Tutor row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tutor {
    pub id: i64,
    pub name: String,
    pub national_id: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Tutor to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTutor {
    pub name: String,
    pub national_id: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl NewTutor {
    /// Materialize the row this input produces once the store assigns `id`.
    pub fn into_record(self, id: i64) -> Tutor {
        Tutor {
            id,
            name: self.name,
            national_id: self.national_id,
            phone: self.phone,
            email: self.email,
            address: self.address,
        }
    }
}
