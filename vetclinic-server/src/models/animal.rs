//! Animal records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Animal row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Animal {
    pub id: i64,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub sex: Option<String>,
    pub tutor_id: i64,
}

/// Animal row joined with its owner's name for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AnimalWithTutor {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub animal: Animal,
    pub tutor_name: String,
}

/// Animal to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnimal {
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub sex: Option<String>,
    pub tutor_id: i64,
}

impl NewAnimal {
    pub fn into_record(self, id: i64) -> Animal {
        Animal {
            id,
            name: self.name,
            species: self.species,
            breed: self.breed,
            birth_date: self.birth_date,
            sex: self.sex,
            tutor_id: self.tutor_id,
        }
    }
}
