//! Route handlers organized by resource

pub mod animals;
pub mod consultations;
pub mod health;
pub mod tutors;
pub mod users;
