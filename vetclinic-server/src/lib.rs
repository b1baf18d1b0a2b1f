//! vetclinic-server: REST backend for a veterinary clinic
//!
//! Users, tutors, animals and consultations over PostgreSQL, with
//! appointment conflict detection enforced by both an application check
//! and a unique slot index.

pub mod db;
pub mod gateway;
pub mod http;
pub mod models;
pub mod password;
pub mod scheduling;

pub use gateway::{GatewayError, QueryGateway};
pub use scheduling::SlotPolicy;
