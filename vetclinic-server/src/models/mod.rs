//! Domain records and validated inputs
//!
//! Records mirror database rows one-to-one. The `New*` types are what the
//! gateway accepts after the HTTP layer has checked field presence.

pub mod animal;
pub mod consultation;
pub mod tutor;
pub mod user;
pub mod validation;

pub use animal::{Animal, AnimalWithTutor, NewAnimal};
pub use consultation::{
    Consultation, ConsultationDetails, ConsultationWithVet, NewConsultation, StatusUpdate,
    DEFAULT_STATUS,
};
pub use tutor::{NewTutor, Tutor};
pub use user::{NewUser, Registration, User};
pub use validation::ValidationError;
