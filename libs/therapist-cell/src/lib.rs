pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::TherapistError;
pub use models::*;
pub use router::therapist_routes;
pub use services::{candidate_slots, TherapistService};
