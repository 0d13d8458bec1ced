pub mod slots;
pub mod therapist;

pub use slots::{candidate_slots, validate_window};
pub use therapist::TherapistService;
