pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::BookingError;
pub use models::*;
pub use router::booking_routes;
pub use services::{BookingLifecycle, BookingService};
