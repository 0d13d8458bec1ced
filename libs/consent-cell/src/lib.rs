pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod text;

pub use error::ConsentError;
pub use models::*;
pub use router::consent_routes;
pub use services::ConsentService;
