pub mod actor;
pub mod auth;
pub mod booking;
pub mod error;
pub mod pagination;

pub use actor::{Actor, Role};
pub use booking::{BookingRef, BookingStatus};
pub use error::AppError;
pub use pagination::{Page, PageQuery, Paginated, Pagination};
