pub mod consent;

pub use consent::ConsentService;
