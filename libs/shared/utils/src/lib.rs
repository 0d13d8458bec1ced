pub mod extractor;
pub mod jwt;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use extractor::auth_middleware;
pub use jwt::{validate_token, JwtError};
