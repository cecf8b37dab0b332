//! Bearer token validation.

mod jwt;

pub use jwt::{JwtConfig, JwtTokenService};
