//! Identity handling for Local Gigs.
//!
//! This crate provides:
//! - The identity claim set issued by the hosted identity provider
//! - JWT validation for the profile server
//! - Unverified claim decoding for clients that only need to read their own token

mod error;
mod jwt;
mod user;

pub use error::*;
pub use jwt::*;
pub use user::*;

/// Default JWT expiration time in hours.
pub const DEFAULT_JWT_EXPIRATION_HOURS: u64 = 24;

/// Default JWT issuer.
pub const DEFAULT_JWT_ISSUER: &str = "localgigs";
