//! Wire protocol for the Local Gigs profile service
//!
//! This crate defines the JSON payloads, route paths and error bodies shared by
//! the profile server and the client-side sync helper.

mod error;
mod payload;
pub mod paths;
mod types;

pub use error::*;
pub use payload::*;
pub use types::*;
