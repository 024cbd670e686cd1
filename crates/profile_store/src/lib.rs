//! User profile storage for Local Gigs
//!
//! This crate provides a storage abstraction for user profile records. Records
//! are addressed by their primary key and can also be found by a scan over
//! their email address. It ships an in-memory backend (tests and single-process
//! runs) and a SQLite backend.

mod error;
mod memory;
mod sqlite;
mod traits;

pub use error::*;
pub use memory::*;
pub use sqlite::*;
pub use traits::*;
