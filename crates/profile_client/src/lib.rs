//! Client side of the Local Gigs profile service
//!
//! This crate provides:
//! - [`ProfileClient`], the HTTP binding of the profile operations
//! - A keyed read-through profile cache with memory and file backends
//! - [`ProfileSync`], which turns partial edits from client pages into the
//!   complete payloads the full-replace update requires

mod cache;
mod client;
mod config;
mod error;
mod sync;

pub use cache::*;
pub use client::*;
pub use config::*;
pub use error::*;
pub use sync::*;
