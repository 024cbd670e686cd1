//! Core entity definitions for Local Gigs.
//!
//! This crate defines the user profile record shared by the profile server,
//! its storage backends and the client-side sync helper.

mod event;
mod preferences;
mod profile;

pub use event::*;
pub use preferences::*;
pub use profile::*;
