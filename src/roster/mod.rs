//! Application roster.
//!
//! Loads the monitored applications and their watermarks from a TOML file
//! and validates them before any probing starts.

mod loader;
mod models;

pub use loader::*;
pub use models::*;
