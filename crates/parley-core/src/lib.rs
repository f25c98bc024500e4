//! Core crate for Parley - shared configuration, types, and errors.
//!
//! Everything the other crates agree on lives here: the `ParleyConfig`
//! sections loaded from TOML and overridden by environment variables, the
//! conversation types (`Role`, `Message`, `SessionId`), and the top-level
//! `ParleyError` enum.

pub mod config;
pub mod error;
pub mod types;

pub use config::ParleyConfig;
pub use error::{ParleyError, Result};
pub use types::{Message, Role, SessionId};
