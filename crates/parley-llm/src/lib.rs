//! Reply resolution for Parley - completion provider client + echo fallback.
//!
//! The resolver is chosen once at startup from configuration: a configured
//! completion credential selects the HTTP client, anything else selects the
//! deterministic echo transform. A provider failure at request time surfaces
//! as an error; it never silently falls back to echo.

pub mod client;
pub mod echo;
pub mod error;
pub mod resolver;

pub use client::CompletionClient;
pub use echo::EchoResolver;
pub use error::LlmError;
pub use resolver::{resolver_from_config, ReplyResolver};
