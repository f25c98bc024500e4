//! Session store for Parley - per-conversation message history.
//!
//! A session is an ordered list of messages keyed by an opaque identifier.
//! The only implementation today is in-memory with process lifetime; the
//! `SessionStore` trait is the seam where a bounded or persistent store
//! would be substituted without touching the handlers.

pub mod error;
pub mod store;

pub use error::SessionError;
pub use store::{MemoryStore, Session, SessionStore};
