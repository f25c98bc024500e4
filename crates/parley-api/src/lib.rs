//! Parley API crate - axum HTTP server and route handlers.
//!
//! Provides the REST surface for the chatbot: chat turns, session history,
//! the voice bridge endpoints, health checks, and the embedded frontend.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
