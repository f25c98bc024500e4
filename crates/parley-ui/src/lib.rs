//! Embedded web frontend for Parley.

pub mod chat;

pub use chat::CHAT_HTML;
