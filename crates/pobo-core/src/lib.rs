//! # Pobo Core
//!
//! Network-free logic for the Pobo résumé assistant: data models, the
//! knowledge record set and its fallback snapshot, the embedding and vector
//! store traits, the chat model trait, and prompt assembly.
//!
//! This crate contains no tokio, reqwest, or other runtime dependencies.
//! HTTP backends and request orchestration live in the `pobo` app crate.

pub mod chat;
pub mod embedding;
pub mod error;
pub mod fallback;
pub mod knowledge;
pub mod models;
pub mod prompt;
pub mod store;

pub use error::{RagError, Result};
