//! # Pobo
//!
//! A retrieval-augmented assistant that answers visitor questions about
//! Pabitra Jiban Maity's résumé.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌───────────┐   ┌──────────┐
//!  pobo init ────▶│  loader   │──▶│ embedding │──┐
//!                 └───────────┘   └──────────┘  │ upsert
//!                                               ▼
//!                 ┌───────────┐   ┌──────────┐ ┌──────────┐
//!  POST /api/chat▶│ responder │──▶│ embedding │ │ pinecone │
//!                 └─────┬─────┘   └──────────┘ └────▲─────┘
//!                       │ query ─────────────────────┘
//!                       ▼
//!                 context or fallback ──▶ prompt ──▶ chat model
//! ```
//!
//! Without credentials the same pipeline runs in fallback mode: the
//! responder skips retrieval and prompts with the static knowledge block.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and credentials |
//! | [`embedding`] | Gemini and OpenAI-compatible embedding providers |
//! | [`pinecone`] | Pinecone vector store gateway |
//! | [`chat`] | Gemini chat-completion client |
//! | [`loader`] | Knowledge base initialization |
//! | [`responder`] | Retrieval, fallback, and reply generation |
//! | [`app`] | Client wiring shared by CLI and server |
//! | [`server`] | HTTP API |
//! | [`commands`] | CLI command implementations |

pub mod app;
pub mod chat;
pub mod commands;
pub mod config;
pub mod embedding;
pub mod loader;
pub mod pinecone;
pub mod responder;
pub mod server;
