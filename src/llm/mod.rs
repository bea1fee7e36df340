//! Chat-completion side of the plugin.
//!
//! * [`WordQueryClient`] — asks an OpenAI-compatible endpoint to explain a word.
//! * [`prompt`] — the fixed dictionary template and the per-word user message.
//! * [`QueryError`] — error variants, each with a user-facing message.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use word_query::client::ReqwestTransport;
//! use word_query::config::PluginConfig;
//! use word_query::llm::WordQueryClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = PluginConfig::load();
//!     let client = WordQueryClient::new(Arc::new(ReqwestTransport::new()), config.chat);
//!
//!     // Never fails: errors come back as text for the chat user.
//!     println!("{}", client.query_word("tomorrow").await);
//! }
//! ```

pub mod prompt;
pub mod query;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use prompt::{EXAMPLE_MARKER, SYSTEM_PROMPT};
pub use query::{QueryError, WordQueryClient};
