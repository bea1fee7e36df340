//! The word-query plugin: command parsing, dispatch and voice delivery.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use word_query::client::ReqwestTransport;
//! use word_query::config::{AppPaths, PluginConfig};
//! use word_query::host::{Channel, Context, EventContext, Plugin};
//! use word_query::plugin::WordQueryPlugin;
//!
//! # async fn example(channel: Arc<dyn Channel>) {
//! let paths = AppPaths::new();
//! let config = PluginConfig::load_or_init(&paths.config_file);
//! let plugin = WordQueryPlugin::from_config(
//!     &config,
//!     paths.tmp_dir,
//!     Arc::new(ReqwestTransport::new()),
//!     channel,
//! );
//!
//! let mut event = EventContext::new(Context::text("单词 tomorrow"));
//! plugin.on_handle_context(&mut event).await;
//! # }
//! ```

pub mod command;
pub mod dispatcher;
pub mod pipeline;
pub mod voice_sender;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use command::Command;
pub use dispatcher::{WordQueryPlugin, PLUGIN_INFO};
pub use pipeline::VoicePipeline;
pub use voice_sender::VoiceSender;
