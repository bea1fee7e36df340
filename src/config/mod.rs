//! Configuration module for the word-query plugin.
//!
//! Provides `PluginConfig` (the `chat` + `tts` credential blocks), `AppPaths`
//! for cross-platform config/temp directories, and JSON persistence via
//! `PluginConfig::load_or_init` / `PluginConfig::save_to`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{ChatConfig, PluginConfig, TtsConfig};
