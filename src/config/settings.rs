//! Plugin settings structs, defaults and JSON persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through `config.json` and handed to the
//! clients as immutable values.

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

/// Placeholder written into a freshly created config for the chat key.
pub const CHAT_KEY_PLACEHOLDER: &str = "your_chat_api_key_here";

/// Placeholder written into a freshly created config for the TTS key.
pub const TTS_KEY_PLACEHOLDER: &str = "your_tts_api_key_here";

/// `true` when `key` is something other than blank or `placeholder`.
fn is_usable_key(key: &str, placeholder: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != placeholder
}

// ---------------------------------------------------------------------------
// ChatConfig
// ---------------------------------------------------------------------------

/// Credentials and parameters for the chat-completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Base URL of an OpenAI-compatible API, e.g. `https://api.openai.com/v1`.
    pub base: String,
    /// Bearer token.
    pub api_key: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base: "https://api.openai.com/v1".into(),
            api_key: CHAT_KEY_PLACEHOLDER.into(),
            model: "gpt-3.5-turbo".into(),
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

impl ChatConfig {
    /// `false` when the key is empty or still the placeholder.
    pub fn has_usable_key(&self) -> bool {
        is_usable_key(&self.api_key, CHAT_KEY_PLACEHOLDER)
    }
}

// ---------------------------------------------------------------------------
// TtsConfig
// ---------------------------------------------------------------------------

/// Credentials and parameters for the speech-synthesis endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Base URL of an OpenAI-compatible API, e.g. `https://api.siliconflow.cn/v1`.
    pub base: String,
    /// Bearer token.
    pub api_key: String,
    /// Speech model identifier.
    pub model: String,
    /// Provider-specific voice name.
    pub voice: String,
    /// Audio container requested from the provider; also used as the file
    /// extension of saved voice files.
    pub response_format: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            base: "https://api.siliconflow.cn/v1".into(),
            api_key: TTS_KEY_PLACEHOLDER.into(),
            model: "FunAudioLLM/CosyVoice2-0.5B".into(),
            voice: "FunAudioLLM/CosyVoice2-0.5B:diana".into(),
            response_format: "mp3".into(),
            timeout_secs: 30,
        }
    }
}

impl TtsConfig {
    /// `false` when the key is empty or still the placeholder.
    pub fn has_usable_key(&self) -> bool {
        is_usable_key(&self.api_key, TTS_KEY_PLACEHOLDER)
    }
}

// ---------------------------------------------------------------------------
// PluginConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level plugin configuration, serialised as `config.json`.
///
/// # Persistence
///
/// ```rust,no_run
/// use word_query::config::{AppPaths, PluginConfig};
///
/// // Creates the file with placeholder keys on first run; never fails.
/// let config = PluginConfig::load_or_init(&AppPaths::new().config_file);
/// assert!(!config.chat.base.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Text-to-speech endpoint settings.
    pub tts: TtsConfig,
    /// Chat-completion endpoint settings.
    pub chat: ChatConfig,
}

impl PluginConfig {
    /// Hardcoded configuration used when `config.json` cannot be read or
    /// written: default endpoints and models, empty keys.
    pub fn fallback() -> Self {
        let mut config = Self::default();
        config.chat.api_key.clear();
        config.tts.api_key.clear();
        config
    }

    /// Load from the platform-appropriate `config.json`.
    pub fn load() -> Self {
        Self::load_or_init(&AppPaths::new().config_file)
    }

    /// Load `path`, creating it with placeholder keys when it does not exist.
    ///
    /// Never fails: any read, parse or write error is logged and
    /// [`PluginConfig::fallback`] is returned instead.
    pub fn load_or_init(path: &Path) -> Self {
        let result = if path.exists() {
            Self::load_from(path).inspect(|_| {
                log::info!("config: loaded {}", path.display());
            })
        } else {
            let config = Self::default();
            config.save_to(path).map(|()| {
                log::info!("config: created default config at {}", path.display());
                config
            })
        };

        result.unwrap_or_else(|e| {
            log::error!("config: failed to load {} ({e}); using fallback", path.display());
            Self::fallback()
        })
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
