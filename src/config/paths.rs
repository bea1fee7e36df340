//! Cross-platform plugin paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (`config.json`):
//!   Windows: %APPDATA%\word-query\
//!   macOS:   ~/Library/Application Support/word-query/
//!   Linux:   ~/.config/word-query/
//!
//! Temp dir (generated voice files):
//!   Windows: %LOCALAPPDATA%\word-query\tmp\
//!   macOS:   ~/Library/Caches/word-query/tmp/
//!   Linux:   ~/.cache/word-query/tmp/

use std::path::PathBuf;

/// Holds all resolved plugin directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory holding `config.json`.
    pub config_dir: PathBuf,
    /// Full path to `config.json`.
    pub config_file: PathBuf,
    /// Shared directory where synthesized voice files are written.
    pub tmp_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "word-query";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory (config) or the OS temp dir
    /// (voice files) if the platform cannot provide a standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let tmp_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(Self::APP_NAME)
            .join("tmp");

        let config_file = config_dir.join("config.json");

        Self {
            config_dir,
            config_file,
            tmp_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
