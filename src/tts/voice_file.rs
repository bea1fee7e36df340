//! Saving synthesized audio to uniquely named files in the shared temp dir.
//!
//! File name layout: `word_{word}_{unix_ts}_{suffix}.{format}` where
//! `suffix` is six random lowercase ASCII letters. A saved file belongs to
//! the caller; this module only deletes files it failed to write or that
//! turned out empty.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::distributions::Uniform;
use rand::Rng;
use thiserror::Error;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};

const SUFFIX_LEN: usize = 6;

/// Names tried before giving up on a crowded directory.
const NAME_ATTEMPTS: usize = 5;

/// Errors while persisting a voice file.
#[derive(Debug, Error)]
pub enum VoiceFileError {
    /// Zero bytes ended up on disk; the file has been removed.
    #[error("synthesized audio is empty")]
    Empty,

    /// Creating the directory or writing/checking the file failed.
    #[error("failed to save voice file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Replace anything but alphanumerics, `-` and `_` so the word can't escape
/// the temp directory or break the name layout.
fn sanitize(word: &str) -> String {
    let cleaned: String = word
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(Uniform::new_inclusive(b'a', b'z'))
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect()
}

/// Build a voice file name for `word` at `unix_ts`.
pub fn file_name(word: &str, unix_ts: u64, format: &str) -> String {
    let ext = format.trim().trim_start_matches('.');
    let ext = if ext.is_empty() { "mp3" } else { ext };
    format!("word_{}_{unix_ts}_{}.{ext}", sanitize(word), random_suffix())
}

fn remove_best_effort(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != ErrorKind::NotFound {
            log::error!("tts: failed to clean up {}: {e}", path.display());
        }
    }
}

fn io_err(path: &Path, source: std::io::Error) -> VoiceFileError {
    VoiceFileError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Create a new file in `dir`, drawing names from `next_name` until one is
/// not taken. Existing files are never opened.
async fn create_unique(
    dir: &Path,
    mut next_name: impl FnMut() -> String,
) -> Result<(PathBuf, File), VoiceFileError> {
    let mut attempt = 1;
    loop {
        let path = dir.join(next_name());
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < NAME_ATTEMPTS => {
                log::warn!("tts: {} already exists, picking another name", path.display());
                attempt += 1;
            }
            Err(e) => return Err(io_err(&path, e)),
        }
    }
}

/// Write `audio` through `sink` into the file at `path`, then check what
/// landed on disk. `path` is removed on any failure.
async fn fill<W>(path: PathBuf, sink: W, audio: &[u8]) -> Result<PathBuf, VoiceFileError>
where
    W: AsyncWrite + Unpin,
{
    let written: std::io::Result<u64> = async {
        let mut sink = sink;
        sink.write_all(audio).await?;
        sink.flush().await?;
        drop(sink);
        tokio::fs::metadata(&path).await.map(|m| m.len())
    }
    .await;

    match written {
        Ok(0) => {
            log::error!("tts: saved audio is empty, removing {}", path.display());
            remove_best_effort(&path);
            Err(VoiceFileError::Empty)
        }
        Ok(_) => Ok(path),
        Err(e) => {
            remove_best_effort(&path);
            Err(io_err(&path, e))
        }
    }
}

/// Write `audio` into `dir` under a fresh name and return its path.
///
/// Creates `dir` if needed. On an I/O error the partial file is removed
/// (best effort); a file that ends up with zero bytes is removed and
/// reported as [`VoiceFileError::Empty`].
pub async fn write(
    dir: &Path,
    word: &str,
    format: &str,
    audio: &[u8],
) -> Result<PathBuf, VoiceFileError> {
    let unix_ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| io_err(dir, e))?;

    let (path, file) = create_unique(dir, || file_name(word, unix_ts, format)).await?;
    fill(path, file, audio).await
}
