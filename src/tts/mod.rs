//! Text-to-speech side of the plugin.
//!
//! * [`SpeechClient`] — posts text to an OpenAI-compatible `/audio/speech`.
//! * [`voice_file`] — unique naming, saving and cleanup of audio files.

pub mod speech;
pub mod voice_file;

pub use speech::{SpeechClient, SpeechError};
pub use voice_file::VoiceFileError;
