//! Query → extract → synthesize, shared by the "speak word" command and the
//! background voice sender.

use std::path::PathBuf;
use std::sync::Arc;

use crate::extract::to_speech_text;
use crate::llm::WordQueryClient;
use crate::tts::{SpeechClient, SpeechError};

/// Produces a voice file (headword + example sentence) for a word.
#[derive(Clone)]
pub struct VoicePipeline {
    query: Arc<WordQueryClient>,
    speech: Arc<SpeechClient>,
}

impl VoicePipeline {
    pub fn new(query: Arc<WordQueryClient>, speech: Arc<SpeechClient>) -> Self {
        Self { query, speech }
    }

    pub fn query_client(&self) -> &WordQueryClient {
        &self.query
    }

    /// Run the three steps for `word` and return the saved voice file.
    ///
    /// The query never fails: when it does not produce an explanation, its
    /// user-facing error text is what gets spoken. Only synthesis can fail.
    pub async fn speak(&self, word: &str) -> Result<PathBuf, SpeechError> {
        let explanation = self.query.query_word(word).await;
        log::info!("pipeline: explanation for {word:?} received");

        let text = to_speech_text(&explanation);
        log::info!("pipeline: speech text {text:?}");

        self.speech.try_synthesize(&text, word).await
    }
}
