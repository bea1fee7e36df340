//! Word lookup plugin for chat bots.
//!
//! A user sends `单词 <word>`; the plugin asks an OpenAI-compatible chat
//! endpoint for a dictionary-style explanation and replies with it, then
//! pushes a spoken version (headword + example sentence) through the host's
//! channel. `单词听 <word>` / `听单词 <word>` reply with the voice file directly.
//!
//! * [`config`] — `config.json` with the `chat` and `tts` credential blocks.
//! * [`client`] — HTTP transport and retry policy.
//! * [`llm`] — chat-completion word queries.
//! * [`tts`] — speech synthesis and voice files.
//! * [`extract`] — speech text from an explanation.
//! * [`host`] — the host framework seams the plugin consumes.
//! * [`plugin`] — command dispatch and background voice delivery.

pub mod client;
pub mod config;
pub mod extract;
pub mod host;
pub mod llm;
pub mod plugin;
pub mod tts;
