//! `WordQueryPlugin` — routes word commands to the query and voice paths.
//!
//! # Flow
//!
//! ```text
//! 单词 <word>
//!   └─▶ query_word (awaited)       → text reply, BreakPass
//!         └─▶ receiver present?    → VoiceSender::spawn (not awaited)
//!
//! 单词听 / 听单词 <word>
//!   └─▶ VoicePipeline::speak (awaited)
//!         ├─ Ok  → voice reply, BreakPass
//!         └─ Err → text "生成…失败", BreakPass
//!
//! empty word   → prompt text reply, Break
//! anything else → untouched (Continue)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::client::HttpTransport;
use crate::config::PluginConfig;
use crate::host::{Channel, ContextType, EventAction, EventContext, Plugin, PluginInfo, Reply};
use crate::llm::WordQueryClient;
use crate::plugin::command::Command;
use crate::plugin::pipeline::VoicePipeline;
use crate::plugin::voice_sender::VoiceSender;
use crate::tts::SpeechClient;

pub const PLUGIN_INFO: PluginInfo = PluginInfo {
    name: "WordQuery",
    desire_priority: 10,
    description: "输入关键词'单词 单词名称'即可获取单词的详细解释和发音",
    version: "1.0",
};

const PROMPT_QUERY_WORD: &str = "请输入要查询的单词";
const PROMPT_SPEAK_WORD: &str = "请输入要发音的单词";

pub struct WordQueryPlugin {
    pipeline: VoicePipeline,
    voice_sender: VoiceSender,
}

impl WordQueryPlugin {
    pub fn new(pipeline: VoicePipeline, voice_sender: VoiceSender) -> Self {
        Self {
            pipeline,
            voice_sender,
        }
    }

    /// Wire both clients from `config`, sharing one transport.
    pub fn from_config(
        config: &PluginConfig,
        tmp_dir: PathBuf,
        transport: Arc<dyn HttpTransport>,
        channel: Arc<dyn Channel>,
    ) -> Self {
        let query = WordQueryClient::new(transport.clone(), config.chat.clone());
        let speech = SpeechClient::new(transport, config.tts.clone(), tmp_dir);
        let pipeline = VoicePipeline::new(Arc::new(query), Arc::new(speech));
        let voice_sender = VoiceSender::new(pipeline.clone(), channel);
        Self::new(pipeline, voice_sender)
    }

    /// Cancel background voice deliveries that have not finished yet.
    pub fn shutdown(&self) {
        self.voice_sender.shutdown();
    }

    async fn handle_query(&self, event: &mut EventContext, word: String) {
        if word.is_empty() {
            event.respond(Reply::text(PROMPT_QUERY_WORD), EventAction::Break);
            return;
        }

        log::info!("plugin: looking up {word:?}");
        let explanation = self.pipeline.query_client().query_word(&word).await;
        event.respond(Reply::text(explanation), EventAction::BreakPass);

        if let Some(receiver) = event.context.receiver() {
            log::info!("plugin: voice for {word:?} will follow to {receiver}");
            // Not awaited.
            drop(self.voice_sender.spawn(word, receiver.to_string()));
        }
    }

    async fn handle_speak(&self, event: &mut EventContext, word: String) {
        if word.is_empty() {
            event.respond(Reply::text(PROMPT_SPEAK_WORD), EventAction::Break);
            return;
        }

        log::info!("plugin: speaking {word:?}");
        let reply = match self.pipeline.speak(&word).await {
            Ok(path) => {
                log::info!("plugin: voice reply {}", path.display());
                Reply::voice(&path)
            }
            Err(e) => {
                log::warn!("plugin: voice for {word:?} failed: {e}");
                Reply::text(format!("生成\"{word}\"的语音失败，请稍后重试"))
            }
        };
        event.respond(reply, EventAction::BreakPass);
    }
}

#[async_trait]
impl Plugin for WordQueryPlugin {
    fn info(&self) -> PluginInfo {
        PLUGIN_INFO
    }

    async fn on_handle_context(&self, event: &mut EventContext) {
        if event.context.kind != ContextType::Text {
            return;
        }

        match Command::parse(&event.context.content) {
            Some(Command::Query(word)) => self.handle_query(event, word).await,
            Some(Command::Speak(word)) => self.handle_speak(event, word).await,
            None => {}
        }
    }

    fn help_text(&self) -> String {
        [
            "📚 单词查询插件 📚",
            "",
            "使用方法：",
            "- 发送 '单词 单词名称' 查询单词解释",
            "- 发送 '单词听 单词名称' 或 '听单词 单词名称' 获取单词发音",
            "例如：单词 tomorrow、单词听 tomorrow",
            "",
            "注意：请先在config.json中配置正确的API密钥",
        ]
        .join("\n")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
