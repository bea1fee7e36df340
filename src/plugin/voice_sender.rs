//! Background voice delivery after a text reply.
//!
//! [`VoiceSender::spawn`] submits a detached tokio task: wait a moment so
//! the text reply lands first, run the [`VoicePipeline`], and push the voice
//! file to the receiver through the host [`Channel`]. Nothing waits on the
//! task; failures are only logged. [`VoiceSender::shutdown`] cancels every
//! task still in flight, and a task still running at runtime shutdown is
//! dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::host::{Channel, Context, Reply, RECEIVER_KEY, SESSION_ID_KEY};
use crate::plugin::command::SPEAK_PREFIXES;
use crate::plugin::pipeline::VoicePipeline;

/// Pause before the pipeline starts, letting the text reply go out first.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

#[derive(Clone)]
pub struct VoiceSender {
    pipeline: VoicePipeline,
    channel: Arc<dyn Channel>,
    delay: Duration,
    cancel: CancellationToken,
}

impl VoiceSender {
    pub fn new(pipeline: VoicePipeline, channel: Arc<dyn Channel>) -> Self {
        Self {
            pipeline,
            channel,
            delay: DEFAULT_DELAY,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fire-and-forget delivery of a voice message for `word` to `receiver`.
    ///
    /// The returned handle may be dropped; it is only useful to tests.
    pub fn spawn(&self, word: String, receiver: String) -> JoinHandle<()> {
        let sender = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = sender.cancel.cancelled() => {
                    log::info!("voice_sender: voice for {word:?} cancelled");
                }
                () = sender.deliver(&word, &receiver) => {}
            }
        })
    }

    /// Cancel every pending and future delivery from this sender and its
    /// clones.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    async fn deliver(&self, word: &str, receiver: &str) {
        tokio::time::sleep(self.delay).await;

        let path = match self.pipeline.speak(word).await {
            Ok(path) => path,
            Err(e) => {
                log::warn!("voice_sender: no voice for {word:?}: {e}");
                return;
            }
        };

        let context = Context::text(format!("{} {word}", SPEAK_PREFIXES[0]))
            .with_kwarg(RECEIVER_KEY, receiver)
            .with_kwarg(SESSION_ID_KEY, receiver);

        log::info!("voice_sender: sending {} to {receiver}", path.display());
        match self.channel.send(Reply::voice(&path), &context).await {
            Ok(()) => log::info!("voice_sender: voice for {word:?} delivered to {receiver}"),
            Err(e) => log::error!("voice_sender: failed to send voice to {receiver}: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{HttpResponse, ScriptedTransport};
    use crate::config::{ChatConfig, TtsConfig};
    use crate::host::ReplyType;
    use crate::llm::WordQueryClient;
    use crate::tts::SpeechClient;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Records every send.
    #[derive(Default)]
    struct RecordingChannel {
        sent: Mutex<Vec<(Reply, Context)>>,
    }

    #[async_trait]
    impl Channel for RecordingChannel {
        async fn send(&self, reply: Reply, context: &Context) -> anyhow::Result<()> {
            self.sent.lock().unwrap().push((reply, context.clone()));
            Ok(())
        }
    }

    struct FailingChannel;

    #[async_trait]
    impl Channel for FailingChannel {
        async fn send(&self, _reply: Reply, _context: &Context) -> anyhow::Result<()> {
            anyhow::bail!("channel offline")
        }
    }

    fn completion(content: &str) -> HttpResponse {
        let body = serde_json::json!({ "choices": [{ "message": { "content": content } }] });
        HttpResponse::new(200, body.to_string())
    }

    fn pipeline(transport: &Arc<ScriptedTransport>, dir: &std::path::Path) -> VoicePipeline {
        let chat = ChatConfig {
            api_key: "sk-chat".into(),
            ..ChatConfig::default()
        };
        let tts = TtsConfig {
            api_key: "sk-tts".into(),
            ..TtsConfig::default()
        };
        VoicePipeline::new(
            Arc::new(WordQueryClient::new(transport.clone(), chat)),
            Arc::new(SpeechClient::new(transport.clone(), tts, dir.to_path_buf())),
        )
    }

    #[tokio::test]
    async fn delivers_voice_to_receiver() {
        let dir = tempdir().expect("temp dir");
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(completion("tomorrow n.明天\n例句:\nSee you tomorrow")),
            Ok(HttpResponse::new(200, b"audio".to_vec())),
        ]));
        let channel = Arc::new(RecordingChannel::default());
        let sender = VoiceSender::new(pipeline(&transport, dir.path()), channel.clone())
            .with_delay(Duration::ZERO);

        sender
            .spawn("tomorrow".into(), "wxid_42".into())
            .await
            .expect("task");

        let sent = channel.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (reply, context) = &sent[0];
        assert_eq!(reply.kind, ReplyType::Voice);
        assert!(std::path::Path::new(&reply.content).exists());
        assert_eq!(context.content, "单词听 tomorrow");
        assert_eq!(context.receiver(), Some("wxid_42"));
        assert_eq!(context.kwargs.get(SESSION_ID_KEY).map(String::as_str), Some("wxid_42"));
    }

    #[tokio::test]
    async fn pipeline_failure_sends_nothing() {
        let dir = tempdir().expect("temp dir");
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(completion("tomorrow n.明天")),
            Ok(HttpResponse::new(200, Vec::new())),
        ]));
        let channel = Arc::new(RecordingChannel::default());
        let sender = VoiceSender::new(pipeline(&transport, dir.path()), channel.clone())
            .with_delay(Duration::ZERO);

        sender
            .spawn("tomorrow".into(), "wxid_42".into())
            .await
            .expect("task");

        assert!(channel.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn channel_failure_does_not_panic() {
        let dir = tempdir().expect("temp dir");
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(completion("tomorrow n.明天")),
            Ok(HttpResponse::new(200, b"audio".to_vec())),
        ]));
        let sender = VoiceSender::new(pipeline(&transport, dir.path()), Arc::new(FailingChannel))
            .with_delay(Duration::ZERO);

        assert!(sender
            .spawn("tomorrow".into(), "wxid_42".into())
            .await
            .is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn waits_before_running_the_pipeline() {
        let dir = tempdir().expect("temp dir");
        let transport = Arc::new(ScriptedTransport::unreachable());
        let sender = VoiceSender::new(
            pipeline(&transport, dir.path()),
            Arc::new(RecordingChannel::default()),
        );

        let handle = sender.spawn("tomorrow".into(), "wxid_42".into());
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(transport.calls(), 0);

        tokio::time::sleep(Duration::from_millis(600)).await;
        handle.await.expect("task");
        assert!(transport.calls() >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_delivery() {
        let dir = tempdir().expect("temp dir");
        let transport = Arc::new(ScriptedTransport::unreachable());
        let channel = Arc::new(RecordingChannel::default());
        let sender = VoiceSender::new(pipeline(&transport, dir.path()), channel.clone());

        let handle = sender.spawn("tomorrow".into(), "wxid_42".into());
        tokio::time::sleep(Duration::from_millis(500)).await;
        sender.shutdown();
        handle.await.expect("task");

        assert!(sender.cancel_token().is_cancelled());
        assert_eq!(transport.calls(), 0);
        assert!(channel.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancelled_sender_sends_nothing() {
        let dir = tempdir().expect("temp dir");
        let transport = Arc::new(ScriptedTransport::unreachable());
        let channel = Arc::new(RecordingChannel::default());
        let sender = VoiceSender::new(pipeline(&transport, dir.path()), channel.clone())
            .with_delay(Duration::ZERO);

        sender.clone().shutdown();
        sender
            .spawn("tomorrow".into(), "wxid_42".into())
            .await
            .expect("task");

        assert_eq!(transport.calls(), 0);
        assert!(channel.sent.lock().unwrap().is_empty());
    }
}
