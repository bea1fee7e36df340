//! Console host for the word-query plugin.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load (or create) `config.json`: first CLI argument, else the platform
//!    config dir.
//! 3. Build the shared HTTP transport and the stdout channel.
//! 4. Build [`WordQueryPlugin`].
//! 5. Feed every stdin line to the plugin as a text message and print the
//!    reply. `help` prints usage; EOF cancels pending voice sends and exits.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use word_query::{
    client::ReqwestTransport,
    config::{AppPaths, PluginConfig},
    host::{Channel, Context, EventContext, Plugin, Reply, ReplyType, RECEIVER_KEY},
    plugin::WordQueryPlugin,
};

/// Receiver id attached to console messages so voice follow-ups are sent.
const CONSOLE_RECEIVER: &str = "console";

// ---------------------------------------------------------------------------
// StdoutChannel
// ---------------------------------------------------------------------------

/// Channel that "sends" by printing to stdout.
struct StdoutChannel;

#[async_trait]
impl Channel for StdoutChannel {
    async fn send(&self, reply: Reply, context: &Context) -> anyhow::Result<()> {
        let to = context.receiver().unwrap_or("-");
        println!("[to {to}] {}", render(&reply));
        Ok(())
    }
}

fn render(reply: &Reply) -> String {
    match reply.kind {
        ReplyType::Text => reply.content.clone(),
        ReplyType::Voice => format!("🔊 voice: {}", reply.content),
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("word-query starting up");

    // 2. Configuration
    let paths = AppPaths::new();
    let config_file = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| paths.config_file.clone());
    let config = PluginConfig::load_or_init(&config_file);

    // 3-4. Plugin
    let plugin = WordQueryPlugin::from_config(
        &config,
        paths.tmp_dir.clone(),
        Arc::new(ReqwestTransport::new()),
        Arc::new(StdoutChannel),
    );
    log::info!(
        "{} v{} ready (voice files in {})",
        plugin.info().name,
        plugin.info().version,
        paths.tmp_dir.display()
    );
    println!("{}", plugin.help_text());

    // 5. Read commands
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "help" {
            println!("{}", plugin.help_text());
            continue;
        }

        let context = Context::text(line).with_kwarg(RECEIVER_KEY, CONSOLE_RECEIVER);
        let mut event = EventContext::new(context);
        plugin.on_handle_context(&mut event).await;

        match &event.reply {
            Some(reply) => println!("{}", render(reply)),
            None => println!("(no reply)"),
        }
    }

    log::info!("stdin closed, shutting down");
    plugin.shutdown();
    Ok(())
}
