//! Seams to the chat-bot host framework.
//!
//! The host owns message transport, plugin registration and the event loop.
//! This module models only what the plugin consumes: the incoming
//! [`Context`], the outgoing [`Reply`], the [`EventContext`] a plugin fills
//! in, the [`Channel`] used to push messages outside a reply, and the
//! [`Plugin`] hook itself.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;

/// Key in [`Context::kwargs`] identifying who a message should go to.
pub const RECEIVER_KEY: &str = "receiver";

/// Key in [`Context::kwargs`] identifying the conversation.
pub const SESSION_ID_KEY: &str = "session_id";

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Kind of an incoming message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextType {
    Text,
    Voice,
    Image,
    File,
}

/// An incoming message plus host-provided metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    pub kind: ContextType,
    pub content: String,
    pub kwargs: HashMap<String, String>,
}

impl Context {
    pub fn new(kind: ContextType, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            kwargs: HashMap::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(ContextType::Text, content)
    }

    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    /// Non-empty receiver id, if the host supplied one.
    pub fn receiver(&self) -> Option<&str> {
        self.kwargs
            .get(RECEIVER_KEY)
            .map(String::as_str)
            .filter(|r| !r.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// Kind of an outgoing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyType {
    Text,
    /// `content` is the path of an audio file.
    Voice,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub kind: ReplyType,
    pub content: String,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: ReplyType::Text,
            content: content.into(),
        }
    }

    pub fn voice(path: &Path) -> Self {
        Self {
            kind: ReplyType::Voice,
            content: path.display().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventContext
// ---------------------------------------------------------------------------

/// What the host does after a plugin handled an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventAction {
    /// Not handled; let the next plugin look at it.
    #[default]
    Continue,
    /// Stop plugin processing; the host still runs its default handling.
    Break,
    /// Stop all processing and send the reply as is.
    BreakPass,
}

/// Mutable view of one event passed through the plugin chain.
#[derive(Debug, Clone)]
pub struct EventContext {
    pub context: Context,
    pub reply: Option<Reply>,
    pub action: EventAction,
}

impl EventContext {
    pub fn new(context: Context) -> Self {
        Self {
            context,
            reply: None,
            action: EventAction::Continue,
        }
    }

    /// Set the reply and the follow-up action in one go.
    pub fn respond(&mut self, reply: Reply, action: EventAction) {
        self.reply = Some(reply);
        self.action = action;
    }
}

// ---------------------------------------------------------------------------
// Channel / Plugin
// ---------------------------------------------------------------------------

/// A messaging channel that can push a reply outside the request/reply path.
#[async_trait]
pub trait Channel: Send + Sync {
    async fn send(&self, reply: Reply, context: &Context) -> anyhow::Result<()>;
}

/// Registration metadata the host shows in plugin listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    pub name: &'static str,
    pub desire_priority: i32,
    pub description: &'static str,
    pub version: &'static str,
}

/// Hook the host calls for every incoming message.
#[async_trait]
pub trait Plugin: Send + Sync {
    fn info(&self) -> PluginInfo;

    /// Inspect `event` and optionally fill in a reply and an action.
    async fn on_handle_context(&self, event: &mut EventContext);

    fn help_text(&self) -> String;
}
