//! HTTP plumbing shared by the chat and speech clients.
//!
//! * [`HttpTransport`] — async JSON POST with bearer auth.
//! * [`ReqwestTransport`] — the production transport.
//! * [`RetryPolicy`] — 3 attempts with a fixed 1 s delay, transport failures only.

pub mod retry;
pub mod transport;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use retry::RetryPolicy;
pub use transport::{endpoint, HttpResponse, HttpTransport, ReqwestTransport, TransportError};

// test-only re-export so the client test modules can share one scripted
// transport.
#[cfg(test)]
pub use transport::ScriptedTransport;
