//! Deterministic provider for tests and offline runs.
//!
//! Replies come from a queue, then from an optional responder closure, then
//! from a default reply. Every call is counted and its messages recorded, and
//! the peak number of concurrent in-flight calls is tracked so callers can
//! check worker-pool bounds.

use super::{ChatMessage, CompletionOptions, CompletionResponse, ModelProviderClient, TokenUsage};
use crate::error::ProviderError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// One scripted outcome of a `complete` call.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedReply {
    Text(String),
    Error(ProviderError),
    /// Sleep on the tokio clock, then produce the inner reply.
    Delayed(Duration, Box<ScriptedReply>),
}

impl ScriptedReply {
    pub fn text(content: impl Into<String>) -> Self {
        ScriptedReply::Text(content.into())
    }

    pub fn delayed(delay: Duration, reply: ScriptedReply) -> Self {
        ScriptedReply::Delayed(delay, Box::new(reply))
    }
}

type Responder = dyn Fn(&[ChatMessage]) -> ScriptedReply + Send + Sync;

pub struct ScriptedProvider {
    script: Mutex<VecDeque<ScriptedReply>>,
    responder: Option<Box<Responder>>,
    default_reply: ScriptedReply,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            responder: None,
            default_reply: ScriptedReply::text("Scripted response"),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every call with the same reply.
    pub fn always(reply: ScriptedReply) -> Self {
        Self::new(Vec::new()).with_default(reply)
    }

    /// Answer each call by inspecting its messages.
    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&[ChatMessage]) -> ScriptedReply + Send + Sync + 'static,
    {
        let mut provider = Self::new(Vec::new());
        provider.responder = Some(Box::new(responder));
        provider
    }

    pub fn with_default(mut self, reply: ScriptedReply) -> Self {
        self.default_reply = reply;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().clone()
    }

    fn next_reply(&self, messages: &[ChatMessage]) -> ScriptedReply {
        if let Some(reply) = self.script.lock().pop_front() {
            return reply;
        }
        match &self.responder {
            Some(responder) => responder(messages),
            None => self.default_reply.clone(),
        }
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ModelProviderClient for ScriptedProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        _options: CompletionOptions,
    ) -> Result<CompletionResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        let mut reply = self.next_reply(&messages);
        self.requests.lock().push(messages);

        loop {
            match reply {
                ScriptedReply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
                ScriptedReply::Error(err) => return Err(err),
                ScriptedReply::Text(content) => {
                    return Ok(CompletionResponse {
                        content,
                        model: "scripted".to_string(),
                        usage: TokenUsage::default(),
                        finish_reason: Some("stop".to_string()),
                    })
                }
            }
        }
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
