//! In-memory [`ModelBackend`] that replays queued replies and records every
//! request it receives. Used by this crate's tests and by the monitor's.

use std::collections::VecDeque;
use std::sync::Mutex;

use futures::StreamExt;

use crate::backend::{BoxFuture, ConverseRequest, ModelBackend, StructuredRequest, TextStream};
use crate::error::BedrockError;

type Queue<T> = Mutex<VecDeque<T>>;

/// Replies for a streamed turn: either the stream fails to open, or it
/// yields the listed fragments in order.
pub type ScriptedStream = Result<Vec<Result<String, BedrockError>>, BedrockError>;

#[derive(Default)]
pub struct ScriptedBackend {
    structured: Queue<Result<String, BedrockError>>,
    replies: Queue<Result<String, BedrockError>>,
    streams: Queue<ScriptedStream>,
    structured_requests: Mutex<Vec<StructuredRequest>>,
    converse_requests: Mutex<Vec<ConverseRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_structured(&self, reply: Result<String, BedrockError>) {
        lock(&self.structured).push_back(reply);
    }

    pub fn push_reply(&self, reply: Result<String, BedrockError>) {
        lock(&self.replies).push_back(reply);
    }

    pub fn push_stream(&self, stream: ScriptedStream) {
        lock(&self.streams).push_back(stream);
    }

    /// Convenience for a stream that yields `chunks` and ends cleanly.
    pub fn push_chunks(&self, chunks: &[&str]) {
        self.push_stream(Ok(chunks.iter().map(|c| Ok(c.to_string())).collect()));
    }

    pub fn structured_requests(&self) -> Vec<StructuredRequest> {
        lock(&self.structured_requests).clone()
    }

    /// Both single-shot and streamed conversational requests, in call order.
    pub fn converse_requests(&self) -> Vec<ConverseRequest> {
        lock(&self.converse_requests).clone()
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn exhausted(kind: &str) -> BedrockError {
    BedrockError::Invocation(format!("no scripted {kind} reply left"))
}

impl ModelBackend for ScriptedBackend {
    fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> BoxFuture<'_, Result<String, BedrockError>> {
        lock(&self.structured_requests).push(request);
        let reply = lock(&self.structured)
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("structured")));
        Box::pin(async move { reply })
    }

    fn converse(&self, request: ConverseRequest) -> BoxFuture<'_, Result<String, BedrockError>> {
        lock(&self.converse_requests).push(request);
        let reply = lock(&self.replies)
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("converse")));
        Box::pin(async move { reply })
    }

    fn converse_stream(
        &self,
        request: ConverseRequest,
    ) -> BoxFuture<'_, Result<TextStream, BedrockError>> {
        lock(&self.converse_requests).push(request);
        let scripted = lock(&self.streams)
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("stream")));
        Box::pin(async move {
            let chunks = scripted?;
            Ok(futures::stream::iter(chunks).boxed())
        })
    }
}
