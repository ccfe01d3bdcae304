//! Conversational session over the analysis.
//!
//! # Session ownership
//!
//! There is one session per [`SessionManager`], created on the first
//! [`SessionManager::get_or_create`] and handed out as a cheap clone until
//! [`SessionManager::reset`]. The composition root owns the manager and
//! passes it to whatever needs chat.
//!
//! # History
//!
//! Converse is stateless, so [`ChatSession`] keeps the turn list and sends
//! it with every request. A turn is committed to history only once its reply
//! is complete; a failed turn leaves history untouched.
//!
//! # Streaming
//!
//! [`ChatSession::send_message_streaming`] returns a [`TextStream`] that the
//! caller consumes by value. The concatenated reply is committed when the
//! stream ends without error and produced some text.

use std::sync::{Arc, Mutex};

use futures::StreamExt;
use oracle_core::models::chat::ChatMessage;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::{ConverseRequest, ModelBackend, TextStream};
use crate::error::BedrockError;

pub const CHAT_SYSTEM_INSTRUCTION: &str = "\
You are a helpful AI assistant for the Outbreak Oracle dashboard. \
You provide concise, expert analysis on epidemiological data. \
When the user provides context, use it to answer their questions.";

/// Owns the single lazily created chat session.
pub struct SessionManager {
    backend: Arc<dyn ModelBackend>,
    model_id: String,
    session: Mutex<Option<ChatSession>>,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn ModelBackend>, model_id: impl Into<String>) -> Self {
        Self {
            backend,
            model_id: model_id.into(),
            session: Mutex::new(None),
        }
    }

    /// Return the current session, creating it on first use.
    pub fn get_or_create(&self) -> ChatSession {
        let mut slot = self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        slot.get_or_insert_with(|| {
            let session = ChatSession::new(
                Arc::clone(&self.backend),
                self.model_id.clone(),
                CHAT_SYSTEM_INSTRUCTION.to_string(),
            );
            info!(session_id = %session.id(), model = %self.model_id, "chat session created");
            session
        })
        .clone()
    }

    /// Drop the current session. Handles already given out keep working
    /// but are no longer returned by [`Self::get_or_create`].
    pub fn reset(&self) {
        let previous = self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(session) = previous {
            info!(session_id = %session.id(), "chat session reset");
        }
    }
}

/// Handle to one ongoing conversation.
#[derive(Clone)]
pub struct ChatSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    id: Uuid,
    backend: Arc<dyn ModelBackend>,
    model_id: String,
    system_instruction: String,
    history: AsyncMutex<Vec<ChatMessage>>,
}

impl ChatSession {
    fn new(backend: Arc<dyn ModelBackend>, model_id: String, system_instruction: String) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                id: Uuid::new_v4(),
                backend,
                model_id,
                system_instruction,
                history: AsyncMutex::new(Vec::new()),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// True if both handles refer to the same session.
    pub fn same_session(&self, other: &ChatSession) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Committed turns so far.
    pub async fn history(&self) -> Vec<ChatMessage> {
        self.inner.history.lock().await.clone()
    }

    /// Send `text` and wait for the whole reply.
    pub async fn send_message(&self, text: &str) -> Result<String, BedrockError> {
        let user = ChatMessage::user(text);
        let request = self.request_with(user.clone()).await;

        let reply = self.inner.backend.converse(request).await?;
        if reply.is_empty() {
            warn!(session_id = %self.inner.id, "chat reply was empty, turn not committed");
            return Err(BedrockError::ResponseParse("empty chat reply".to_string()));
        }

        self.inner
            .history
            .lock()
            .await
            .extend([user, ChatMessage::model(reply.clone())]);
        debug!(session_id = %self.inner.id, reply_len = reply.len(), "chat turn complete");

        Ok(reply)
    }

    /// Send `text` and stream the reply back in fragments.
    pub async fn send_message_streaming(&self, text: &str) -> Result<TextStream, BedrockError> {
        let user = ChatMessage::user(text);
        let request = self.request_with(user.clone()).await;

        let upstream = self.inner.backend.converse_stream(request).await?;

        let state = CommitState {
            upstream,
            reply: String::new(),
            user: Some(user),
            inner: Arc::clone(&self.inner),
        };

        let stream = futures::stream::unfold(state, |mut state| async move {
            match state.upstream.next().await {
                Some(Ok(chunk)) => {
                    state.reply.push_str(&chunk);
                    Some((Ok(chunk), state))
                }
                Some(Err(e)) => {
                    warn!(session_id = %state.inner.id, error = %e, "chat stream failed");
                    // Ends the stream after this item and skips the commit.
                    state.user = None;
                    state.upstream = futures::stream::empty().boxed();
                    Some((Err(e), state))
                }
                None => {
                    if let Some(user) = state.user.take() {
                        let reply = std::mem::take(&mut state.reply);
                        if reply.is_empty() {
                            // Converse rejects blank model turns in history.
                            warn!(session_id = %state.inner.id, "chat stream was empty, turn not committed");
                        } else {
                            debug!(
                                session_id = %state.inner.id,
                                reply_len = reply.len(),
                                "chat stream complete"
                            );
                            state
                                .inner
                                .history
                                .lock()
                                .await
                                .extend([user, ChatMessage::model(reply)]);
                        }
                    }
                    None
                }
            }
        });

        Ok(stream.boxed())
    }

    async fn request_with(&self, user: ChatMessage) -> ConverseRequest {
        let mut messages = self.inner.history.lock().await.clone();
        messages.push(user);

        ConverseRequest {
            model_id: self.inner.model_id.clone(),
            system_instruction: self.inner.system_instruction.clone(),
            messages,
        }
    }
}

struct CommitState {
    upstream: TextStream,
    reply: String,
    /// The pending user turn; `None` once committed or abandoned.
    user: Option<ChatMessage>,
    inner: Arc<SessionInner>,
}
