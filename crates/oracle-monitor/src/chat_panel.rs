//! Chat panel state: open/close, priming with the current analysis, and
//! streamed turns folded into a growing transcript entry.
//!
//! Every state change is delivered to each subscriber in order, so a
//! renderer sees each intermediate value of a streamed reply.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures::StreamExt;
use oracle_bedrock::chat::SessionManager;
use oracle_bedrock::context::build_priming_message;
use oracle_core::models::analysis::OutbreakAnalysis;
use oracle_core::models::chat::{ChatMessage, ChatRole};
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Shown when the priming turn fails.
pub const PRIMING_FAILED_MESSAGE: &str =
    "Sorry, I am having trouble connecting. Please try again later.";

/// Shown when a user turn fails.
pub const TURN_FAILED_MESSAGE: &str = "Sorry, an error occurred.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelState {
    pub is_open: bool,
    pub is_loading: bool,
    pub transcript: Vec<ChatMessage>,
}

pub struct ChatPanel {
    sessions: Arc<SessionManager>,
    /// Primed during the current open cycle.
    initialized: AtomicBool,
    state: Mutex<PanelState>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<PanelState>>>,
}

impl ChatPanel {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self {
            sessions,
            initialized: AtomicBool::new(false),
            state: Mutex::new(PanelState::default()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Receive a snapshot after every change, starting from the next one.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<PanelState> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.subscribers).push(tx);
        rx
    }

    pub fn state(&self) -> PanelState {
        lock(&self.state).clone()
    }

    /// Open the panel. The first open per cycle with an analysis available
    /// clears the transcript and primes the session with it.
    pub async fn open(&self, analysis: Option<&OutbreakAnalysis>) {
        self.update(|s| s.is_open = true);

        let Some(analysis) = analysis else {
            debug!("chat opened without an analysis, skipping priming");
            return;
        };
        if self.initialized.swap(true, Ordering::SeqCst) {
            return;
        }

        self.update(|s| {
            s.transcript.clear();
            s.is_loading = true;
        });

        let reply = match build_priming_message(analysis) {
            Ok(priming) => self.sessions.get_or_create().send_message(&priming).await,
            Err(e) => Err(e),
        };

        let text = match reply {
            Ok(greeting) => greeting,
            Err(e) => {
                error!(error = %e, "failed to prime chat session");
                PRIMING_FAILED_MESSAGE.to_string()
            }
        };

        self.update(|s| {
            s.transcript.push(ChatMessage::model(text));
            s.is_loading = false;
        });
    }

    /// Close the panel. The next open primes again; the session itself is
    /// kept.
    pub fn close(&self) {
        self.initialized.store(false, Ordering::SeqCst);
        self.update(|s| s.is_open = false);
    }

    /// Send a user turn and stream the reply into the transcript. Blank
    /// input and input while a request is in flight are ignored.
    pub async fn send(&self, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        let accepted = {
            let mut state = lock(&self.state);
            if state.is_loading {
                false
            } else {
                state.transcript.push(ChatMessage::user(text));
                state.is_loading = true;
                true
            }
        };
        if !accepted {
            debug!("chat busy, ignoring input");
            return;
        }
        self.publish();

        let session = self.sessions.get_or_create();
        let failed = match session.send_message_streaming(text).await {
            Ok(mut stream) => {
                let mut reply = String::new();
                let mut started = false;
                let mut failed = false;
                while let Some(chunk) = stream.next().await {
                    match chunk {
                        Ok(chunk) => {
                            reply.push_str(&chunk);
                            self.update(|s| publish_partial(s, &reply, !started));
                            started = true;
                        }
                        Err(e) => {
                            error!(error = %e, "chat stream failed");
                            failed = true;
                            break;
                        }
                    }
                }
                if !failed && !started {
                    error!("chat stream ended without any text");
                }
                failed || !started
            }
            Err(e) => {
                error!(error = %e, "failed to send chat message");
                true
            }
        };

        self.update(|s| {
            if failed {
                s.transcript.push(ChatMessage::model(TURN_FAILED_MESSAGE));
            }
            s.is_loading = false;
        });
    }

    fn update(&self, f: impl FnOnce(&mut PanelState)) {
        f(&mut lock(&self.state));
        self.publish();
    }

    fn publish(&self) {
        let snapshot = self.state();
        lock(&self.subscribers).retain(|tx| tx.send(snapshot.clone()).is_ok());
    }
}

/// Write the accumulated reply into the trailing model entry, creating it
/// on the first fragment.
fn publish_partial(state: &mut PanelState, reply: &str, first: bool) {
    match state.transcript.last_mut() {
        Some(last) if !first && last.role == ChatRole::Model => last.text = reply.to_string(),
        _ => state.transcript.push(ChatMessage::model(reply)),
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
