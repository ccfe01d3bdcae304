mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::StreamExt;
use oracle_bedrock::backend::{
    BoxFuture, ConverseRequest, ModelBackend, StructuredRequest, TextStream,
};
use oracle_bedrock::chat::SessionManager;
use oracle_bedrock::error::BedrockError;
use oracle_bedrock::scripted::ScriptedBackend;
use oracle_core::models::chat::{ChatMessage, ChatRole};
use oracle_monitor::chat_panel::{ChatPanel, PRIMING_FAILED_MESSAGE, TURN_FAILED_MESSAGE};
use tokio::sync::Notify;

use common::analysis;

/// Holds every streamed turn open until released.
#[derive(Default)]
struct GatedStream {
    release: Notify,
    calls: AtomicUsize,
}

impl ModelBackend for GatedStream {
    fn generate_structured(
        &self,
        _request: StructuredRequest,
    ) -> BoxFuture<'_, Result<String, BedrockError>> {
        Box::pin(async { Err(BedrockError::Invocation("unused".into())) })
    }

    fn converse(&self, _request: ConverseRequest) -> BoxFuture<'_, Result<String, BedrockError>> {
        Box::pin(async { Err(BedrockError::Invocation("unused".into())) })
    }

    fn converse_stream(
        &self,
        _request: ConverseRequest,
    ) -> BoxFuture<'_, Result<TextStream, BedrockError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            self.release.notified().await;
            Ok(futures::stream::iter(vec![Ok("ok".to_string())]).boxed())
        })
    }
}

fn panel(backend: &Arc<ScriptedBackend>) -> ChatPanel {
    ChatPanel::new(Arc::new(SessionManager::new(backend.clone(), "test-chat-model")))
}

#[tokio::test]
async fn open_primes_once_per_cycle() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_reply(Ok("Hello, I'm ready to help.".to_string()));
    let panel = panel(&backend);
    let a = analysis("Dengue", "South America");

    panel.open(Some(&a)).await;
    panel.open(Some(&a)).await;

    let state = panel.state();
    assert!(state.is_open);
    assert!(!state.is_loading);
    assert_eq!(
        state.transcript,
        vec![ChatMessage::model("Hello, I'm ready to help.")]
    );

    let requests = backend.converse_requests();
    assert_eq!(requests.len(), 1);
    let priming = &requests[0].messages[0].text;
    assert!(priming.starts_with("This is the current situation report: "));
    assert!(priming.contains("\"diseaseName\": \"Dengue\""));
}

#[tokio::test]
async fn open_without_analysis_does_not_prime() {
    let backend = Arc::new(ScriptedBackend::new());
    let panel = panel(&backend);

    panel.open(None).await;

    assert!(panel.state().is_open);
    assert!(panel.state().transcript.is_empty());
    assert!(backend.converse_requests().is_empty());
}

#[tokio::test]
async fn reopen_clears_transcript_before_priming_again() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_reply(Ok("First greeting".to_string()));
    backend.push_chunks(&["Sure"]);
    backend.push_reply(Ok("Second greeting".to_string()));
    let panel = panel(&backend);
    let a = analysis("Dengue", "South America");

    panel.open(Some(&a)).await;
    panel.send("Any travel advice?").await;
    panel.close();
    assert!(!panel.state().is_open);

    let mut rx = panel.subscribe();
    panel.open(Some(&a)).await;

    let mut snapshots = Vec::new();
    while let Ok(state) = rx.try_recv() {
        snapshots.push(state);
    }
    let loading = snapshots.iter().find(|s| s.is_loading).unwrap();
    assert!(loading.transcript.is_empty());
    assert_eq!(
        panel.state().transcript,
        vec![ChatMessage::model("Second greeting")]
    );
    assert_eq!(backend.converse_requests().len(), 3);
}

#[tokio::test]
async fn priming_failure_shows_apology() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_reply(Err(BedrockError::Invocation("AccessDenied".into())));
    let panel = panel(&backend);

    panel.open(Some(&analysis("Dengue", "South America"))).await;

    let state = panel.state();
    assert_eq!(state.transcript, vec![ChatMessage::model(PRIMING_FAILED_MESSAGE)]);
    assert!(!state.is_loading);
}

#[tokio::test]
async fn streamed_reply_grows_in_place() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_chunks(&["Hel", "lo", " world"]);
    let panel = panel(&backend);
    let mut rx = panel.subscribe();

    panel.send("Hi").await;

    let mut model_texts = Vec::new();
    while let Ok(state) = rx.try_recv() {
        if let Some(last) = state.transcript.last().filter(|m| m.role == ChatRole::Model) {
            model_texts.push(last.text.clone());
        }
    }
    model_texts.dedup();
    assert_eq!(model_texts, vec!["Hel", "Hello", "Hello world"]);

    let state = panel.state();
    assert_eq!(
        state.transcript,
        vec![ChatMessage::user("Hi"), ChatMessage::model("Hello world")]
    );
    assert!(!state.is_loading);
}

#[tokio::test]
async fn failed_turn_appends_apology() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_stream(Err(BedrockError::Invocation("throttled".into())));
    let panel = panel(&backend);

    panel.send("Hi").await;

    assert_eq!(
        panel.state().transcript,
        vec![
            ChatMessage::user("Hi"),
            ChatMessage::model(TURN_FAILED_MESSAGE)
        ]
    );
}

#[tokio::test]
async fn mid_stream_failure_keeps_partial_and_apologizes() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_stream(Ok(vec![
        Ok("Partial".to_string()),
        Err(BedrockError::Invocation("connection reset".into())),
    ]));
    let panel = panel(&backend);

    panel.send("Hi").await;

    assert_eq!(
        panel.state().transcript,
        vec![
            ChatMessage::user("Hi"),
            ChatMessage::model("Partial"),
            ChatMessage::model(TURN_FAILED_MESSAGE)
        ]
    );
    assert!(!panel.state().is_loading);
}

#[tokio::test]
async fn blank_input_is_ignored() {
    let backend = Arc::new(ScriptedBackend::new());
    let panel = panel(&backend);

    panel.send("   ").await;
    panel.send("").await;

    assert!(panel.state().transcript.is_empty());
    assert!(backend.converse_requests().is_empty());
}

#[tokio::test]
async fn history_accumulates_across_turns() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_chunks(&["One"]);
    backend.push_chunks(&["Two"]);
    let panel = panel(&backend);

    panel.send("first").await;
    panel.send("second").await;

    let requests = backend.converse_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[1].messages,
        vec![
            ChatMessage::user("first"),
            ChatMessage::model("One"),
            ChatMessage::user("second")
        ]
    );
}

#[tokio::test]
async fn input_while_busy_is_ignored() {
    let backend = Arc::new(GatedStream::default());
    let panel = Arc::new(ChatPanel::new(Arc::new(SessionManager::new(
        backend.clone(),
        "test-chat-model",
    ))));

    let first = tokio::spawn({
        let panel = Arc::clone(&panel);
        async move { panel.send("first").await }
    });
    while backend.calls.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }
    assert!(panel.state().is_loading);

    panel.send("second").await;

    backend.release.notify_one();
    first.await.unwrap();

    assert_eq!(
        panel.state().transcript,
        vec![ChatMessage::user("first"), ChatMessage::model("ok")]
    );
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_stream_counts_as_failed_turn() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_chunks(&[]);
    backend.push_chunks(&["Recovered"]);
    let panel = panel(&backend);

    panel.send("Hi").await;
    assert_eq!(
        panel.state().transcript,
        vec![
            ChatMessage::user("Hi"),
            ChatMessage::model(TURN_FAILED_MESSAGE)
        ]
    );
    assert!(!panel.state().is_loading);

    panel.send("Again").await;
    assert_eq!(
        backend.converse_requests()[1].messages,
        vec![ChatMessage::user("Again")]
    );
    assert_eq!(
        panel.state().transcript.last(),
        Some(&ChatMessage::model("Recovered"))
    );
}

#[tokio::test]
async fn empty_greeting_counts_as_failed_priming() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_reply(Ok(String::new()));
    let panel = panel(&backend);

    panel.open(Some(&analysis("Dengue", "South America"))).await;

    assert_eq!(
        panel.state().transcript,
        vec![ChatMessage::model(PRIMING_FAILED_MESSAGE)]
    );
}
