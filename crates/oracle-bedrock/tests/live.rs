//! Integration tests against the real Bedrock runtime.
//!
//! These tests call real AWS APIs and require valid credentials in the
//! environment (e.g. `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`) plus
//! access to the model named by `ORACLE_LIVE_MODEL`.
//!
//! Run with: `cargo test -p oracle-bedrock --test live -- --ignored`

use std::sync::Arc;

use futures::StreamExt;
use oracle_bedrock::analysis::AnalysisClient;
use oracle_bedrock::chat::SessionManager;
use oracle_bedrock::converse::BedrockBackend;
use oracle_core::prompt::{RandomAggregator, collect_and_compose};

async fn backend() -> Arc<BedrockBackend> {
    let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new("us-east-1"))
        .load()
        .await;
    Arc::new(BedrockBackend::new(&config))
}

fn model_id() -> String {
    std::env::var("ORACLE_LIVE_MODEL")
        .unwrap_or_else(|_| "us.anthropic.claude-sonnet-4-5-20250929-v1:0".to_string())
}

#[tokio::test]
#[ignore]
async fn live_analysis_returns_schema_conforming_document() {
    let client = AnalysisClient::new(backend().await, model_id()).with_budget_tokens(None);
    let result = client
        .analyze(&collect_and_compose(&RandomAggregator))
        .await
        .expect("analysis should succeed");

    println!("{}", result.analysis.to_pretty_json().unwrap());
    assert!(!result.analysis.disease_name.is_empty());
}

#[tokio::test]
#[ignore]
async fn live_stream_yields_text() {
    let sessions = SessionManager::new(backend().await, model_id());
    let stream = sessions
        .get_or_create()
        .send_message_streaming("Reply with the single word: ready")
        .await
        .expect("stream should open");

    let text: String = stream.map(|c| c.expect("chunk")).collect().await;
    assert!(!text.trim().is_empty());
}
