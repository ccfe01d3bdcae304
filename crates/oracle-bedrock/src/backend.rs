//! The seam between the monitor's clients and the model provider.
//!
//! [`AnalysisClient`](crate::analysis::AnalysisClient) and
//! [`ChatSession`](crate::chat::ChatSession) own the request contract
//! (instructions, schema, history, validation). A [`ModelBackend`] only moves
//! requests over the wire and hands back raw text.

use std::future::Future;
use std::pin::Pin;

use futures::stream::BoxStream;
use oracle_core::models::chat::ChatMessage;

use crate::error::BedrockError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A lazy, finite sequence of reply fragments. Ends when the provider
/// signals completion.
pub type TextStream = BoxStream<'static, Result<String, BedrockError>>;

/// MIME type requested for structured output.
pub const JSON_MIME_TYPE: &str = "application/json";

/// A one-shot, schema-constrained generation request.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub model_id: String,
    pub system_instruction: String,
    /// Free-text user content.
    pub prompt: String,
    /// Name the schema is registered under with the provider.
    pub schema_name: String,
    /// JSON schema the reply must conform to.
    pub schema: serde_json::Value,
    /// Output format directive. Always [`JSON_MIME_TYPE`] today.
    pub response_mime_type: String,
    /// Reasoning budget hint. `None` disables extended reasoning.
    pub budget_tokens: Option<u32>,
}

/// A conversational turn: prior history plus the new user message, already
/// appended as the last element of `messages`.
#[derive(Debug, Clone)]
pub struct ConverseRequest {
    pub model_id: String,
    pub system_instruction: String,
    pub messages: Vec<ChatMessage>,
}

/// Transport for the analysis and chat clients.
///
/// Methods return boxed futures for dyn compatibility.
pub trait ModelBackend: Send + Sync {
    /// Run a structured request and return the raw reply text (expected to
    /// be a JSON document, unvalidated).
    fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> BoxFuture<'_, Result<String, BedrockError>>;

    /// Run a conversational turn and wait for the full reply.
    fn converse(&self, request: ConverseRequest) -> BoxFuture<'_, Result<String, BedrockError>>;

    /// Run a conversational turn and stream the reply in fragments.
    fn converse_stream(
        &self,
        request: ConverseRequest,
    ) -> BoxFuture<'_, Result<TextStream, BedrockError>>;
}
