//! [`ModelBackend`] over the Bedrock Converse and ConverseStream APIs.
//!
//! Structured output is obtained through tool use: the response schema
//! becomes the input schema of a single tool and the model is steered into
//! calling it. The tool input is handed back as JSON text so the analysis
//! client parses it exactly like a plain-text JSON reply.
//!
//! Extended thinking and forced tool choice cannot be combined on Bedrock,
//! so when a reasoning budget is requested the tool choice drops to `auto`
//! and the system instruction's JSON-only directive carries the constraint.

use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::primitives::event_stream::EventReceiver;
use aws_sdk_bedrockruntime::types::error::ConverseStreamOutputError;
use aws_sdk_bedrockruntime::types::{
    AutoToolChoice, ContentBlock, ContentBlockDelta, ConversationRole, ConverseStreamOutput,
    InferenceConfiguration, Message, SpecificToolChoice, SystemContentBlock, Tool,
    ToolChoice, ToolConfiguration, ToolInputSchema, ToolSpecification,
};
use futures::StreamExt;
use oracle_core::models::chat::{ChatMessage, ChatRole};
use serde_json::json;
use tracing::{debug, info};

use crate::backend::{BoxFuture, ConverseRequest, ModelBackend, StructuredRequest, TextStream};
use crate::document::{document_to_json, json_to_document};
use crate::error::BedrockError;

/// Output tokens reserved on top of the reasoning budget.
const RESPONSE_TOKENS: u32 = 8_192;

/// Bedrock Converse transport.
#[derive(Clone)]
pub struct BedrockBackend {
    client: Client,
}

impl BedrockBackend {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

impl ModelBackend for BedrockBackend {
    fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> BoxFuture<'_, Result<String, BedrockError>> {
        Box::pin(async move {
            let tool_config = build_tool_config(&request)?;

            let message = Message::builder()
                .role(ConversationRole::User)
                .content(ContentBlock::Text(request.prompt.clone()))
                .build()
                .map_err(|e| BedrockError::Invocation(e.to_string()))?;

            let mut call = self
                .client
                .converse()
                .model_id(&request.model_id)
                .system(SystemContentBlock::Text(request.system_instruction.clone()))
                .messages(message)
                .tool_config(tool_config);

            if let Some(budget) = request.budget_tokens {
                call = call
                    .inference_config(
                        InferenceConfiguration::builder()
                            .max_tokens(max_tokens_for(budget)?)
                            .build(),
                    )
                    .additional_model_request_fields(json_to_document(&json!({
                        "thinking": { "type": "enabled", "budget_tokens": budget }
                    })));
            }

            info!(
                model_id = %request.model_id,
                schema = %request.schema_name,
                budget_tokens = ?request.budget_tokens,
                "invoking structured generation"
            );

            let response = call
                .send()
                .await
                .map_err(|e| BedrockError::Invocation(e.into_service_error().to_string()))?;

            let output_message = response
                .output()
                .and_then(|o| o.as_message().ok())
                .ok_or_else(|| BedrockError::ResponseParse("no message in response".to_string()))?;

            // Prefer the tool call; fall back to whatever text the model wrote.
            let tool_input = output_message.content().iter().find_map(|block| {
                if let ContentBlock::ToolUse(tool_use) = block {
                    (tool_use.name() == request.schema_name).then(|| tool_use.input())
                } else {
                    None
                }
            });

            match tool_input {
                Some(input) => Ok(serde_json::to_string(&document_to_json(input))?),
                None => Ok(collect_text(output_message.content())),
            }
        })
    }

    fn converse(&self, request: ConverseRequest) -> BoxFuture<'_, Result<String, BedrockError>> {
        Box::pin(async move {
            let messages = to_converse_messages(&request.messages)?;

            let response = self
                .client
                .converse()
                .model_id(&request.model_id)
                .system(SystemContentBlock::Text(request.system_instruction.clone()))
                .set_messages(Some(messages))
                .send()
                .await
                .map_err(|e| BedrockError::Invocation(e.into_service_error().to_string()))?;

            let output_message = response
                .output()
                .and_then(|o| o.as_message().ok())
                .ok_or_else(|| BedrockError::ResponseParse("no message in response".to_string()))?;

            Ok(collect_text(output_message.content()))
        })
    }

    fn converse_stream(
        &self,
        request: ConverseRequest,
    ) -> BoxFuture<'_, Result<TextStream, BedrockError>> {
        Box::pin(async move {
            let messages = to_converse_messages(&request.messages)?;

            let output = self
                .client
                .converse_stream()
                .model_id(&request.model_id)
                .system(SystemContentBlock::Text(request.system_instruction.clone()))
                .set_messages(Some(messages))
                .send()
                .await
                .map_err(|e| BedrockError::Invocation(e.into_service_error().to_string()))?;

            debug!(model_id = %request.model_id, "converse stream opened");

            Ok(text_deltas(output.stream))
        })
    }
}

/// Output limit for a reasoning budget: the budget plus room for the answer.
pub fn max_tokens_for(budget: u32) -> Result<i32, BedrockError> {
    i32::try_from(budget.saturating_add(RESPONSE_TOKENS)).map_err(|_| {
        BedrockError::Invocation(format!("budget_tokens {budget} exceeds the model token limit"))
    })
}

/// Declare the schema as a single tool and pick the tool choice mode.
fn build_tool_config(request: &StructuredRequest) -> Result<ToolConfiguration, BedrockError> {
    let spec = ToolSpecification::builder()
        .name(&request.schema_name)
        .description(format!(
            "Record the assessment. Input must be a single {} document.",
            request.response_mime_type
        ))
        .input_schema(ToolInputSchema::Json(json_to_document(&request.schema)))
        .build()
        .map_err(|e| BedrockError::Invocation(e.to_string()))?;

    let choice = if request.budget_tokens.is_some() {
        ToolChoice::Auto(AutoToolChoice::builder().build())
    } else {
        ToolChoice::Tool(
            SpecificToolChoice::builder()
                .name(&request.schema_name)
                .build()
                .map_err(|e| BedrockError::Invocation(e.to_string()))?,
        )
    };

    ToolConfiguration::builder()
        .tools(Tool::ToolSpec(spec))
        .tool_choice(choice)
        .build()
        .map_err(|e| BedrockError::Invocation(e.to_string()))
}

fn to_converse_messages(messages: &[ChatMessage]) -> Result<Vec<Message>, BedrockError> {
    messages
        .iter()
        .map(|msg| {
            let role = match msg.role {
                ChatRole::User => ConversationRole::User,
                ChatRole::Model => ConversationRole::Assistant,
            };
            Message::builder()
                .role(role)
                .content(ContentBlock::Text(msg.text.clone()))
                .build()
                .map_err(|e| BedrockError::Invocation(e.to_string()))
        })
        .collect()
}

fn collect_text(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .filter_map(|block| {
            if let ContentBlock::Text(text) = block {
                Some(text.as_str())
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("")
}

/// Turn the raw event receiver into a stream of text deltas. Non-text
/// events (block start/stop, metadata, reasoning) are skipped. The stream
/// ends after the first error.
fn text_deltas(
    receiver: EventReceiver<ConverseStreamOutput, ConverseStreamOutputError>,
) -> TextStream {
    futures::stream::unfold(Some(receiver), |state| async move {
        let mut receiver = state?;
        loop {
            match receiver.recv().await {
                Ok(Some(ConverseStreamOutput::ContentBlockDelta(event))) => {
                    if let Some(ContentBlockDelta::Text(text)) = event.delta() {
                        return Some((Ok(text.clone()), Some(receiver)));
                    }
                }
                Ok(Some(_)) => {}
                Ok(None) => return None,
                Err(e) => {
                    let err = BedrockError::Invocation(e.into_service_error().to_string());
                    return Some((Err(err), None));
                }
            }
        }
    })
    .boxed()
}
