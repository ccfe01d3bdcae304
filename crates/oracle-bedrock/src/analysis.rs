//! Structured outbreak analysis.
//!
//! Sends the composed surveillance prompt with a fixed system instruction
//! and the [`OutbreakAnalysis`] schema, then parses the reply. A reply is
//! accepted only if it is a JSON document carrying every required field;
//! nothing is defaulted and nothing is retried.

use std::sync::Arc;

use oracle_core::models::analysis::OutbreakAnalysis;
use oracle_core::schema::{SCHEMA_NAME, outbreak_analysis_schema};
use tracing::{error, info};
use uuid::Uuid;

use crate::backend::{JSON_MIME_TYPE, ModelBackend, StructuredRequest};
use crate::error::BedrockError;

/// Default reasoning budget for the analysis model.
pub const DEFAULT_BUDGET_TOKENS: u32 = 32_768;

pub const ANALYSIS_SYSTEM_INSTRUCTION: &str = "\
You are OutbreakOracle, an AI epidemiologist specializing in early pandemic detection.

Your capabilities:
1. Analyze multiple data sources for disease outbreak signals
2. Identify unusual patterns in health-related data
3. Assess risk levels for potential outbreaks
4. Compare current situations to historical pandemics
5. Recommend immediate containment actions

Data you analyze:
- Social media posts mentioning symptoms
- News articles about unusual illnesses
- Search trend data for medical symptoms
- Weather patterns affecting disease vectors
- Travel data from affected regions
- Hospital admission trends

Risk Assessment Framework:
- CRITICAL (90-100): Immediate pandemic threat, widespread transmission
- HIGH (70-89): Regional outbreak with pandemic potential
- MODERATE (50-69): Localized outbreak, contained but monitored
- LOW (30-49): Isolated cases, standard monitoring
- MINIMAL (0-29): Background noise, no action needed

You must strictly output a JSON object matching the provided schema. \
Do not output markdown or any other text.";

/// A successful analysis, tagged for log correlation.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub id: Uuid,
    pub model_id: String,
    pub analysis: OutbreakAnalysis,
}

pub struct AnalysisClient {
    backend: Arc<dyn ModelBackend>,
    model_id: String,
    budget_tokens: Option<u32>,
}

impl AnalysisClient {
    pub fn new(backend: Arc<dyn ModelBackend>, model_id: impl Into<String>) -> Self {
        Self {
            backend,
            model_id: model_id.into(),
            budget_tokens: Some(DEFAULT_BUDGET_TOKENS),
        }
    }

    /// Override the reasoning budget. `None` turns extended reasoning off.
    pub fn with_budget_tokens(mut self, budget_tokens: Option<u32>) -> Self {
        self.budget_tokens = budget_tokens;
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Assemble the request for `prompt` without sending it.
    pub fn build_request(&self, prompt: &str) -> StructuredRequest {
        StructuredRequest {
            model_id: self.model_id.clone(),
            system_instruction: ANALYSIS_SYSTEM_INSTRUCTION.to_string(),
            prompt: prompt.to_string(),
            schema_name: SCHEMA_NAME.to_string(),
            schema: outbreak_analysis_schema(),
            response_mime_type: JSON_MIME_TYPE.to_string(),
            budget_tokens: self.budget_tokens,
        }
    }

    /// Run one analysis of `prompt`.
    pub async fn analyze(&self, prompt: &str) -> Result<AnalysisResult, BedrockError> {
        let id = Uuid::new_v4();
        info!(transaction_id = %id, model = %self.model_id, "starting outbreak analysis");

        let raw = match self.backend.generate_structured(self.build_request(prompt)).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(transaction_id = %id, error = %e, "analysis request failed");
                return Err(e);
            }
        };

        let analysis = parse_analysis(&raw).inspect_err(|e| {
            error!(transaction_id = %id, error = %e, "analysis response rejected");
        })?;

        info!(
            transaction_id = %id,
            alert_level = %analysis.alert_level,
            risk_score = analysis.risk_score,
            "outbreak analysis complete"
        );

        Ok(AnalysisResult {
            id,
            model_id: self.model_id.clone(),
            analysis,
        })
    }
}

/// Parse a raw reply into an [`OutbreakAnalysis`].
///
/// Surrounding whitespace is trimmed. Text that is not JSON fails with
/// [`BedrockError::ResponseParse`]; JSON that lacks a required field or has
/// the wrong shape fails with [`BedrockError::SchemaViolation`].
pub fn parse_analysis(raw: &str) -> Result<OutbreakAnalysis, BedrockError> {
    let trimmed = raw.trim();

    let value: serde_json::Value = serde_json::from_str(trimmed)
        .map_err(|e| BedrockError::ResponseParse(format!("reply is not JSON: {e}")))?;

    serde_json::from_value(value).map_err(|e| {
        BedrockError::SchemaViolation(format!("failed to parse OutbreakAnalysis: {e}"))
    })
}
