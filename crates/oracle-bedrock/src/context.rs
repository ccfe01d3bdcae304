//! Situation-report context for chat conversations.
//!
//! The first message of a chat embeds the current analysis so the model
//! answers follow-up questions against it.

use oracle_core::models::analysis::OutbreakAnalysis;

use crate::error::BedrockError;

/// Build the priming message for a fresh chat about `analysis`.
pub fn build_priming_message(analysis: &OutbreakAnalysis) -> Result<String, BedrockError> {
    let report = analysis.to_pretty_json()?;

    Ok(format!(
        "This is the current situation report: {report}. \
         Please answer my questions based on this. \
         Start by greeting me and letting me know you're ready to help."
    ))
}
