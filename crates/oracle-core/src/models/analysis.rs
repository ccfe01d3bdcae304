use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The structured risk assessment returned by the analysis model.
///
/// Field names follow the wire format declared in
/// [`crate::schema::outbreak_analysis_schema`]. Every field is required;
/// deserialization fails if any is missing. Values are otherwise taken as
/// the model returned them, with no range or vocabulary checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutbreakAnalysis {
    pub alert_level: AlertLevel,
    pub risk_score: i64,
    pub disease_name: String,
    pub location: Location,
    pub signals: Vec<Signal>,
    pub analysis: AnalysisDetail,
    pub recommendations: Vec<Recommendation>,
    pub predictive_model: PredictiveModel,
}

impl OutbreakAnalysis {
    /// Pretty-printed wire JSON, as embedded in chat context.
    pub fn to_pretty_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub country: String,
    pub region: String,
    pub coordinates: String,
}

/// One observed signal. Order in [`OutbreakAnalysis::signals`] is display
/// order, not necessarily chronological.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub source: String,
    pub description: String,
    pub severity: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDetail {
    pub transmission_rate: String,
    pub spread_velocity: String,
    pub population_at_risk: String,
    pub historical_comparison: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub action: String,
    pub priority: String,
    pub target_audience: String,
    pub timeframe: String,
}

impl Recommendation {
    /// Priority value that gets emphasized on the dashboard.
    pub const IMMEDIATE: &str = "IMMEDIATE";

    pub fn is_immediate(&self) -> bool {
        self.priority == Self::IMMEDIATE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictiveModel {
    #[serde(rename = "7dayProjection")]
    pub seven_day_projection: String,
    #[serde(rename = "30dayProjection")]
    pub thirty_day_projection: String,
    pub peak_date: String,
    pub affected_regions: Vec<String>,
}

/// Five-tier outbreak severity, most severe first.
///
/// A value the model invents outside the five tiers is kept verbatim as
/// [`AlertLevel::Unrecognized`] so it still reaches the display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AlertLevel {
    Critical,
    High,
    Moderate,
    Low,
    Minimal,
    Unrecognized(String),
}

impl AlertLevel {
    /// The declared tiers, in severity order.
    pub const TIERS: [AlertLevel; 5] = [
        AlertLevel::Critical,
        AlertLevel::High,
        AlertLevel::Moderate,
        AlertLevel::Low,
        AlertLevel::Minimal,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            AlertLevel::Critical => "CRITICAL",
            AlertLevel::High => "HIGH",
            AlertLevel::Moderate => "MODERATE",
            AlertLevel::Low => "LOW",
            AlertLevel::Minimal => "MINIMAL",
            AlertLevel::Unrecognized(raw) => raw,
        }
    }

    /// Severity rank, 4 for CRITICAL down to 0 for MINIMAL. `None` for
    /// unrecognized values.
    pub fn severity(&self) -> Option<u8> {
        match self {
            AlertLevel::Critical => Some(4),
            AlertLevel::High => Some(3),
            AlertLevel::Moderate => Some(2),
            AlertLevel::Low => Some(1),
            AlertLevel::Minimal => Some(0),
            AlertLevel::Unrecognized(_) => None,
        }
    }

    /// The tier the risk framework associates with a score.
    ///
    /// Informational only: the model is told about this banding, but a
    /// response whose level disagrees with its score is not corrected.
    pub fn band_for(risk_score: i64) -> AlertLevel {
        match risk_score {
            s if s >= 90 => AlertLevel::Critical,
            s if s >= 70 => AlertLevel::High,
            s if s >= 50 => AlertLevel::Moderate,
            s if s >= 30 => AlertLevel::Low,
            _ => AlertLevel::Minimal,
        }
    }
}

impl From<String> for AlertLevel {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "CRITICAL" => AlertLevel::Critical,
            "HIGH" => AlertLevel::High,
            "MODERATE" => AlertLevel::Moderate,
            "LOW" => AlertLevel::Low,
            "MINIMAL" => AlertLevel::Minimal,
            _ => AlertLevel::Unrecognized(raw),
        }
    }
}

impl From<AlertLevel> for String {
    fn from(level: AlertLevel) -> Self {
        match level {
            AlertLevel::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
