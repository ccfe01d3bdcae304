//! Output-schema declaration for the structured analysis request.
//!
//! The schema is plain JSON Schema (object / string / integer / array /
//! enum nodes) so any provider that accepts a JSON schema for constrained
//! output can take it as-is. Every object node lists all of its properties
//! in `required`.

use serde_json::{Value, json};

use crate::models::analysis::AlertLevel;

/// Name under which the schema is registered with the provider.
pub const SCHEMA_NAME: &str = "outbreak_analysis";

/// Build the JSON schema describing [`OutbreakAnalysis`].
///
/// [`OutbreakAnalysis`]: crate::models::analysis::OutbreakAnalysis
pub fn outbreak_analysis_schema() -> Value {
    let tiers: Vec<String> = AlertLevel::TIERS
        .iter()
        .map(|tier| tier.as_str().to_string())
        .collect();

    object(json!({
        "alertLevel": { "type": "string", "enum": tiers },
        "riskScore": { "type": "integer" },
        "diseaseName": string(),
        "location": object(json!({
            "country": string(),
            "region": string(),
            "coordinates": string(),
        })),
        "signals": array(object(json!({
            "source": string(),
            "description": string(),
            "severity": string(),
            "timestamp": string(),
        }))),
        "analysis": object(json!({
            "transmissionRate": string(),
            "spreadVelocity": string(),
            "populationAtRisk": string(),
            "historicalComparison": string(),
        })),
        "recommendations": array(object(json!({
            "action": string(),
            "priority": string(),
            "targetAudience": string(),
            "timeframe": string(),
        }))),
        "predictiveModel": object(json!({
            "7dayProjection": string(),
            "30dayProjection": string(),
            "peakDate": string(),
            "affectedRegions": array(string()),
        })),
    }))
}

fn string() -> Value {
    json!({ "type": "string" })
}

fn array(items: Value) -> Value {
    json!({ "type": "array", "items": items })
}

/// Wrap a property map in an object node whose `required` list names every
/// property.
fn object(properties: Value) -> Value {
    let required: Vec<String> = properties
        .as_object()
        .map(|props| props.keys().cloned().collect())
        .unwrap_or_default();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
