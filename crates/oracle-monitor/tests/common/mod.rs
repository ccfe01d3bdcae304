#![allow(dead_code)]

use std::sync::Arc;

use oracle_bedrock::analysis::AnalysisClient;
use oracle_bedrock::scripted::ScriptedBackend;
use oracle_core::models::analysis::OutbreakAnalysis;
use oracle_core::prompt::{AggregatedSignals, DataAggregator};
use oracle_monitor::poller::Poller;
use serde_json::{Value, json};

pub fn analysis_json(disease: &str, region: &str) -> Value {
    json!({
        "alertLevel": "HIGH",
        "riskScore": 71,
        "diseaseName": disease,
        "location": {
            "country": "Brazil",
            "region": region,
            "coordinates": "15.79° S, 47.88° W"
        },
        "signals": [
            {
                "source": "Hospital records",
                "description": "Fever clusters in two districts",
                "severity": "HIGH",
                "timestamp": "2026-10-18T09:00:00Z"
            }
        ],
        "analysis": {
            "transmissionRate": "R0 1.8",
            "spreadVelocity": "Moderate",
            "populationAtRisk": "3 million",
            "historicalComparison": "Similar to the 2019 dengue season"
        },
        "recommendations": [
            {
                "action": "Increase vector control",
                "priority": "IMMEDIATE",
                "targetAudience": "Municipal health",
                "timeframe": "48 hours"
            },
            {
                "action": "Public awareness campaign",
                "priority": "HIGH",
                "targetAudience": "General public",
                "timeframe": "1 week"
            }
        ],
        "predictiveModel": {
            "7dayProjection": "400 cases",
            "30dayProjection": "2,100 cases",
            "peakDate": "2026-11-20",
            "affectedRegions": ["South America"]
        }
    })
}

pub fn analysis(disease: &str, region: &str) -> OutbreakAnalysis {
    serde_json::from_value(analysis_json(disease, region)).unwrap()
}

pub fn analysis_reply(disease: &str) -> String {
    analysis_json(disease, "South America").to_string()
}

pub struct FixedAggregator;

impl DataAggregator for FixedAggregator {
    fn collect(&self) -> AggregatedSignals {
        AggregatedSignals {
            region: "Brazil".to_string(),
            symptom: "Dengue-like symptoms".to_string(),
        }
    }
}

pub fn poller(backend: &Arc<ScriptedBackend>) -> Poller {
    let analyzer = AnalysisClient::new(backend.clone(), "test-analysis-model");
    Poller::new(analyzer, Arc::new(FixedAggregator))
}
