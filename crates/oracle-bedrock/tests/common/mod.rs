#![allow(dead_code)]

use serde_json::{Value, json};

pub fn sample_analysis() -> Value {
    json!({
        "alertLevel": "CRITICAL",
        "riskScore": 93,
        "diseaseName": "Novel respiratory syndrome",
        "location": {
            "country": "Vietnam",
            "region": "Southeast Asia",
            "coordinates": "21.03° N, 105.85° E"
        },
        "signals": [
            {
                "source": "News",
                "description": "Mystery illness claims 5 lives",
                "severity": "CRITICAL",
                "timestamp": "2026-10-18T06:30:00Z"
            }
        ],
        "analysis": {
            "transmissionRate": "R0 2.6",
            "spreadVelocity": "Rapid",
            "populationAtRisk": "12 million",
            "historicalComparison": "Comparable to early SARS-CoV-2"
        },
        "recommendations": [
            {
                "action": "Screen outbound travellers",
                "priority": "IMMEDIATE",
                "targetAudience": "Airport authorities",
                "timeframe": "Now"
            }
        ],
        "predictiveModel": {
            "7dayProjection": "800 cases",
            "30dayProjection": "25,000 cases",
            "peakDate": "2026-12-01",
            "affectedRegions": ["Southeast Asia", "Oceania"]
        }
    })
}
