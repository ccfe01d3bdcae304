//! Prompt composition for the periodic analysis request.
//!
//! Signal collection sits behind [`DataAggregator`] so the composer never
//! cares where the region and symptom came from. The only shipped
//! aggregator, [`RandomAggregator`], fabricates them from fixed lists; no
//! real telemetry is ingested.

use rand::seq::IndexedRandom;

/// Regions the random aggregator draws from.
pub const SAMPLE_REGIONS: [&str; 5] = [
    "Southeast Asia",
    "West Africa",
    "South America",
    "Europe",
    "North America",
];

/// Symptom clusters the random aggregator draws from.
pub const SAMPLE_SYMPTOMS: [&str; 5] = [
    "unusual fever and rash",
    "severe respiratory distress",
    "hemorrhagic symptoms",
    "neurological issues",
    "rapid onset flu-like symptoms",
];

/// The inputs the analysis prompt is templated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedSignals {
    pub region: String,
    pub symptom: String,
}

/// Something that can collect the current batch of surveillance signals.
pub trait DataAggregator: Send + Sync {
    fn collect(&self) -> AggregatedSignals;
}

/// Picks a region and symptom cluster uniformly at random.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomAggregator;

impl DataAggregator for RandomAggregator {
    fn collect(&self) -> AggregatedSignals {
        let mut rng = rand::rng();
        let region = SAMPLE_REGIONS.choose(&mut rng).copied().unwrap_or("Europe");
        let symptom = SAMPLE_SYMPTOMS
            .choose(&mut rng)
            .copied()
            .unwrap_or("unusual fever and rash");

        AggregatedSignals {
            region: region.to_string(),
            symptom: symptom.to_string(),
        }
    }
}

/// Render the free-text analysis request for one batch of signals.
pub fn compose_prompt(signals: &AggregatedSignals) -> String {
    let AggregatedSignals { region, symptom } = signals;

    format!(
        "Analyze the following data for disease outbreak signals:

SOCIAL MEDIA DATA:
Multiple posts from {region} on Twitter and local forums mentioning \"{symptom}\" spreading in several villages. Posts mention overwhelmed local clinics.

NEWS HEADLINES:
Local news outlet in {region} reports \"Mystery Illness Claims 5 Lives\". International health organizations are investigating.

GOOGLE TRENDS:
A 1200% spike in search for \"{symptom} treatment\" and \"local pandemic\" in the last 48 hours in {region}.

WEATHER CONDITIONS:
Recent heavy flooding in the area, followed by a spike in mosquito populations. Temperatures are high, favoring vector-borne diseases.

TRAVEL DATA:
Data shows three international flights departed from the main airport in {region} in the last 24 hours to major global hubs.

Task: Identify any unusual patterns, clusters, or anomalies that could indicate an emerging disease outbreak. Cross-reference with historical data. Provide a full risk assessment and recommended actions in the specified JSON format."
    )
}

/// Collect from `aggregator` and compose the prompt in one step.
pub fn collect_and_compose(aggregator: &dyn DataAggregator) -> String {
    compose_prompt(&aggregator.collect())
}
