//! Read-aloud for dashboard fields, one synthesis at a time.

use std::str::FromStr;
use std::sync::Mutex;

use oracle_core::models::analysis::OutbreakAnalysis;
use oracle_speech::SpeechClient;
use tracing::{debug, error};

/// Dashboard fields that can be read aloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakField {
    AlertLevel,
    DiseaseName,
    Region,
}

impl SpeakField {
    pub fn text_of(self, analysis: &OutbreakAnalysis) -> String {
        match self {
            SpeakField::AlertLevel => analysis.alert_level.to_string(),
            SpeakField::DiseaseName => analysis.disease_name.clone(),
            SpeakField::Region => analysis.location.region.clone(),
        }
    }
}

impl FromStr for SpeakField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alert" | "alertlevel" | "alert-level" => Ok(SpeakField::AlertLevel),
            "disease" | "diseasename" | "disease-name" => Ok(SpeakField::DiseaseName),
            "region" => Ok(SpeakField::Region),
            other => Err(format!("unknown field `{other}` (try alert, disease, region)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeakOutcome {
    /// Base64 audio payload.
    Spoken(String),
    /// Another synthesis was in flight; nothing was requested.
    Busy,
    /// Synthesis failed. The error has been logged.
    Failed,
}

/// Guards a [`SpeechClient`] so at most one synthesis runs at a time.
pub struct SpeakGuard {
    client: SpeechClient,
    speaking: Mutex<Option<String>>,
}

impl SpeakGuard {
    pub fn new(client: SpeechClient) -> Self {
        Self {
            client,
            speaking: Mutex::new(None),
        }
    }

    /// Text currently being synthesized, if any.
    pub fn speaking(&self) -> Option<String> {
        lock(&self.speaking).clone()
    }

    pub async fn speak_field(&self, field: SpeakField, analysis: &OutbreakAnalysis) -> SpeakOutcome {
        self.speak(&field.text_of(analysis)).await
    }

    pub async fn speak(&self, text: &str) -> SpeakOutcome {
        {
            let mut slot = lock(&self.speaking);
            if slot.is_some() {
                debug!("speech already in progress, ignoring request");
                return SpeakOutcome::Busy;
            }
            *slot = Some(text.to_string());
        }
        let _release = Release(&self.speaking);

        match self.client.synthesize(text).await {
            Ok(audio) => SpeakOutcome::Spoken(audio),
            Err(e) => {
                error!(error = %e, "failed to speak text");
                SpeakOutcome::Failed
            }
        }
    }
}

/// Clears the in-flight marker, including when the future is dropped.
struct Release<'a>(&'a Mutex<Option<String>>);

impl Drop for Release<'_> {
    fn drop(&mut self) {
        *lock(self.0) = None;
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
