//! oracle-speech
//!
//! Text-to-speech for dashboard fields via Amazon Polly.

pub mod error;
pub mod polly;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{error, info};

use crate::error::SpeechError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Voice used when none is configured.
pub const DEFAULT_VOICE: &str = "Joanna";

/// Directive every utterance is wrapped in.
pub const SPEAK_DIRECTIVE: &str = "Say clearly";

/// One synthesis request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    /// The full instruction, `"Say clearly: <text>"`, for backends that take
    /// instructions. [`polly::PollyBackend`] reads `text` and expresses the
    /// directive as slowed SSML prosody instead.
    pub prompt: String,
    /// The text to be spoken, unwrapped.
    pub text: String,
    pub voice: String,
}

impl SpeechRequest {
    pub fn new(text: &str, voice: &str) -> Self {
        Self {
            prompt: format!("{SPEAK_DIRECTIVE}: {text}"),
            text: text.to_string(),
            voice: voice.to_string(),
        }
    }
}

/// Transport for speech synthesis. Returns the base64 audio payload, or
/// `None` when the provider answered without audio.
pub trait SpeechBackend: Send + Sync {
    fn synthesize(
        &self,
        request: SpeechRequest,
    ) -> BoxFuture<'_, Result<Option<String>, SpeechError>>;
}

/// Converts text to a base64 audio payload with a single fixed voice.
///
/// Calls are not coordinated: callers that must not overlap syntheses are
/// responsible for waiting on the previous one.
pub struct SpeechClient {
    backend: Arc<dyn SpeechBackend>,
    voice: String,
}

impl SpeechClient {
    pub fn new(backend: Arc<dyn SpeechBackend>) -> Self {
        Self::with_voice(backend, DEFAULT_VOICE)
    }

    pub fn with_voice(backend: Arc<dyn SpeechBackend>, voice: impl Into<String>) -> Self {
        Self {
            backend,
            voice: voice.into(),
        }
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    /// Synthesize `text`, returning the payload exactly as the backend
    /// produced it.
    pub async fn synthesize(&self, text: &str) -> Result<String, SpeechError> {
        let request = SpeechRequest::new(text, &self.voice);

        let payload = self.backend.synthesize(request).await.inspect_err(|e| {
            error!(error = %e, "speech synthesis failed");
        })?;

        match payload {
            Some(audio) if !audio.is_empty() => {
                info!(voice = %self.voice, payload_len = audio.len(), "speech synthesized");
                Ok(audio)
            }
            _ => {
                error!(voice = %self.voice, "speech synthesis returned no audio");
                Err(SpeechError::EmptyResult)
            }
        }
    }
}
