//! [`SpeechBackend`] over Amazon Polly `SynthesizeSpeech`.
//!
//! Polly reads its input verbatim instead of following instructions, so the
//! "say clearly" directive is rendered as SSML: the text is escaped and
//! wrapped in a slowed-down prosody element. Audio comes back as an MP3
//! byte stream and is base64-encoded for the caller.

use aws_sdk_polly::Client;
use aws_sdk_polly::types::{Engine, OutputFormat, TextType, VoiceId};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::info;

use crate::error::SpeechError;
use crate::{BoxFuture, SpeechBackend, SpeechRequest};

pub struct PollyBackend {
    client: Client,
}

impl PollyBackend {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

impl SpeechBackend for PollyBackend {
    fn synthesize(
        &self,
        request: SpeechRequest,
    ) -> BoxFuture<'_, Result<Option<String>, SpeechError>> {
        Box::pin(async move {
            info!(voice = %request.voice, text_len = request.text.len(), "requesting speech");

            let response = self
                .client
                .synthesize_speech()
                .engine(Engine::Neural)
                .output_format(OutputFormat::Mp3)
                .text_type(TextType::Ssml)
                .text(render_ssml(&request.text))
                .voice_id(VoiceId::from(request.voice.as_str()))
                .send()
                .await
                .map_err(|e| SpeechError::Api(e.into_service_error().to_string()))?;

            let audio = response
                .audio_stream
                .collect()
                .await
                .map_err(|e| SpeechError::Api(format!("failed to read audio stream: {e}")))?
                .into_bytes();

            if audio.is_empty() {
                return Ok(None);
            }

            Ok(Some(STANDARD.encode(&audio)))
        })
    }
}

/// Render `text` as an SSML document spoken slowly and clearly.
pub fn render_ssml(text: &str) -> String {
    format!(
        "<speak><prosody rate=\"slow\">{}</prosody></speak>",
        escape_xml(text)
    )
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
