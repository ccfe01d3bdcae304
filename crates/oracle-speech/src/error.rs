use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech synthesis API error: {0}")]
    Api(String),

    #[error("no audio data received from speech synthesis")]
    EmptyResult,
}
