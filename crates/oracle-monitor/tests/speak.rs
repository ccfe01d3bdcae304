mod common;

use std::sync::Arc;

use oracle_monitor::speak::{SpeakField, SpeakGuard, SpeakOutcome};
use oracle_speech::error::SpeechError;
use oracle_speech::{BoxFuture, SpeechBackend, SpeechClient, SpeechRequest};
use tokio::sync::Notify;

use common::analysis;

/// Holds every synthesis until released.
#[derive(Default)]
struct Gated {
    release: Notify,
    fail: bool,
}

impl SpeechBackend for Gated {
    fn synthesize(
        &self,
        _request: SpeechRequest,
    ) -> BoxFuture<'_, Result<Option<String>, SpeechError>> {
        Box::pin(async move {
            self.release.notified().await;
            if self.fail {
                Err(SpeechError::Api("ThrottlingException".into()))
            } else {
                Ok(Some("SUQzBA==".to_string()))
            }
        })
    }
}

fn guard(backend: &Arc<Gated>) -> Arc<SpeakGuard> {
    Arc::new(SpeakGuard::new(SpeechClient::new(backend.clone())))
}

#[tokio::test]
async fn second_request_while_speaking_is_busy() {
    let backend = Arc::new(Gated::default());
    let guard = guard(&backend);

    let first = tokio::spawn({
        let guard = Arc::clone(&guard);
        async move { guard.speak("CRITICAL").await }
    });
    while guard.speaking().is_none() {
        tokio::task::yield_now().await;
    }
    assert_eq!(guard.speaking().as_deref(), Some("CRITICAL"));

    assert_eq!(guard.speak("Dengue").await, SpeakOutcome::Busy);

    backend.release.notify_one();
    assert_eq!(
        first.await.unwrap(),
        SpeakOutcome::Spoken("SUQzBA==".to_string())
    );
    assert!(guard.speaking().is_none());
}

#[tokio::test]
async fn failure_is_swallowed_and_releases_guard() {
    let backend = Arc::new(Gated {
        release: Notify::new(),
        fail: true,
    });
    let guard = guard(&backend);

    backend.release.notify_one();
    assert_eq!(guard.speak("CRITICAL").await, SpeakOutcome::Failed);
    assert!(guard.speaking().is_none());

    backend.release.notify_one();
    assert_eq!(guard.speak("again").await, SpeakOutcome::Failed);
}

#[test]
fn fields_read_from_analysis() {
    let a = analysis("Dengue", "South America");
    assert_eq!(SpeakField::AlertLevel.text_of(&a), "HIGH");
    assert_eq!(SpeakField::DiseaseName.text_of(&a), "Dengue");
    assert_eq!(SpeakField::Region.text_of(&a), "South America");
}

#[test]
fn field_names_parse() {
    assert_eq!("alert".parse::<SpeakField>(), Ok(SpeakField::AlertLevel));
    assert_eq!("diseaseName".parse::<SpeakField>(), Ok(SpeakField::DiseaseName));
    assert_eq!(" Region ".parse::<SpeakField>(), Ok(SpeakField::Region));
    assert!("coordinates".parse::<SpeakField>().is_err());
}
