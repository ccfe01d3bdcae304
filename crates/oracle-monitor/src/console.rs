//! Line-oriented terminal front end.

use std::io::Write;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use eyre::Result;
use oracle_core::models::chat::{ChatMessage, ChatRole};
use oracle_monitor::chat_panel::{ChatPanel, PanelState};
use oracle_monitor::dashboard::DashboardView;
use oracle_monitor::poller::Poller;
use oracle_monitor::speak::{SpeakField, SpeakGuard, SpeakOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

const HELP: &str = "\
commands:
  /open            open the chat panel
  /close           close the chat panel
  /speak <field>   read a field aloud (alert, disease, region)
  /refresh         poll now
  /show            print the dashboard
  /quit            exit
anything else is sent to the chat when it is open";

pub async fn run(poller: Arc<Poller>, panel: Arc<ChatPanel>, speaker: Arc<SpeakGuard>) -> Result<()> {
    println!("{HELP}");

    let dashboard = tokio::spawn(print_dashboard(Arc::clone(&poller)));
    let transcript = tokio::spawn(print_transcript(Arc::clone(&panel)));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, arg) = line.split_once(' ').unwrap_or((line, ""));

        match command {
            "/quit" => break,
            "/help" => println!("{HELP}"),
            "/show" => print!("{}", DashboardView::from_state(&poller.state())),
            "/refresh" => {
                let poller = Arc::clone(&poller);
                tokio::spawn(async move { poller.poll_once().await });
            }
            "/open" => {
                let panel = Arc::clone(&panel);
                let analysis = poller.state().analysis;
                if analysis.is_none() {
                    println!("no analysis yet, the chat will not be primed");
                }
                tokio::spawn(async move { panel.open(analysis.as_ref()).await });
            }
            "/close" => panel.close(),
            "/speak" => {
                let field = match arg.parse::<SpeakField>() {
                    Ok(field) => field,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                let Some(analysis) = poller.state().analysis else {
                    println!("nothing to read yet");
                    continue;
                };
                let speaker = Arc::clone(&speaker);
                tokio::spawn(async move {
                    let outcome = speaker.speak_field(field, &analysis).await;
                    report_speech(outcome).await;
                });
            }
            _ if panel.state().is_open => {
                let panel = Arc::clone(&panel);
                let text = line.to_string();
                tokio::spawn(async move { panel.send(&text).await });
            }
            "" => {}
            _ => println!("chat is closed, use /open first"),
        }
    }

    dashboard.abort();
    transcript.abort();
    Ok(())
}

async fn print_dashboard(poller: Arc<Poller>) {
    let mut rx = poller.subscribe();
    let mut shown_polls = None;
    loop {
        let view = {
            let state = rx.borrow_and_update();
            if shown_polls == Some(state.completed_polls) {
                None
            } else {
                shown_polls = Some(state.completed_polls);
                Some(DashboardView::from_state(&state))
            }
        };
        if let Some(view) = view {
            print!("\n{view}");
            let _ = std::io::stdout().flush();
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

async fn print_transcript(panel: Arc<ChatPanel>) {
    let mut rx = panel.subscribe();
    let mut printed: Vec<ChatMessage> = Vec::new();
    let mut was_loading = false;

    while let Some(state) = rx.recv().await {
        print_delta(&printed, &state);
        if was_loading && !state.is_loading {
            println!();
        }
        was_loading = state.is_loading;
        printed = state.transcript;
        let _ = std::io::stdout().flush();
    }
}

/// Print only what changed since `printed`: new model entries, or the tail
/// of a reply that is still streaming.
fn print_delta(printed: &[ChatMessage], state: &PanelState) {
    let printed: &[ChatMessage] = if state.transcript.len() < printed.len() {
        &[]
    } else {
        printed
    };

    for (i, msg) in state.transcript.iter().enumerate() {
        match printed.get(i) {
            Some(prev) => {
                if msg.text.len() > prev.text.len() && msg.text.starts_with(&prev.text) {
                    print!("{}", &msg.text[prev.text.len()..]);
                }
            }
            None if msg.role == ChatRole::Model => print!("\noracle> {}", msg.text),
            None => {}
        }
    }
}

async fn report_speech(outcome: SpeakOutcome) {
    match outcome {
        SpeakOutcome::Spoken(payload) => {
            let audio = match STANDARD.decode(&payload) {
                Ok(audio) => audio,
                Err(e) => {
                    warn!(error = %e, "speech payload is not valid base64");
                    return;
                }
            };
            let path = std::env::temp_dir().join("outbreak-oracle-speech.mp3");
            match tokio::fs::write(&path, &audio).await {
                Ok(()) => {
                    info!(path = %path.display(), bytes = audio.len(), "speech saved");
                    println!("speech saved to {}", path.display());
                }
                Err(e) => warn!(error = %e, "failed to save speech"),
            }
        }
        SpeakOutcome::Busy => println!("already speaking"),
        SpeakOutcome::Failed => {}
    }
}
