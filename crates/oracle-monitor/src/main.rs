use std::sync::Arc;

use eyre::Result;
use oracle_bedrock::analysis::AnalysisClient;
use oracle_bedrock::backend::ModelBackend;
use oracle_bedrock::chat::SessionManager;
use oracle_bedrock::converse::BedrockBackend;
use oracle_core::prompt::RandomAggregator;
use oracle_monitor::chat_panel::ChatPanel;
use oracle_monitor::poller::Poller;
use oracle_monitor::speak::SpeakGuard;
use oracle_monitor::{aws, config};
use oracle_speech::SpeechClient;
use oracle_speech::polly::PollyBackend;
use tracing::info;

mod console;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_config()?;
    let info = config::config_info(&config);
    info!(
        region = %info.region,
        analysis_model = %info.analysis_model_id,
        chat_model = %info.chat_model_id,
        voice = %info.voice_id,
        poll_interval_secs = info.poll_interval_secs,
        credential_type = %info.credential_type,
        "config loaded"
    );

    let sdk_config = aws::build_aws_config(&config.region, &config.credentials).await;

    let backend: Arc<dyn ModelBackend> = Arc::new(BedrockBackend::new(&sdk_config));
    let analyzer = AnalysisClient::new(Arc::clone(&backend), config.analysis_model_id.clone())
        .with_budget_tokens(config.budget_tokens);
    let poller = Arc::new(Poller::new(analyzer, Arc::new(RandomAggregator)));

    let sessions = Arc::new(SessionManager::new(backend, config.chat_model_id.clone()));
    let panel = Arc::new(ChatPanel::new(sessions));

    let speech = SpeechClient::with_voice(
        Arc::new(PollyBackend::new(&sdk_config)),
        config.voice_id.clone(),
    );
    let speaker = Arc::new(SpeakGuard::new(speech));

    let handle = Arc::clone(&poller).spawn(config.poll_interval());

    let result = console::run(poller, panel, speaker).await;

    handle.shutdown();
    result
}
