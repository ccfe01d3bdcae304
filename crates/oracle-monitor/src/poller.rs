//! Periodic collect-and-analyze loop.
//!
//! The [`Poller`] owns the single piece of dashboard state, published on a
//! `watch` channel. A poll that fails keeps the last good analysis and only
//! sets the error, which lasts until the next poll starts.

use std::sync::Arc;
use std::time::Duration;

use oracle_bedrock::analysis::AnalysisClient;
use oracle_core::models::analysis::OutbreakAnalysis;
use oracle_core::prompt::{DataAggregator, collect_and_compose};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Default refresh period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);

/// Shown in place of provider error details.
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "Failed to fetch and analyze outbreak data. Please check the logs for details.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Idle,
    Loading,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollState {
    pub status: PollStatus,
    /// Most recent successful analysis. Survives failed polls.
    pub analysis: Option<OutbreakAnalysis>,
    pub error: Option<String>,
    pub last_updated: Option<jiff::Timestamp>,
    /// Polls finished so far, successful or not.
    pub completed_polls: u64,
}

impl Default for PollState {
    fn default() -> Self {
        Self {
            status: PollStatus::Loading,
            analysis: None,
            error: None,
            last_updated: None,
            completed_polls: 0,
        }
    }
}

impl PollState {
    /// The loading indicator is only shown until the first analysis lands.
    pub fn show_loading(&self) -> bool {
        self.status == PollStatus::Loading && self.analysis.is_none()
    }
}

pub struct Poller {
    analyzer: AnalysisClient,
    aggregator: Arc<dyn DataAggregator>,
    state: watch::Sender<PollState>,
}

impl Poller {
    pub fn new(analyzer: AnalysisClient, aggregator: Arc<dyn DataAggregator>) -> Self {
        Self {
            analyzer,
            aggregator,
            state: watch::Sender::new(PollState::default()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> PollState {
        self.state.borrow().clone()
    }

    /// Collect signals, run one analysis and publish the outcome.
    /// Returns whether the analysis succeeded.
    pub async fn poll_once(&self) -> bool {
        self.state.send_modify(|s| {
            s.status = PollStatus::Loading;
            s.error = None;
        });

        let prompt = collect_and_compose(self.aggregator.as_ref());
        let outcome = self.analyzer.analyze(&prompt).await;

        match outcome {
            Ok(result) => {
                info!(transaction_id = %result.id, "dashboard analysis updated");
                self.state.send_modify(|s| {
                    s.status = PollStatus::Idle;
                    s.analysis = Some(result.analysis);
                    s.error = None;
                    s.last_updated = Some(jiff::Timestamp::now());
                    s.completed_polls += 1;
                });
                true
            }
            Err(e) => {
                // Details are already logged by the analysis client.
                warn!(error = %e, "poll failed, keeping previous analysis");
                self.state.send_modify(|s| {
                    s.status = PollStatus::Error;
                    s.error = Some(ANALYSIS_FAILED_MESSAGE.to_string());
                    s.completed_polls += 1;
                });
                false
            }
        }
    }

    /// Poll immediately, then once every `interval` until the handle is
    /// shut down or dropped.
    pub fn spawn(self: Arc<Self>, interval: Duration) -> PollerHandle {
        info!(interval_secs = interval.as_secs(), "starting poller");

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.poll_once().await;
            }
        });

        PollerHandle { task }
    }
}

/// Cancels the polling task when shut down or dropped.
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn shutdown(self) {
        info!("stopping poller");
        // Drop aborts the task.
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
