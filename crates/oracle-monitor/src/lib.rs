//! oracle-monitor library root.
//!
//! Re-exports internal modules so that integration tests can drive the
//! poller, chat panel, and dashboard without the terminal front end.

pub mod aws;
pub mod chat_panel;
pub mod config;
pub mod dashboard;
pub mod poller;
pub mod speak;
