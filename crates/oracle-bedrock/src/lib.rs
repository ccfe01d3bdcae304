//! oracle-bedrock
//!
//! Bedrock model invocation for the monitor: schema-constrained outbreak
//! analysis, the conversational session, and the backend seam both sit on.

pub mod analysis;
pub mod backend;
pub mod chat;
pub mod context;
pub mod converse;
pub mod document;
pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod scripted;
