//! oracle-core
//!
//! Pure domain types, the outbreak-analysis response schema, the prompt
//! composer, and the display-region lookup.
//! No AWS SDK dependency; this is the shared vocabulary of the monitor.

pub mod error;
pub mod models;
pub mod prompt;
pub mod region;
pub mod schema;
