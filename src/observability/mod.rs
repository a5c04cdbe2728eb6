//! Observability for the adapter itself.
//!
//! # Design Decisions
//! - Counter updates are cheap enough to sit on the per-request path
//! - Header names may appear in logs and metrics; header values never do

pub mod metrics;
