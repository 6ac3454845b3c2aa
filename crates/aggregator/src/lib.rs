//! Aggregator crate for the showtimes workspace.
//!
//! This crate contains the orchestrator that runs every configured provider
//! for a request and produces one finalized (and optionally enriched)
//! record set.

pub mod orchestrator;

pub use orchestrator::{Aggregation, ProviderFailure, ShowtimeOrchestrator, ShowtimeRequest};
