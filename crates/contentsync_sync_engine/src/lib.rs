//! # Contentsync Sync Engine
//!
//! Replays a resolved dependency graph against a target environment.
//!
//! This crate provides:
//! - Execution planning (post-order, assets before entries)
//! - The replay loop with per-item failure isolation
//! - Progress events and a per-run state machine (idle → syncing → complete)
//! - An HTTP-backed content client for the management REST API
//!
//! ## Architecture
//!
//! A run has two steps:
//! 1. Build an [`ExecutionPlan`] from the graph: every dependency before its
//!    dependent, asset siblings before entry siblings, pruned nodes left out
//! 2. Write each planned item through the content client, one at a time
//!
//! ## Key Invariants
//!
//! - Every child is written before its parent
//! - Pruned nodes are never written
//! - One item's failure never stops the run
//! - A run always ends in `Complete`

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod http;
mod plan;
mod progress;
mod state;

pub use config::ContentfulConfig;
pub use error::SyncItemError;
pub use http::{ContentfulClient, HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use plan::{ExecutionPlan, SyncPlan};
pub use progress::{NoProgress, ProgressSink, SyncPhase, SyncProgress};
pub use state::{SyncEngine, SyncReport, SyncState, SyncStats};
