//! # Contentsync Testkit
//!
//! Test utilities for contentsync.
//!
//! This crate provides:
//! - Entry and asset builders
//! - Canned content scenarios (cycles, shared references)
//! - Property-based generators of random content sets
//! - Export file helpers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use contentsync_testkit::prelude::*;
//!
//! #[test]
//! fn resolves_cycle() {
//!     let scenario = direct_cycle();
//!     let graph = DependencyResolver::new(&scenario.client).resolve(scenario.root);
//!     // ... assertions
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use contentsync_core::{DependencyResolver, MemoryContentClient};
}

pub use fixtures::*;
pub use generators::*;
