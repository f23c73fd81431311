//! # Contentsync Core
//!
//! Dependency graph resolution for content items.
//!
//! This crate provides:
//! - The `ContentClient` capability (read from the source, write to the target)
//! - The `DependencyResolver`, which discovers every entry and asset reachable from a root entry
//! - `DependencyGraph`, the deduplicated result of a resolution
//! - `MemoryContentClient`, an in-memory client for tests and dry runs
//!
//! ## Cycle handling
//!
//! Two independent detectors run during traversal:
//! 1. **Entry loop**: an entry that is its own ancestor on the current path is
//!    returned as a pruned stand-in with no children.
//! 2. **Content-type loop**: an entry whose content type already occurs on the
//!    current path is recorded as pruned and not descended into.
//!
//! Reuse of an already-resolved item from an unrelated branch is neither; it
//! shares the existing node.
//!
//! ## Key Invariants
//!
//! - Each `(kind, id)` key maps to at most one node
//! - A pruned node never has children
//! - Only a failure to fetch the root is fatal

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod error;
mod graph;
mod memory;
mod resolver;

pub use client::{ClientError, ClientResult, ContentClient};
pub use config::{ResolverConfig, DEFAULT_MAX_DEPTH};
pub use error::{CoreError, CoreResult};
pub use graph::{Child, DependencyGraph, DependencyNode, NodeStatus, NodeView, PruneReason};
pub use memory::MemoryContentClient;
pub use resolver::DependencyResolver;

pub use contentsync_model as model;
