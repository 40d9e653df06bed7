//! Core business logic - framework-agnostic ledger, history and cache operations.
//!
//! Everything except [`cache`] is pure and synchronous: snapshots in,
//! snapshots or reports out.

/// Audit log entries for applied changes
pub mod audit;
/// Write-through snapshot cache backed by the local database
pub mod cache;
/// Undo/redo history of whole snapshots
pub mod history;
/// Per-person balance computation
pub mod ledger;
/// Snapshot data model
pub mod model;
/// The closed set of ledger mutations
pub mod mutation;
/// Derived report views and amount formatting
pub mod report;
/// Built-in demo data
pub mod sample;
/// Input validation and record normalization
pub mod validation;
