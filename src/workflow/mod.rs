//! Work-item workflow orchestration.
//!
//! This module implements the work-item-to-branch-to-pull-request
//! lifecycle: deriving deterministic branch names from work-item metadata,
//! creating branches through compare-and-swap ref updates, creating or
//! reusing pull requests idempotently, linking artifacts back to the work
//! item, and advancing the work-item state. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
