//! Credential resolution for the workcycle CLI.
//!
//! Credentials (organization endpoint plus personal access token) are
//! resolved once per command invocation from, in order of precedence,
//! command-line flags, environment variables, the stored configuration, and
//! interactive prompts. The resolved value is threaded explicitly into each
//! orchestration call; there is no process-wide credential state. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Resolution service in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
