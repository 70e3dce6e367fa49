//! Adapter implementations of the remote-service ports.

pub mod azdo;
pub mod memory;
