//! Adapter implementations of the local repository ports.

mod process;

pub use process::GitProcess;
