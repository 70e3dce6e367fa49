//! Adapter implementations of the credential ports.

mod env;
mod terminal;

pub use env::ProcessEnvironment;
pub use terminal::StdConsole;
