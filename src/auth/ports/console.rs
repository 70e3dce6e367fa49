//! Console port for interactivity probes and prompting.

use std::io;
use std::sync::Arc;

use thiserror::Error;

/// Errors returned by console implementations.
#[derive(Debug, Clone, Error)]
pub enum PromptError {
    /// Reading from or writing to the terminal failed.
    #[error("terminal interaction failed: {0}")]
    Io(Arc<io::Error>),

    /// The input stream ended before a value was entered.
    #[error("input cancelled")]
    Cancelled,
}

impl PromptError {
    /// Wraps a terminal I/O error.
    #[must_use]
    pub fn io(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

/// Terminal contract used by credential resolution.
pub trait Console: Send + Sync {
    /// Reports whether both stdin and stdout are attached to a terminal.
    fn is_interactive(&self) -> bool;

    /// Prompts for a visible line of input and returns it untrimmed.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError`] when the terminal cannot be read.
    fn prompt_line(&self, message: &str) -> Result<String, PromptError>;

    /// Prompts for a sensitive value such as a token.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError`] when the terminal cannot be read.
    fn prompt_secret(&self, message: &str) -> Result<String, PromptError>;
}
