//! Standard-stream console adapter.

use std::io::{self, BufRead, IsTerminal, Write};

use crate::auth::ports::{Console, PromptError};

/// [`Console`] implementation over the process's standard streams.
///
/// Prompts are written to stderr so stdout stays reserved for command
/// output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdConsole;

impl StdConsole {
    /// Writes `message` to stderr and reads one line from stdin.
    fn read_prompted_line(message: &str) -> Result<String, PromptError> {
        let mut stderr = io::stderr().lock();
        write!(stderr, "{message} ").map_err(PromptError::io)?;
        stderr.flush().map_err(PromptError::io)?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(PromptError::io)?;
        if read == 0 {
            return Err(PromptError::Cancelled);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_owned())
    }
}

impl Console for StdConsole {
    fn is_interactive(&self) -> bool {
        io::stdin().is_terminal() && io::stdout().is_terminal()
    }

    fn prompt_line(&self, message: &str) -> Result<String, PromptError> {
        Self::read_prompted_line(message)
    }

    fn prompt_secret(&self, message: &str) -> Result<String, PromptError> {
        Self::read_prompted_line(message)
    }
}
