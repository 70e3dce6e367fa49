//! Environment-variable port.

/// Read-only access to process environment variables.
pub trait Environment: Send + Sync {
    /// Returns the variable's value, or `None` when unset or not UTF-8.
    fn var(&self, key: &str) -> Option<String>;
}
