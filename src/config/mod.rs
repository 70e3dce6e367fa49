//! Persisted configuration for the workcycle CLI.
//!
//! Configuration lives in a single JSON file under the platform config
//! directory. The file stores the default organization, the personal access
//! token, and the default repository used when `--repo` is omitted. Reads
//! tolerate a missing file; writes re-validate and tighten file permissions.

mod paths;
mod store;

pub use paths::config_file_path;
pub use store::{ConfigError, StoredConfig};
