//! Repository-target resolution services.

mod resolver;

pub use resolver::{RepoResolutionError, RepoTargetResolver};
