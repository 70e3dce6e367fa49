//! Credential resolution services.

mod resolver;

pub use resolver::{CredentialError, CredentialRequest, CredentialResolver};
