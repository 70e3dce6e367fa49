//! One-shot credential retry around an orchestration attempt.

use std::future::Future;

use tracing::warn;

use crate::auth::domain::ResolvedCredentials;
use crate::auth::ports::{Console, Environment};
use crate::auth::services::CredentialResolver;

use super::WorkflowError;

/// Where the retry state machine currently is.
///
/// Making the at-most-one-retry invariant a state value (instead of nested
/// error handling) keeps a second retry structurally impossible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttemptPhase {
    /// No retry has happened yet.
    FirstAttempt,
    /// The single allowed retry is running.
    RetriedOnce,
}

/// Wraps an orchestration attempt with a single auth-failure retry.
///
/// When the first attempt fails with an authentication signature and the
/// process is attached to an interactive terminal, a replacement token is
/// prompted for, persisted, and the whole attempt runs exactly once more
/// with rebuilt credentials. Partial outcomes travel on the `Ok` path and
/// are therefore never retried. Non-interactive contexts never retry.
#[derive(Clone)]
pub struct AuthRetry<C, E>
where
    C: Console,
    E: Environment,
{
    resolver: CredentialResolver<C, E>,
}

impl<C, E> AuthRetry<C, E>
where
    C: Console,
    E: Environment,
{
    /// Creates a retry wrapper reacquiring tokens through `resolver`.
    #[must_use]
    pub const fn new(resolver: CredentialResolver<C, E>) -> Self {
        Self { resolver }
    }

    /// Runs `attempt`, retrying once on an interactive auth failure.
    ///
    /// # Errors
    ///
    /// Propagates the attempt's [`WorkflowError`]; a second authentication
    /// failure or any non-auth failure is returned as-is.
    pub async fn run<T, F, Fut>(
        &self,
        credentials: ResolvedCredentials,
        attempt: F,
    ) -> Result<T, WorkflowError>
    where
        F: Fn(ResolvedCredentials) -> Fut,
        Fut: Future<Output = Result<T, WorkflowError>>,
    {
        let mut phase = AttemptPhase::FirstAttempt;
        let mut current = credentials;

        loop {
            match attempt(current.clone()).await {
                Ok(outcome) => return Ok(outcome),
                Err(err) => {
                    let retryable = phase == AttemptPhase::FirstAttempt
                        && err.is_auth_failure()
                        && self.resolver.is_interactive();
                    if !retryable {
                        return Err(err);
                    }

                    warn!("authentication failed (token may be expired); prompting for a new one");
                    let token = self.resolver.reacquire_token(&current)?;
                    current = current.with_replacement_token(token);
                    phase = AttemptPhase::RetriedOnce;
                }
            }
        }
    }
}
