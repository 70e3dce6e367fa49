//! Tests for the one-shot auth retry wrapper.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use camino::Utf8PathBuf;
use rstest::rstest;
use tempfile::TempDir;

use crate::auth::domain::{CredentialSource, ResolvedCredentials};
use crate::auth::ports::{Console, Environment, PromptError};
use crate::auth::services::CredentialResolver;
use crate::workflow::domain::{ExecutionResult, PartialArtifact};
use crate::workflow::ports::RemoteError;
use crate::workflow::services::{AuthRetry, WorkflowError};

use super::support;

/// Console with a fixed interactivity flag and queued secret answers.
struct ScriptedConsole {
    interactive: bool,
    answers: Mutex<VecDeque<String>>,
}

impl ScriptedConsole {
    fn new(interactive: bool, answers: &[&str]) -> Self {
        Self {
            interactive,
            answers: Mutex::new(answers.iter().map(|answer| (*answer).to_owned()).collect()),
        }
    }
}

impl Console for ScriptedConsole {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn prompt_line(&self, message: &str) -> Result<String, PromptError> {
        self.prompt_secret(message)
    }

    fn prompt_secret(&self, _message: &str) -> Result<String, PromptError> {
        self.answers
            .lock()
            .expect("console answers lock should not be poisoned")
            .pop_front()
            .ok_or(PromptError::Cancelled)
    }
}

/// Environment with no variables set.
struct EmptyEnvironment;

impl Environment for EmptyEnvironment {
    fn var(&self, _key: &str) -> Option<String> {
        None
    }
}

fn retry_wrapper(
    interactive: bool,
    answers: &[&str],
    dir: &TempDir,
) -> AuthRetry<ScriptedConsole, EmptyEnvironment> {
    let mut config_path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .expect("temp dir path should be UTF-8");
    config_path.push("config.json");
    AuthRetry::new(CredentialResolver::new(
        Arc::new(ScriptedConsole::new(interactive, answers)),
        Arc::new(EmptyEnvironment),
        config_path,
    ))
}

fn credentials() -> ResolvedCredentials {
    support::credentials()
}

fn auth_error() -> WorkflowError {
    WorkflowError::Remote(RemoteError::Authentication {
        status: 401,
        message: "unauthorized".to_owned(),
    })
}

fn other_error() -> WorkflowError {
    WorkflowError::Remote(RemoteError::Api {
        status: 500,
        message: "boom".to_owned(),
    })
}

#[rstest]
#[tokio::test]
async fn auth_failure_retries_once_with_replacement_token() {
    let dir = TempDir::new().expect("temp dir should be creatable");
    let wrapper = retry_wrapper(true, &["fresh-token"], &dir);
    let attempts = AtomicUsize::new(0);
    let seen_tokens: Mutex<Vec<String>> = Mutex::new(Vec::new());

    let result = wrapper
        .run(credentials(), |creds| {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            seen_tokens
                .lock()
                .expect("token log lock should not be poisoned")
                .push(creds.token().to_owned());
            async move {
                if attempt == 0 {
                    Err(auth_error())
                } else {
                    Ok(ExecutionResult::Completed("done"))
                }
            }
        })
        .await
        .expect("retried attempt should succeed");

    assert_eq!(result.completed(), Some(&"done"));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    let tokens = seen_tokens
        .lock()
        .expect("token log lock should not be poisoned");
    assert_eq!(tokens.as_slice(), ["test-token", "fresh-token"]);
}

#[rstest]
#[tokio::test]
async fn second_auth_failure_propagates() {
    let dir = TempDir::new().expect("temp dir should be creatable");
    let wrapper = retry_wrapper(true, &["fresh-token"], &dir);
    let attempts = AtomicUsize::new(0);

    let result: Result<ExecutionResult<()>, WorkflowError> = wrapper
        .run(credentials(), |_creds| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move { Err(auth_error()) }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[rstest]
#[tokio::test]
async fn non_auth_failure_is_not_retried() {
    let dir = TempDir::new().expect("temp dir should be creatable");
    let wrapper = retry_wrapper(true, &["fresh-token"], &dir);
    let attempts = AtomicUsize::new(0);

    let result: Result<ExecutionResult<()>, WorkflowError> = wrapper
        .run(credentials(), |_creds| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move { Err(other_error()) }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn non_interactive_context_never_retries() {
    let dir = TempDir::new().expect("temp dir should be creatable");
    let wrapper = retry_wrapper(false, &[], &dir);
    let attempts = AtomicUsize::new(0);

    let result: Result<ExecutionResult<()>, WorkflowError> = wrapper
        .run(credentials(), |_creds| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move { Err(auth_error()) }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn partial_outcome_is_returned_without_retry() {
    let dir = TempDir::new().expect("temp dir should be creatable");
    let wrapper = retry_wrapper(true, &["fresh-token"], &dir);
    let attempts = AtomicUsize::new(0);

    let outcome: ExecutionResult<&str> = wrapper
        .run(credentials(), |_creds| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok(ExecutionResult::Partial {
                    artifact: PartialArtifact::Branch {
                        branch_name: "feature/77-improve-onboarding".to_owned(),
                    },
                    reason: "state update failed".to_owned(),
                })
            }
        })
        .await
        .expect("partial outcome is a success value");

    assert!(outcome.is_partial());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}
