//! Subprocess adapter invoking the `git` binary.

use async_trait::async_trait;
use camino::Utf8Path;
use tokio::process::Command;
use tracing::debug;

use crate::repo::ports::{LocalGit, LocalGitError, LocalGitResult};

/// [`LocalGit`] implementation shelling out to `git`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitProcess;

/// Outcome of one git invocation.
struct GitOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

impl GitProcess {
    /// Runs `git` with `args` in `cwd` and captures its output.
    async fn run(cwd: &Utf8Path, args: &[&str]) -> LocalGitResult<GitOutput> {
        let rendered = render_command(args);
        debug!(command = %rendered, cwd = %cwd, "running git");

        let output = Command::new("git")
            .args(args)
            .current_dir(cwd)
            .output()
            .await
            .map_err(|err| LocalGitError::CommandFailed {
                command: rendered.clone(),
                detail: err.to_string(),
            })?;

        Ok(GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        })
    }

    /// Runs git and fails on a non-zero exit status.
    async fn run_checked(cwd: &Utf8Path, args: &[&str]) -> LocalGitResult<String> {
        let output = Self::run(cwd, args).await?;
        if !output.success {
            return Err(LocalGitError::CommandFailed {
                command: render_command(args),
                detail: output.stderr,
            });
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl LocalGit for GitProcess {
    async fn is_work_tree(&self, path: &Utf8Path) -> LocalGitResult<bool> {
        let output = Self::run(path, &["rev-parse", "--is-inside-work-tree"]).await?;
        Ok(output.success && output.stdout.eq_ignore_ascii_case("true"))
    }

    async fn origin_remote_url(&self, path: &Utf8Path) -> LocalGitResult<String> {
        Self::run_checked(path, &["remote", "get-url", "origin"]).await
    }

    async fn current_branch(&self, path: &Utf8Path) -> LocalGitResult<String> {
        Self::run_checked(path, &["rev-parse", "--abbrev-ref", "HEAD"]).await
    }

    async fn has_tracking_branch(&self, path: &Utf8Path, branch: &str) -> LocalGitResult<bool> {
        let upstream = format!("{branch}@{{upstream}}");
        let output = Self::run(path, &["rev-parse", "--abbrev-ref", &upstream]).await?;
        Ok(output.success)
    }

    async fn ahead_count(&self, path: &Utf8Path, branch: &str) -> LocalGitResult<u64> {
        let range = format!("{branch}@{{upstream}}..{branch}");
        let args = ["rev-list", "--count", range.as_str()];
        let stdout = Self::run_checked(path, &args).await?;
        stdout
            .parse::<u64>()
            .map_err(|_| LocalGitError::UnexpectedOutput {
                command: render_command(&args),
                detail: format!("expected a commit count, got '{stdout}'"),
            })
    }

    async fn push_to_origin(&self, path: &Utf8Path, branch: &str) -> LocalGitResult<()> {
        Self::run_checked(path, &["push", "--set-upstream", "origin", branch]).await?;
        Ok(())
    }
}

/// Renders a git argument list for error messages.
fn render_command(args: &[&str]) -> String {
    let mut rendered = String::from("git");
    for arg in args {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    rendered
}
