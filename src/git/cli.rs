//! `git` process implementation of [`VersionControl`].

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{patch_gitignore, VersionControl, GIT_DIR};
use crate::errors::{Result, StoreError};

/// Runs the `git` binary against the store root.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    root: PathBuf,
}

impl GitCli {
    pub fn new(program: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            root: root.into(),
        }
    }

    /// Returns `true` if `root` holds a git repository.
    pub fn is_repository(root: &Path) -> bool {
        root.join(GIT_DIR).exists()
    }

    /// Run `git <args>` in the store root and return its stdout.
    fn run(&self, args: &[&str]) -> Result<String> {
        tracing::debug!(subcommand = args.first().copied().unwrap_or(""), "running git");

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| StoreError::VersionControl(format!("failed to run git: {e}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            if stderr.trim().is_empty() {
                return Err(StoreError::VersionControl(format!(
                    "git {} failed: {}",
                    args.join(" "),
                    stdout.trim()
                )));
            }
            return Err(StoreError::VersionControl(stderr.trim().to_string()));
        }

        Ok(stdout.into_owned())
    }
}

impl VersionControl for GitCli {
    fn init(&self) -> Result<()> {
        if Self::is_repository(&self.root) {
            return Ok(());
        }
        self.run(&["init", "--quiet"])?;
        Ok(())
    }

    fn clone_repository(&self, url: &str) -> Result<bool> {
        let target = self.root.to_string_lossy().into_owned();
        let parent = self
            .root
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        fs::create_dir_all(&parent)?;

        let status = Command::new(&self.program)
            .args(["clone", "--quiet", url, &target])
            .current_dir(&parent)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| StoreError::VersionControl(format!("failed to run git: {e}")))?;

        Ok(status.success())
    }

    fn delete_repository(&self) -> Result<()> {
        let git_dir = self.root.join(GIT_DIR);
        if git_dir.exists() {
            fs::remove_dir_all(&git_dir)?;
            tracing::info!(root = %self.root.display(), "removed git repository from store");
        }
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        if !Self::is_repository(&self.root) {
            tracing::debug!(message, "store is not a git repository, skipping commit");
            return Ok(());
        }

        self.run(&["add", "--all"])?;

        if self.run(&["status", "--porcelain"])?.trim().is_empty() {
            tracing::debug!(message, "nothing to commit");
            return Ok(());
        }

        self.run(&["commit", "--quiet", "--message", message])?;
        Ok(())
    }

    fn ignore(&self, path: &str) -> Result<()> {
        patch_gitignore(&self.root, path)?;
        Ok(())
    }

    fn pull(&self) -> Result<()> {
        self.run(&["pull", "--quiet", "--rebase"])?;
        Ok(())
    }

    fn push(&self) -> Result<()> {
        self.run(&["push", "--quiet"])?;
        Ok(())
    }

    fn fetch(&self) -> Result<(usize, usize)> {
        self.run(&["fetch", "--quiet"])?;
        let counts = self.run(&["rev-list", "--left-right", "--count", "HEAD...@{upstream}"])?;
        parse_ahead_behind(&counts)
    }
}

/// Parse `git rev-list --left-right --count` output (`"<ahead>\t<behind>"`).
fn parse_ahead_behind(output: &str) -> Result<(usize, usize)> {
    let mut parts = output.split_whitespace().map(str::parse::<usize>);
    match (parts.next(), parts.next()) {
        (Some(Ok(ahead)), Some(Ok(behind))) => Ok((ahead, behind)),
        _ => Err(StoreError::VersionControl(format!(
            "unexpected rev-list output: '{}'",
            output.trim()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_ahead_behind_counts() {
        assert_eq!(parse_ahead_behind("3\t1\n").unwrap(), (3, 1));
        assert_eq!(parse_ahead_behind("0 0").unwrap(), (0, 0));
    }

    #[test]
    fn rejects_garbage_counts() {
        assert!(parse_ahead_behind("").is_err());
        assert!(parse_ahead_behind("fatal: no upstream").is_err());
    }

    #[test]
    fn detects_repository_by_git_dir() {
        let dir = TempDir::new().unwrap();
        assert!(!GitCli::is_repository(dir.path()));

        fs::create_dir(dir.path().join(GIT_DIR)).unwrap();
        assert!(GitCli::is_repository(dir.path()));
    }

    #[test]
    fn commit_outside_a_repository_is_skipped() {
        let dir = TempDir::new().unwrap();
        let git = GitCli::new("git-binary-that-does-not-exist", dir.path());
        git.commit("Add password for x").unwrap();
    }

    #[test]
    fn missing_git_binary_is_a_version_control_error() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(GIT_DIR)).unwrap();
        let git = GitCli::new("git-binary-that-does-not-exist", dir.path());
        assert!(matches!(
            git.commit("Add password for x"),
            Err(StoreError::VersionControl(_))
        ));
    }

    #[test]
    fn delete_repository_keeps_working_tree() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".git/objects")).unwrap();
        fs::write(dir.path().join("mail.gpg"), b"ciphertext").unwrap();

        let git = GitCli::new("git", dir.path());
        git.delete_repository().unwrap();

        assert!(!dir.path().join(GIT_DIR).exists());
        assert!(dir.path().join("mail.gpg").exists());
    }
}
