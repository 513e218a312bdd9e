//! Version-control gateway.
//!
//! Every successful store mutation is committed as one unit of history
//! through the [`VersionControl`] trait. Two implementations ship:
//! - `GitCli` drives the `git` binary (`cli`)
//! - `Unversioned` for stores that are not git repositories
//!
//! `.gitignore` patching lives in `ignore`.

pub mod cli;
pub mod ignore;

use crate::errors::Result;

pub use cli::GitCli;
pub use ignore::patch_gitignore;

/// Name of the version-control internal directory.
pub const GIT_DIR: &str = ".git";

/// Commit, clone and synchronize the store.
pub trait VersionControl: Send + Sync {
    /// Create an empty repository in the store root.
    fn init(&self) -> Result<()>;

    /// Clone `url` into the store root. Returns `false` when the remote
    /// could not be cloned.
    fn clone_repository(&self, url: &str) -> Result<bool>;

    /// Remove version-control internals, leaving the working tree intact.
    fn delete_repository(&self) -> Result<()>;

    /// Record every pending change under `message`.
    fn commit(&self, message: &str) -> Result<()>;

    /// Add `path` (relative to the store root) to the ignore list.
    fn ignore(&self, path: &str) -> Result<()>;

    fn pull(&self) -> Result<()>;

    fn push(&self) -> Result<()>;

    /// Fetch the remote and report `(ahead_by, behind_by)`.
    fn fetch(&self) -> Result<(usize, usize)>;
}

/// Version control for a store that is not a repository.
///
/// Commits are dropped; the ignore list is still maintained so the layout
/// stays the same if the store is turned into a repository later.
#[derive(Debug, Clone)]
pub struct Unversioned {
    root: std::path::PathBuf,
}

impl Unversioned {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl VersionControl for Unversioned {
    fn init(&self) -> Result<()> {
        Ok(())
    }

    fn clone_repository(&self, _url: &str) -> Result<bool> {
        Ok(false)
    }

    fn delete_repository(&self) -> Result<()> {
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        tracing::debug!(message, "store is unversioned, skipping commit");
        Ok(())
    }

    fn ignore(&self, path: &str) -> Result<()> {
        patch_gitignore(&self.root, path)?;
        Ok(())
    }

    fn pull(&self) -> Result<()> {
        Ok(())
    }

    fn push(&self) -> Result<()> {
        Ok(())
    }

    fn fetch(&self) -> Result<(usize, usize)> {
        Ok((0, 0))
    }
}
