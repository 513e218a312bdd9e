//! Store root resolution and on-disk layout.
//!
//! ```text
//! <store-root>/
//!   .gpg-id                  recipient identity, plaintext, non-empty
//!   .lock                    encrypted sentinel, git-ignored
//!   .gitignore               contains at least the lock filename
//!   <path/to/name>.gpg       encrypted secret
//!   <path/to/name>.m.gpg     encrypted metadata sidecar
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{Result, StoreError};
use crate::git::GIT_DIR;

/// File holding the recipient identity.
pub const ID_FILE: &str = ".gpg-id";

/// Encrypted lock file.
pub const LOCK_FILE: &str = ".lock";

/// Suffix of an encrypted secret.
pub const SECRET_SUFFIX: &str = ".gpg";

/// Suffix of an encrypted metadata sidecar.
pub const METADATA_SUFFIX: &str = ".m.gpg";

/// Knows where the store lives and how entry names map to files.
#[derive(Debug, Clone)]
pub struct StoreLocator {
    root: PathBuf,
}

impl StoreLocator {
    /// Point at `root` without touching the filesystem.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Point at `root`, creating the directory if it does not exist.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let locator = Self::new(root);
        if !locator.root.exists() {
            fs::create_dir_all(&locator.root)?;
            tracing::info!(root = %locator.root.display(), "created store folder");
        }
        Ok(locator)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the recipient identity from `.gpg-id`.
    pub fn store_id(&self) -> Result<String> {
        let path = self.root.join(ID_FILE);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(content.trim().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::IdentityNotFound(path))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// `true` iff the root exists and `.gpg-id` exists and is non-empty.
    pub fn is_initialized(&self) -> bool {
        self.root.is_dir() && self.store_id().is_ok_and(|id| !id.is_empty())
    }

    /// Write the recipient identity. Fails if the store is already initialized.
    pub fn write_store_id(&self, recipient: &str) -> Result<()> {
        if self.is_initialized() {
            return Err(StoreError::StoreAlreadyInitialized(self.root.clone()));
        }
        fs::create_dir_all(&self.root)?;
        fs::write(self.root.join(ID_FILE), format!("{}\n", recipient.trim()))?;
        Ok(())
    }

    /// `true` if the root exists and contains anything at all.
    pub fn is_occupied(&self) -> Result<bool> {
        if !self.root.exists() {
            return Ok(false);
        }
        Ok(fs::read_dir(&self.root)?.next().is_some())
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    /// Path of the encrypted secret for entry `name`.
    pub fn secret_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}{SECRET_SUFFIX}"))
    }

    /// Path of the metadata sidecar for entry `name`.
    pub fn metadata_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}{METADATA_SUFFIX}"))
    }

    /// Validate that an entry name is a safe relative path inside the store.
    ///
    /// Names are `/`-separated. Rejected: empty names or segments, `.` and
    /// `..` segments, absolute paths, backslashes, a leading `.git` segment,
    /// folder segments ending in `.git` and names ending in `.m` (they would
    /// collide with sidecar files).
    pub fn validate_entry_name(name: &str) -> Result<()> {
        let invalid = || StoreError::InvalidEntryName(name.to_string());

        if name.is_empty() || name.starts_with('/') || name.contains('\\') {
            return Err(invalid());
        }
        if name.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
            return Err(invalid());
        }
        // Folders ending in `.git` are skipped when the tree is listed.
        let folders = name.rsplit_once('/').map_or("", |(parent, _)| parent);
        if name.split('/').next() == Some(GIT_DIR)
            || folders.split('/').any(|seg| seg.ends_with(GIT_DIR))
        {
            return Err(invalid());
        }
        if name.ends_with(".m") {
            return Err(invalid());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_creates_missing_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("nested/store");
        let locator = StoreLocator::open(&root).unwrap();
        assert!(root.is_dir());
        assert!(!locator.is_initialized());
    }

    #[test]
    fn store_id_missing_is_identity_not_found() {
        let dir = TempDir::new().unwrap();
        let locator = StoreLocator::new(dir.path());
        assert!(matches!(
            locator.store_id(),
            Err(StoreError::IdentityNotFound(_))
        ));
    }

    #[test]
    fn empty_id_file_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(ID_FILE), "  \n").unwrap();
        let locator = StoreLocator::new(dir.path());
        assert!(!locator.is_initialized());
    }

    #[test]
    fn write_store_id_then_read_back() {
        let dir = TempDir::new().unwrap();
        let locator = StoreLocator::new(dir.path());
        locator.write_store_id("alice@example.com").unwrap();

        assert!(locator.is_initialized());
        assert_eq!(locator.store_id().unwrap(), "alice@example.com");
        assert!(matches!(
            locator.write_store_id("bob@example.com"),
            Err(StoreError::StoreAlreadyInitialized(_))
        ));
    }

    #[test]
    fn entry_paths_use_suffixes() {
        let locator = StoreLocator::new("/store");
        assert_eq!(
            locator.secret_path("web/github"),
            PathBuf::from("/store/web/github.gpg")
        );
        assert_eq!(
            locator.metadata_path("web/github"),
            PathBuf::from("/store/web/github.m.gpg")
        );
    }

    #[test]
    fn valid_entry_names() {
        assert!(StoreLocator::validate_entry_name("github").is_ok());
        assert!(StoreLocator::validate_entry_name("web/github.com").is_ok());
        assert!(StoreLocator::validate_entry_name("a/b/c").is_ok());
        assert!(StoreLocator::validate_entry_name(".hidden").is_ok());
    }

    #[test]
    fn rejects_unsafe_entry_names() {
        for name in [
            "", "/abs", "a//b", "a/", "../escape", "a/../b", "./a", "a\\b", ".git/config",
            "notes.m", "team/.git/token", "mirror.git/key",
        ] {
            assert!(
                StoreLocator::validate_entry_name(name).is_err(),
                "expected '{name}' to be rejected"
            );
        }
    }

    #[test]
    fn accepts_git_suffix_on_the_entry_itself() {
        assert!(StoreLocator::validate_entry_name("repos/mirror.git").is_ok());
        assert!(StoreLocator::validate_entry_name("gitea/token").is_ok());
    }
}
