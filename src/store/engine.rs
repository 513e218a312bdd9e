//! `PasswordStore`: the entry lifecycle API.
//!
//! Composes the locator, lock, metadata manager and the two gateways.
//! Each mutating operation follows the same shape: validate, check the
//! filesystem preconditions, write (sidecar before secret), then commit
//! once. Rollback is best-effort:
//!
//! - `add` deletes the sidecar and any partial secret if the secret write
//!   fails.
//! - `rename` leaves the store partially moved if the second file fails.
//! - A failed commit never reverts the filesystem change; the error is
//!   returned so the caller can report it.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::entry::{Password, StoreEntry};
use super::locator::{StoreLocator, LOCK_FILE};
use super::lock::LockManager;
use super::metadata::{timestamp_now, MetadataCollection, MetadataManager};
use super::search;
use super::tree::{build_tree, DirectoryListing, OsDirectory};
use crate::config::Settings;
use crate::crypto::{EncryptionGateway, GpgCli};
use crate::errors::{Result, StoreError};
use crate::generator::{generate_password, resolve_inputs};
use crate::git::{GitCli, Unversioned, VersionControl};

/// Fallbacks for `generate` when the caller passes zero / blank.
#[derive(Debug, Clone)]
pub struct GeneratorDefaults {
    pub length: usize,
    pub alphabet: String,
}

impl Default for GeneratorDefaults {
    fn default() -> Self {
        let settings = Settings::default();
        Self::from(&settings)
    }
}

impl From<&Settings> for GeneratorDefaults {
    fn from(settings: &Settings) -> Self {
        Self {
            length: settings.password_length,
            alphabet: settings.password_alphabet.clone(),
        }
    }
}

/// The store engine. Create one per store root.
pub struct PasswordStore {
    locator: StoreLocator,
    crypto: Arc<dyn EncryptionGateway>,
    vcs: Arc<dyn VersionControl>,
    listing: Arc<dyn DirectoryListing>,
    lock: LockManager,
    metadata: MetadataManager,
    defaults: GeneratorDefaults,
}

impl PasswordStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Build an engine from explicit collaborators.
    pub fn new(
        locator: StoreLocator,
        crypto: Arc<dyn EncryptionGateway>,
        vcs: Arc<dyn VersionControl>,
    ) -> Self {
        let lock = LockManager::new(locator.clone(), Arc::clone(&crypto), Arc::clone(&vcs));
        let metadata = MetadataManager::new(locator.clone(), Arc::clone(&crypto));
        Self {
            locator,
            crypto,
            vcs,
            listing: Arc::new(OsDirectory),
            lock,
            metadata,
            defaults: GeneratorDefaults::default(),
        }
    }

    /// Build an engine wired to `gpg` and `git` as configured.
    ///
    /// `root_override` takes precedence over every configured store root.
    pub fn from_settings(settings: &Settings, root_override: Option<&Path>) -> Result<Self> {
        let root = settings.store_root(root_override)?;
        let locator = StoreLocator::open(&root)?;

        let crypto: Arc<dyn EncryptionGateway> = Arc::new(GpgCli::new(&settings.gpg_program));
        let vcs: Arc<dyn VersionControl> = if settings.git {
            Arc::new(GitCli::new(&settings.git_program, &root))
        } else {
            Arc::new(Unversioned::new(&root))
        };

        Ok(Self::new(locator, crypto, vcs).with_generator_defaults(GeneratorDefaults::from(settings)))
    }

    /// Replace the directory listing used by `tree` and `search`.
    pub fn with_listing(mut self, listing: Arc<dyn DirectoryListing>) -> Self {
        self.listing = listing;
        self
    }

    pub fn with_generator_defaults(mut self, defaults: GeneratorDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    // ------------------------------------------------------------------
    // Store setup
    // ------------------------------------------------------------------

    pub fn locator(&self) -> &StoreLocator {
        &self.locator
    }

    pub fn is_initialized(&self) -> bool {
        self.locator.is_initialized()
    }

    /// Initialize the store for `recipient`.
    pub fn initialize(&self, recipient: &str) -> Result<()> {
        let recipient = recipient.trim();
        if self.locator.is_initialized() {
            return Err(StoreError::StoreAlreadyInitialized(
                self.locator.root().to_path_buf(),
            ));
        }
        if recipient.is_empty() {
            return Err(StoreError::KeyNotFound(String::new()));
        }

        self.crypto.verify_key_valid(recipient)?;
        self.locator.write_store_id(recipient)?;
        self.vcs.init()?;
        self.vcs.ignore(LOCK_FILE)?;

        tracing::info!(root = %self.locator.root().display(), "store initialized");
        self.commit(&format!("Initialize store for {recipient}"))
    }

    /// Clone a remote store into the (empty) store root.
    pub fn clone_remote(&self, url: &str) -> Result<()> {
        if self.locator.is_occupied()? {
            return Err(StoreError::StoreFolderAlreadyExists(
                self.locator.root().to_path_buf(),
            ));
        }

        match self.vcs.clone_repository(url) {
            Ok(true) => {
                tracing::info!(url, "cloned remote store");
                Ok(())
            }
            Ok(false) => Err(StoreError::RemoteCloneFailed(url.to_string())),
            Err(e) => {
                tracing::warn!(url, error = %e, "clone failed");
                Err(StoreError::RemoteCloneFailed(url.to_string()))
            }
        }
    }

    /// Drop version-control history, keeping every entry.
    pub fn delete_repository(&self) -> Result<()> {
        self.vcs.delete_repository()
    }

    pub fn pull(&self) -> Result<()> {
        self.vcs.pull()
    }

    pub fn push(&self) -> Result<()> {
        self.vcs.push()
    }

    /// Fetch and report `(ahead_by, behind_by)`. Advisory only.
    pub fn fetch(&self) -> Result<(usize, usize)> {
        self.vcs.fetch()
    }

    // ------------------------------------------------------------------
    // Lock
    // ------------------------------------------------------------------

    pub fn acquire_lock(&mut self) -> Result<bool> {
        self.lock.acquire()
    }

    pub fn release_lock(&mut self) {
        self.lock.release();
    }

    pub fn lock(&self) -> &LockManager {
        &self.lock
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// `true` if the secret file for `name` exists.
    pub fn exists(&self, name: &str) -> bool {
        self.locator.secret_path(name).exists()
    }

    /// Decrypt an entry together with its metadata.
    pub fn show(&self, name: &str) -> Result<Password> {
        StoreLocator::validate_entry_name(name)?;
        let secret_path = self.locator.secret_path(name);
        if !secret_path.exists() {
            return Err(StoreError::EntryNotFound(name.to_string()));
        }

        let value = self.crypto.decrypt(&secret_path)?;
        if value.is_empty() {
            return Err(StoreError::EmptySecretAfterDecrypt(name.to_string()));
        }

        let metadata = self.metadata.retrieve(name)?;
        Ok(Password::new(value, metadata))
    }

    /// Metadata of an entry (fresh stamps if it has no sidecar yet).
    pub fn metadata(&self, name: &str) -> Result<MetadataCollection> {
        StoreLocator::validate_entry_name(name)?;
        if !self.exists(name) && !self.metadata.exists(name) {
            return Err(StoreError::EntryNotFound(name.to_string()));
        }
        self.metadata.retrieve(name)
    }

    /// Enumerate the whole store.
    pub fn tree(&self) -> Result<Vec<StoreEntry>> {
        build_tree(self.listing.as_ref(), self.locator.root())
    }

    /// Entries whose path or metadata contains `query`.
    pub fn search(&self, query: &str) -> Result<Vec<StoreEntry>> {
        search::search(
            self.listing.as_ref(),
            self.crypto.as_ref(),
            self.locator.root(),
            query,
        )
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Create a new entry.
    pub fn add(&self, name: &str, password: &Password) -> Result<()> {
        StoreLocator::validate_entry_name(name)?;
        let secret_path = self.locator.secret_path(name);
        if secret_path.exists() {
            return Err(StoreError::EntryAlreadyExists(name.to_string()));
        }
        let recipient = self.recipient()?;

        if let Some(parent) = secret_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let stamp = timestamp_now();
        if let Err(e) = self
            .metadata
            .write(name, &MetadataCollection::fresh(&stamp))
        {
            self.roll_back_add(name);
            return Err(e);
        }

        if let Err(e) = self
            .crypto
            .encrypt(&secret_path, password.value().as_bytes(), &recipient)
        {
            tracing::warn!(entry = name, error = %e, "secret write failed, rolling back add");
            self.roll_back_add(name);
            return Err(e);
        }

        tracing::info!(entry = name, "entry added");
        self.commit(&format!("Add password for {name}"))
    }

    /// Replace the secret of an existing entry.
    pub fn edit_password(&self, name: &str, password: &Password) -> Result<()> {
        StoreLocator::validate_entry_name(name)?;
        let secret_path = self.locator.secret_path(name);
        if !secret_path.exists() {
            return Err(StoreError::EntryNotFound(name.to_string()));
        }
        let recipient = self.recipient()?;

        self.metadata.touch(name, None)?;
        self.crypto
            .encrypt(&secret_path, password.value().as_bytes(), &recipient)?;

        tracing::info!(entry = name, "password edited");
        self.commit(&format!("Edit password for {name}"))
    }

    /// Replace the user metadata of an existing entry.
    ///
    /// `Normal` records are taken from `edited`; `created` is preserved
    /// and `modified` refreshed. Returns what was written.
    pub fn edit_metadata(
        &self,
        name: &str,
        edited: &MetadataCollection,
    ) -> Result<MetadataCollection> {
        StoreLocator::validate_entry_name(name)?;
        if !self.metadata.exists(name) {
            return Err(StoreError::EntryNotFound(name.to_string()));
        }

        let mut collection = self.metadata.retrieve(name)?;
        collection.replace_normal(edited);
        let written = self.metadata.touch(name, Some(collection))?;

        tracing::info!(entry = name, "metadata edited");
        self.commit(&format!("Edit metadata for {name}"))?;
        Ok(written)
    }

    /// Move `name` to `new_name`, or copy it when `duplicate` is set.
    ///
    /// The secret moves first, then the sidecar. If the sidecar step fails
    /// the store is left half-moved and the error is returned. A stale
    /// sidecar already sitting at the destination is removed when the source
    /// has none, so the new entry never inherits foreign metadata.
    pub fn rename(&self, name: &str, new_name: &str, duplicate: bool) -> Result<()> {
        StoreLocator::validate_entry_name(name)?;
        StoreLocator::validate_entry_name(new_name)?;

        let from_secret = self.locator.secret_path(name);
        let to_secret = self.locator.secret_path(new_name);
        if !from_secret.exists() {
            return Err(StoreError::EntryNotFound(name.to_string()));
        }
        if to_secret.exists() {
            return Err(StoreError::EntryAlreadyExists(new_name.to_string()));
        }
        if !duplicate {
            self.lock.ensure_verified()?;
        }

        if let Some(parent) = to_secret.parent() {
            fs::create_dir_all(parent)?;
        }

        transfer(&from_secret, &to_secret, duplicate)?;

        let from_meta = self.locator.metadata_path(name);
        let to_meta = self.locator.metadata_path(new_name);
        if from_meta.exists() {
            if let Err(e) = transfer(&from_meta, &to_meta, duplicate) {
                tracing::warn!(
                    from = name,
                    to = new_name,
                    error = %e,
                    "secret transferred but sidecar did not, store left partially applied"
                );
                return Err(e);
            }
        } else if to_meta.exists() {
            // A sidecar with no secret beside it belongs to no entry.
            tracing::debug!(name = new_name, "removing stale sidecar at destination");
            fs::remove_file(&to_meta)?;
        }

        if !duplicate {
            self.prune_empty_parents(&from_secret);
        }

        if duplicate {
            tracing::info!(from = name, to = new_name, "entry duplicated");
            self.commit(&format!("Duplicate {name} as {new_name}"))
        } else {
            tracing::info!(from = name, to = new_name, "entry renamed");
            self.commit(&format!("Rename {name} to {new_name}"))
        }
    }

    /// Delete an entry. Requires a verified lock.
    pub fn remove(&self, name: &str) -> Result<()> {
        StoreLocator::validate_entry_name(name)?;
        let secret_path = self.locator.secret_path(name);
        if !secret_path.exists() {
            return Err(StoreError::EntryNotFound(name.to_string()));
        }
        self.lock.ensure_verified()?;

        fs::remove_file(&secret_path)?;
        let meta_path = self.locator.metadata_path(name);
        if meta_path.exists() {
            fs::remove_file(&meta_path)?;
        }
        self.prune_empty_parents(&secret_path);

        tracing::info!(entry = name, "entry removed");
        self.commit(&format!("Remove {name}"))
    }

    /// Generate a password and store it under `name`, creating the entry
    /// or replacing its secret. Zero `length` / blank `alphabet` fall back
    /// to the configured defaults.
    pub fn generate(&self, name: &str, length: usize, alphabet: &str) -> Result<Password> {
        StoreLocator::validate_entry_name(name)?;
        let (length, alphabet) =
            resolve_inputs(length, alphabet, self.defaults.length, &self.defaults.alphabet);
        let value = generate_password(length, alphabet)?;
        let mut password = Password::new(value, MetadataCollection::new());

        if self.exists(name) {
            self.edit_password(name, &password)?;
        } else {
            self.add(name, &password)?;
        }

        *password.metadata_mut() = self.metadata.retrieve(name)?;
        Ok(password)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Recipient identity, required non-empty.
    fn recipient(&self) -> Result<String> {
        let id = self.locator.store_id()?;
        if id.is_empty() {
            return Err(StoreError::StoreNotInitialized(
                self.locator.root().to_path_buf(),
            ));
        }
        Ok(id)
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.vcs.commit(message).map_err(|e| {
            tracing::warn!(message, error = %e, "change applied but not committed");
            e
        })
    }

    /// Remove whatever `add` managed to write for `name`.
    fn roll_back_add(&self, name: &str) {
        let secret_path = self.locator.secret_path(name);
        for path in [self.locator.metadata_path(name), secret_path.clone()] {
            if path.exists() {
                if let Err(e) = fs::remove_file(&path) {
                    tracing::warn!(path = %path.display(), error = %e, "rollback could not delete file");
                }
            }
        }
        self.prune_empty_parents(&secret_path);
    }

    /// Delete directories above `path` that are now empty, stopping at the root.
    fn prune_empty_parents(&self, path: &Path) {
        let root = self.locator.root();
        let mut dir = path.parent();
        while let Some(current) = dir {
            if current == root || !current.starts_with(root) {
                break;
            }
            if fs::remove_dir(current).is_err() {
                break;
            }
            dir = current.parent();
        }
    }
}

/// Move or copy one file.
fn transfer(from: &Path, to: &Path, duplicate: bool) -> Result<()> {
    if duplicate {
        fs::copy(from, to)?;
    } else {
        fs::rename(from, to)?;
    }
    Ok(())
}
