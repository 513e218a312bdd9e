//! Single-writer store lock.
//!
//! The lock is an encrypted file (`.lock`) whose plaintext is a fixed
//! sentinel. Holding the lock means holding an open handle on that file
//! with an exclusive OS-level lock (`flock` / `LockFileEx` via `fs2`).
//! A second process, or a second manager in this process, cannot take it
//! while the handle is open.
//!
//! Before any destructive operation the engine calls [`LockManager::verify`],
//! which re-decrypts the file and compares it with the sentinel. A swapped
//! or corrupted lock file fails closed.

use std::fs::{File, OpenOptions};
use std::sync::Arc;

use fs2::FileExt;
use subtle::ConstantTimeEq;

use super::locator::{StoreLocator, LOCK_FILE};
use crate::crypto::EncryptionGateway;
use crate::errors::{Result, StoreError};
use crate::git::VersionControl;

/// Plaintext content of the lock file.
pub const LOCK_SENTINEL: &str = "gpgpass store lock v1";

pub struct LockManager {
    locator: StoreLocator,
    crypto: Arc<dyn EncryptionGateway>,
    vcs: Arc<dyn VersionControl>,
    /// Open, exclusively locked handle on the lock file.
    handle: Option<File>,
}

impl LockManager {
    pub fn new(
        locator: StoreLocator,
        crypto: Arc<dyn EncryptionGateway>,
        vcs: Arc<dyn VersionControl>,
    ) -> Self {
        Self {
            locator,
            crypto,
            vcs,
            handle: None,
        }
    }

    /// Take the store lock.
    ///
    /// Returns `Ok(false)` without doing anything if this manager already
    /// holds it. Creates and git-ignores the lock file on first use.
    /// Fails with `StoreLocked` if another handle holds the OS lock.
    pub fn acquire(&mut self) -> Result<bool> {
        if self.handle.is_some() {
            return Ok(false);
        }

        let path = self.locator.lock_path();
        if !path.exists() {
            let recipient = self.locator.store_id()?;
            self.crypto
                .encrypt(&path, LOCK_SENTINEL.as_bytes(), &recipient)?;
            self.vcs.ignore(LOCK_FILE)?;
            tracing::debug!(path = %path.display(), "created lock file");
        }

        let file = OpenOptions::new().read(true).open(&path)?;
        if let Err(e) = file.try_lock_exclusive() {
            if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                tracing::warn!(path = %path.display(), "store lock is held elsewhere");
                return Err(StoreError::StoreLocked(path));
            }
            return Err(e.into());
        }

        self.handle = Some(file);
        tracing::debug!(path = %path.display(), "store lock acquired");
        Ok(true)
    }

    /// Drop the lock. Idempotent.
    pub fn release(&mut self) {
        if let Some(file) = self.handle.take() {
            let _ = file.unlock();
            tracing::debug!("store lock released");
        }
    }

    pub fn is_held(&self) -> bool {
        self.handle.is_some()
    }

    /// Check that the lock is held and the lock file still decrypts to the
    /// sentinel. Fails closed.
    pub fn verify(&self) -> bool {
        if self.handle.is_none() {
            return false;
        }

        let path = self.locator.lock_path();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "lock file disappeared while held");
            return false;
        }

        match self.crypto.decrypt(&path) {
            Ok(plaintext) => {
                let ok: bool = plaintext.as_bytes().ct_eq(LOCK_SENTINEL.as_bytes()).into();
                if !ok {
                    tracing::warn!(path = %path.display(), "lock file does not hold the sentinel");
                }
                ok
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "lock file failed to decrypt");
                false
            }
        }
    }

    /// `verify`, turned into an error for callers that must abort.
    pub fn ensure_verified(&self) -> Result<()> {
        if self.verify() {
            Ok(())
        } else {
            Err(StoreError::LockVerificationFailed)
        }
    }
}

impl Drop for LockManager {
    fn drop(&mut self) {
        self.release();
    }
}
