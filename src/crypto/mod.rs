//! Encryption gateway.
//!
//! All at-rest confidentiality is delegated to an external program that
//! knows the recipient's key. The store engine only talks to the
//! [`EncryptionGateway`] trait so tests can substitute an in-memory double.
//!
//! - `EncryptionGateway` trait (this module)
//! - `GpgCli`, the `gpg` process implementation (`gpg`)

pub mod gpg;

use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::errors::Result;

pub use gpg::GpgCli;

/// Encrypt/decrypt single blobs and batches of files.
pub trait EncryptionGateway: Send + Sync {
    /// Encrypt `plaintext` for `recipient` and write the result to `path`.
    fn encrypt(&self, path: &Path, plaintext: &[u8], recipient: &str) -> Result<()>;

    /// Decrypt the file at `path`.
    fn decrypt(&self, path: &Path) -> Result<Zeroizing<String>>;

    /// Decrypt many files at once.
    ///
    /// The result is positionally aligned with `paths`. A path that fails to
    /// decrypt yields `None` instead of failing the whole batch.
    fn decrypt_many(&self, paths: &[PathBuf]) -> Result<Vec<Option<Zeroizing<String>>>>;

    /// Check that `recipient` names a usable key.
    ///
    /// Returns `KeyNotFound` when no key matches and `KeyInvalidOrExpired`
    /// when the key exists but cannot be used.
    fn verify_key_valid(&self, recipient: &str) -> Result<bool>;
}
