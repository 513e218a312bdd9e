//! In-memory doubles for the encryption and version-control gateways.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use zeroize::Zeroizing;

use gpgpass::crypto::EncryptionGateway;
use gpgpass::errors::{Result, StoreError};
use gpgpass::git::VersionControl;
use gpgpass::store::{PasswordStore, StoreLocator};

pub const RECIPIENT: &str = "alice@example.com";
pub const EXPIRED_RECIPIENT: &str = "expired@example.com";

const HEADER: &str = "FAKEGPG:";

/// Reversible "cipher": writes `FAKEGPG:<recipient>\n<plaintext>`.
#[derive(Default)]
pub struct FakeCrypto {
    /// Fail every write to a secret file (not sidecars or the lock),
    /// leaving a truncated file behind.
    pub fail_secret_writes: AtomicBool,
}

impl FakeCrypto {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl EncryptionGateway for FakeCrypto {
    fn encrypt(&self, path: &Path, plaintext: &[u8], recipient: &str) -> Result<()> {
        let name = path.to_string_lossy();
        let is_secret = name.ends_with(".gpg") && !name.ends_with(".m.gpg");
        if is_secret && self.fail_secret_writes.load(Ordering::SeqCst) {
            fs::write(path, b"FAKEGPG:trunc")?;
            return Err(StoreError::EncryptFailed("injected failure".into()));
        }

        let mut out = format!("{HEADER}{recipient}\n").into_bytes();
        out.extend_from_slice(plaintext);
        fs::write(path, out)?;
        Ok(())
    }

    fn decrypt(&self, path: &Path) -> Result<Zeroizing<String>> {
        let content = fs::read_to_string(path)
            .map_err(|e| StoreError::DecryptFailed(e.to_string()))?;
        let (header, body) = content
            .split_once('\n')
            .ok_or_else(|| StoreError::DecryptFailed("no header".into()))?;
        if !header.starts_with(HEADER) {
            return Err(StoreError::DecryptFailed("bad header".into()));
        }
        Ok(Zeroizing::new(body.to_string()))
    }

    fn decrypt_many(&self, paths: &[PathBuf]) -> Result<Vec<Option<Zeroizing<String>>>> {
        Ok(paths.iter().map(|p| self.decrypt(p).ok()).collect())
    }

    fn verify_key_valid(&self, recipient: &str) -> Result<bool> {
        match recipient {
            RECIPIENT => Ok(true),
            EXPIRED_RECIPIENT => Err(StoreError::KeyInvalidOrExpired(recipient.into())),
            _ => Err(StoreError::KeyNotFound(recipient.into())),
        }
    }
}

/// Records every call; commits can be made to fail.
pub struct RecordingVcs {
    root: PathBuf,
    pub commits: Mutex<Vec<String>>,
    pub ignored: Mutex<Vec<String>>,
    pub initialized: AtomicBool,
    pub fail_commit: AtomicBool,
    pub clone_succeeds: AtomicBool,
    pub repository_deleted: AtomicBool,
}

impl RecordingVcs {
    pub fn new(root: &Path) -> Arc<Self> {
        Arc::new(Self {
            root: root.to_path_buf(),
            commits: Mutex::new(Vec::new()),
            ignored: Mutex::new(Vec::new()),
            initialized: AtomicBool::new(false),
            fail_commit: AtomicBool::new(false),
            clone_succeeds: AtomicBool::new(true),
            repository_deleted: AtomicBool::new(false),
        })
    }

    pub fn commits(&self) -> Vec<String> {
        self.commits.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.commits.lock().unwrap().clear();
    }
}

impl VersionControl for RecordingVcs {
    fn init(&self) -> Result<()> {
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn clone_repository(&self, _url: &str) -> Result<bool> {
        if !self.clone_succeeds.load(Ordering::SeqCst) {
            return Ok(false);
        }
        fs::create_dir_all(self.root.join(".git"))?;
        fs::write(self.root.join(".gpg-id"), format!("{RECIPIENT}\n"))?;
        Ok(true)
    }

    fn delete_repository(&self) -> Result<()> {
        self.repository_deleted.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        if self.fail_commit.load(Ordering::SeqCst) {
            return Err(StoreError::VersionControl("injected commit failure".into()));
        }
        self.commits.lock().unwrap().push(message.to_string());
        Ok(())
    }

    fn ignore(&self, path: &str) -> Result<()> {
        self.ignored.lock().unwrap().push(path.to_string());
        Ok(())
    }

    fn pull(&self) -> Result<()> {
        Ok(())
    }

    fn push(&self) -> Result<()> {
        Ok(())
    }

    fn fetch(&self) -> Result<(usize, usize)> {
        Ok((1, 2))
    }
}

/// A scratch store wired to the doubles.
pub struct Harness {
    pub dir: TempDir,
    pub crypto: Arc<FakeCrypto>,
    pub vcs: Arc<RecordingVcs>,
}

impl Harness {
    /// Empty, uninitialized store root.
    pub fn empty() -> Self {
        let dir = TempDir::new().unwrap();
        let vcs = RecordingVcs::new(dir.path());
        Self {
            dir,
            crypto: FakeCrypto::new(),
            vcs,
        }
    }

    /// Store initialized for [`RECIPIENT`], with the init commit cleared.
    pub fn initialized() -> Self {
        let harness = Self::empty();
        harness.store().initialize(RECIPIENT).unwrap();
        harness.vcs.clear();
        harness
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// A fresh engine over the same root and doubles.
    pub fn store(&self) -> PasswordStore {
        let locator = StoreLocator::open(self.dir.path()).unwrap();
        PasswordStore::new(locator, self.crypto.clone(), self.vcs.clone())
    }

    /// Engine with the lock already held.
    pub fn locked_store(&self) -> PasswordStore {
        let mut store = self.store();
        assert!(store.acquire_lock().unwrap());
        store
    }

    /// Write an encrypted file directly, bypassing the engine.
    pub fn plant(&self, relative: &str, plaintext: &str) {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        self.crypto
            .encrypt(&path, plaintext.as_bytes(), RECIPIENT)
            .unwrap();
    }
}
