//! `gpg` process implementation of [`EncryptionGateway`].
//!
//! Every call spawns `gpg --batch`. Plaintext only ever travels through
//! pipes: it is written to the child's stdin on encrypt and read from its
//! stdout on decrypt, never to a temporary file.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use zeroize::{Zeroize, Zeroizing};

use super::EncryptionGateway;
use crate::errors::{Result, StoreError};

/// Maximum number of concurrent `gpg` children during `decrypt_many`.
const DECRYPT_PARALLELISM: usize = 8;

/// Runs the `gpg` binary.
#[derive(Debug, Clone)]
pub struct GpgCli {
    program: String,
}

impl GpgCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["--batch", "--quiet", "--yes"]);
        cmd
    }
}

impl Default for GpgCli {
    fn default() -> Self {
        Self::new("gpg")
    }
}

impl EncryptionGateway for GpgCli {
    fn encrypt(&self, path: &Path, plaintext: &[u8], recipient: &str) -> Result<()> {
        tracing::debug!(path = %path.display(), "gpg encrypt");

        let mut child = self
            .command()
            .args(["--trust-model", "always", "--recipient", recipient, "--output"])
            .arg(path)
            .arg("--encrypt")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| StoreError::EncryptFailed(format!("failed to launch gpg: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(plaintext)
                .map_err(|e| StoreError::EncryptFailed(format!("failed to write to gpg: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| StoreError::EncryptFailed(format!("gpg did not finish: {e}")))?;

        if !output.status.success() {
            return Err(StoreError::EncryptFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }

    fn decrypt(&self, path: &Path) -> Result<Zeroizing<String>> {
        tracing::debug!(path = %path.display(), "gpg decrypt");

        let output = self
            .command()
            .arg("--decrypt")
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| StoreError::DecryptFailed(format!("failed to launch gpg: {e}")))?;

        if !output.status.success() {
            let mut stdout = output.stdout;
            stdout.zeroize();
            return Err(StoreError::DecryptFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        String::from_utf8(output.stdout)
            .map(Zeroizing::new)
            .map_err(|e| {
                let mut bad_bytes = e.into_bytes();
                bad_bytes.zeroize();
                StoreError::DecryptFailed("plaintext is not valid UTF-8".to_string())
            })
    }

    fn decrypt_many(&self, paths: &[PathBuf]) -> Result<Vec<Option<Zeroizing<String>>>> {
        let mut results = Vec::with_capacity(paths.len());

        for chunk in paths.chunks(DECRYPT_PARALLELISM) {
            let decrypted: Vec<Option<Zeroizing<String>>> = std::thread::scope(|scope| {
                let handles: Vec<_> = chunk
                    .iter()
                    .map(|path| scope.spawn(move || self.decrypt(path)))
                    .collect();

                handles
                    .into_iter()
                    .zip(chunk)
                    .map(|(handle, path)| match handle.join() {
                        Ok(Ok(plaintext)) => Some(plaintext),
                        Ok(Err(e)) => {
                            tracing::debug!(path = %path.display(), error = %e, "batch decrypt skipped file");
                            None
                        }
                        Err(_) => None,
                    })
                    .collect()
            });
            results.extend(decrypted);
        }

        Ok(results)
    }

    fn verify_key_valid(&self, recipient: &str) -> Result<bool> {
        let output = self
            .command()
            .args(["--with-colons", "--list-keys", recipient])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| StoreError::CommandFailed(format!("failed to launch gpg: {e}")))?;

        if !output.status.success() {
            return Err(StoreError::KeyNotFound(recipient.to_string()));
        }

        let listing = String::from_utf8_lossy(&output.stdout);
        let now = chrono::Utc::now().timestamp();
        match key_status(&listing, now) {
            KeyStatus::Usable => Ok(true),
            KeyStatus::Missing => Err(StoreError::KeyNotFound(recipient.to_string())),
            KeyStatus::Unusable => Err(StoreError::KeyInvalidOrExpired(recipient.to_string())),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum KeyStatus {
    Usable,
    Unusable,
    Missing,
}

/// Inspect `--with-colons` output.
///
/// Field 2 is the validity letter (`e` expired, `r` revoked, `i` invalid,
/// `d` disabled) and field 7 the expiry as a Unix timestamp, empty when the
/// key never expires. One usable primary key is enough.
fn key_status(listing: &str, now: i64) -> KeyStatus {
    let mut saw_key = false;

    for line in listing.lines().filter(|l| l.starts_with("pub:")) {
        saw_key = true;
        let fields: Vec<&str> = line.split(':').collect();

        let validity = fields.get(1).copied().unwrap_or("");
        if matches!(validity, "e" | "r" | "i" | "d" | "n") {
            continue;
        }

        let expired = fields
            .get(6)
            .and_then(|f| f.parse::<i64>().ok())
            .is_some_and(|expires| expires <= now);
        if !expired {
            return KeyStatus::Usable;
        }
    }

    if saw_key {
        KeyStatus::Unusable
    } else {
        KeyStatus::Missing
    }
}
