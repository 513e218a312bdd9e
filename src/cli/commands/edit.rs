//! `gpgpass edit`: open an entry's secret in an editor.
//!
//! Decrypts the secret to a private temporary file, launches
//! `$VISUAL` / `$EDITOR` / `vi`, and re-encrypts it if it changed.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use zeroize::{Zeroize, Zeroizing};

use crate::cli::output;
use crate::cli::{open_locked_store, Cli};
use crate::errors::{Result, StoreError};
use crate::store::{MetadataCollection, Password};

/// Execute the `edit` command.
pub fn execute(cli: &Cli, name: &str) -> Result<()> {
    let store = open_locked_store(cli)?;
    let mut current = store.show(name)?;

    let tmp_path = write_temp_file(name, current.value())?;
    let editor = find_editor();

    let status = Command::new(&editor).arg(&tmp_path).status().map_err(|e| {
        secure_delete(&tmp_path);
        StoreError::CommandFailed(format!("failed to launch '{editor}': {e}"))
    })?;

    if !status.success() {
        secure_delete(&tmp_path);
        current.clear();
        return Err(StoreError::CommandFailed(format!(
            "editor exited with code {}",
            status.code().unwrap_or(-1)
        )));
    }

    let edited = fs::read_to_string(&tmp_path).map(Zeroizing::new);
    secure_delete(&tmp_path);
    let edited = edited
        .map_err(|e| StoreError::CommandFailed(format!("failed to read edited file: {e}")))?;

    if edited.as_str() == current.value() {
        current.clear();
        output::info("No changes detected.");
        return Ok(());
    }
    current.clear();

    if edited.trim().is_empty() {
        return Err(StoreError::CommandFailed(
            "refusing to store an empty secret".into(),
        ));
    }

    store.edit_password(name, &Password::new(edited, MetadataCollection::new()))?;
    output::success(&format!("Updated {name}"));
    Ok(())
}

/// Write the secret to a fresh file only the current user can read.
fn write_temp_file(name: &str, secret: &str) -> Result<PathBuf> {
    let tmp_dir = std::env::temp_dir();
    let filename = format!(
        "gpgpass-{}-{}-{}.txt",
        sanitize(name),
        std::process::id(),
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0)
    );
    let tmp_path = tmp_dir.join(filename);

    // create_new + 0600 in one step, no window where others can read it.
    #[cfg(unix)]
    let mut file = {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(&tmp_path)
            .map_err(|e| StoreError::CommandFailed(format!("failed to create temp file: {e}")))?
    };

    #[cfg(not(unix))]
    let mut file = fs::File::create(&tmp_path)
        .map_err(|e| StoreError::CommandFailed(format!("failed to create temp file: {e}")))?;

    let mut bytes = secret.as_bytes().to_vec();
    let written = file.write_all(&bytes).and_then(|()| file.flush());
    bytes.zeroize();
    if let Err(e) = written {
        secure_delete(&tmp_path);
        return Err(e.into());
    }
    Ok(tmp_path)
}

/// Entry name made safe for a file name.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

/// Find the user's preferred editor.
fn find_editor() -> String {
    ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|editor| !editor.is_empty())
        .unwrap_or_else(|| "vi".to_string())
}

/// Overwrite a file's contents with zeros before deleting it.
/// Best-effort: failures are ignored.
fn secure_delete(path: &Path) {
    if let Ok(metadata) = fs::metadata(path) {
        let len = metadata.len() as usize;
        if len > 0 {
            if let Ok(mut file) = fs::OpenOptions::new().write(true).open(path) {
                let zeros = vec![0u8; len];
                let _ = file.write_all(&zeros);
                let _ = file.flush();
            }
        }
    }
    let _ = fs::remove_file(path);
}
