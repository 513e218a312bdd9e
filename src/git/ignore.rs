//! `.gitignore` patching.
//!
//! Used when the lock file is first created so it never ends up in history.

use std::fs;
use std::path::Path;

use crate::errors::Result;

/// Append `entry` to `<root>/.gitignore` if not already present.
///
/// Creates the file if it doesn't exist. Returns `true` when the file
/// was changed.
pub fn patch_gitignore(root: &Path, entry: &str) -> Result<bool> {
    let gitignore_path = root.join(".gitignore");

    let existing = match fs::read_to_string(&gitignore_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    if existing.lines().any(|line| line.trim() == entry) {
        return Ok(false);
    }

    let separator = if existing.ends_with('\n') || existing.is_empty() {
        ""
    } else {
        "\n"
    };

    fs::write(&gitignore_path, format!("{existing}{separator}{entry}\n"))?;
    tracing::debug!(entry, "added to .gitignore");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn adds_entry_to_new_gitignore() {
        let dir = TempDir::new().unwrap();
        assert!(patch_gitignore(dir.path(), ".lock").unwrap());

        let content = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert!(content.contains(".lock"));
    }

    #[test]
    fn does_not_duplicate_entry() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), ".lock\n").unwrap();

        assert!(!patch_gitignore(dir.path(), ".lock").unwrap());

        let content = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(content.matches(".lock").count(), 1);
    }

    #[test]
    fn appends_with_newline_separator() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "*.swp").unwrap(); // no trailing newline

        patch_gitignore(dir.path(), ".lock").unwrap();

        let content = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(content, "*.swp\n.lock\n");
    }
}
