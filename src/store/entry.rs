//! `StoreEntry` and `Password` types.
//!
//! A `StoreEntry` is a projection of the filesystem built fresh on every
//! listing or search. It is never persisted.

use zeroize::Zeroizing;

use super::metadata::MetadataCollection;

/// One node of the store tree: a secret (leaf) or a folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreEntry {
    /// Leaf path segment, suffix stripped for secrets.
    pub name: String,

    pub is_folder: bool,

    /// Set by search when the query matched this entry's metadata.
    pub has_metadata_match: bool,

    /// Children in name order. Always empty for secrets.
    pub children: Vec<StoreEntry>,

    /// Presentation flag owned by the caller.
    pub highlight: bool,
}

impl StoreEntry {
    pub fn secret(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn folder(name: impl Into<String>, children: Vec<StoreEntry>) -> Self {
        Self {
            name: name.into(),
            is_folder: true,
            children,
            ..Self::default()
        }
    }

    /// A folder with no secret anywhere below it.
    pub fn is_empty_folder(&self) -> bool {
        self.is_folder && self.children.iter().all(StoreEntry::is_empty_folder)
    }

    pub fn child(&self, name: &str) -> Option<&StoreEntry> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Number of secrets at or below this node.
    pub fn secret_count(&self) -> usize {
        if self.is_folder {
            self.children.iter().map(StoreEntry::secret_count).sum()
        } else {
            1
        }
    }
}

/// A decrypted secret with its metadata.
///
/// The secret is held in a `Zeroizing` buffer so it is wiped on drop.
/// Call `clear` to wipe it earlier.
pub struct Password {
    value: Zeroizing<String>,
    metadata: MetadataCollection,
}

impl Password {
    pub fn new(value: Zeroizing<String>, metadata: MetadataCollection) -> Self {
        Self { value, metadata }
    }

    /// Wrap a plain string, taking ownership so no copy lingers.
    pub fn from_string(value: String) -> Self {
        Self::new(Zeroizing::new(value), MetadataCollection::new())
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// The first line of the secret, which by convention is the password.
    pub fn first_line(&self) -> &str {
        self.value.lines().next().unwrap_or("")
    }

    /// Line `n` (1-based) of the secret.
    pub fn line(&self, n: usize) -> Option<&str> {
        n.checked_sub(1).and_then(|i| self.value.lines().nth(i))
    }

    pub fn metadata(&self) -> &MetadataCollection {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataCollection {
        &mut self.metadata
    }

    /// Wipe the secret now.
    pub fn clear(&mut self) {
        self.value = Zeroizing::new(String::new());
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("value", &"<redacted>")
            .field("metadata", &self.metadata.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_never_prints_the_secret() {
        let pw = Password::from_string("hunter2".into());
        let printed = format!("{pw:?}");
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("redacted"));
    }

    #[test]
    fn clear_wipes_value() {
        let mut pw = Password::from_string("hunter2".into());
        pw.clear();
        assert_eq!(pw.value(), "");
    }

    #[test]
    fn lines_are_one_based() {
        let pw = Password::from_string("s3cret\nuser: alice\nurl: example.com".into());
        assert_eq!(pw.first_line(), "s3cret");
        assert_eq!(pw.line(2), Some("user: alice"));
        assert_eq!(pw.line(0), None);
        assert_eq!(pw.line(4), None);
    }

    #[test]
    fn empty_folder_detection() {
        let empty = StoreEntry::folder("a", vec![StoreEntry::folder("b", vec![])]);
        assert!(empty.is_empty_folder());
        assert_eq!(empty.secret_count(), 0);

        let full = StoreEntry::folder("a", vec![StoreEntry::secret("x")]);
        assert!(!full.is_empty_folder());
        assert_eq!(full.secret_count(), 1);
        assert!(!StoreEntry::secret("x").is_empty_folder());
    }
}
