//! Store enumeration.
//!
//! Walks the store root depth-first and projects it into [`StoreEntry`]
//! nodes. Directories become folders, `*.gpg` files become secrets named
//! without the suffix. Sidecars (`*.m.gpg`) and every other file are left
//! out, and version-control internals are skipped entirely.
//!
//! Listing goes through [`DirectoryListing`] so the walk can run against an
//! in-memory fake. Entries are sorted by name at every level so output is
//! deterministic.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::entry::StoreEntry;
use super::locator::{METADATA_SUFFIX, SECRET_SUFFIX};
use crate::errors::Result;
use crate::git::GIT_DIR;

/// One item of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    pub name: String,
    pub is_dir: bool,
}

impl ListedEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// Lists the immediate children of a directory.
pub trait DirectoryListing: Send + Sync {
    fn list(&self, dir: &Path) -> Result<Vec<ListedEntry>>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsDirectory;

impl DirectoryListing for OsDirectory {
    fn list(&self, dir: &Path) -> Result<Vec<ListedEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                tracing::warn!(dir = %dir.display(), "skipping entry with non UTF-8 name");
                continue;
            };
            entries.push(ListedEntry {
                name,
                is_dir: entry.path().is_dir(),
            });
        }
        Ok(entries)
    }
}

/// A secret file found by [`collect_secret_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretFile {
    /// Entry name relative to the root, `/`-separated, suffix stripped.
    pub name: String,
    pub path: PathBuf,
    /// The sidecar, when the same directory listing contains one.
    pub metadata_path: Option<PathBuf>,
}

/// `true` for the version-control internal directory (or a name ending with it).
fn is_vcs_dir(name: &str) -> bool {
    name.ends_with(GIT_DIR)
}

/// Entry name for a file, or `None` if the file is not a secret.
fn secret_name(file_name: &str) -> Option<&str> {
    if file_name.ends_with(METADATA_SUFFIX) {
        return None;
    }
    file_name
        .strip_suffix(SECRET_SUFFIX)
        .filter(|name| !name.is_empty())
}

fn sorted_listing(listing: &dyn DirectoryListing, dir: &Path) -> Result<Vec<ListedEntry>> {
    let mut items = listing.list(dir)?;
    items.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(items)
}

/// Build the tree below `root`. Returns the root's children.
pub fn build_tree(listing: &dyn DirectoryListing, root: &Path) -> Result<Vec<StoreEntry>> {
    build_children(listing, root)
}

fn build_children(listing: &dyn DirectoryListing, dir: &Path) -> Result<Vec<StoreEntry>> {
    let mut nodes = Vec::new();

    for item in sorted_listing(listing, dir)? {
        if item.is_dir {
            if is_vcs_dir(&item.name) {
                continue;
            }
            let children = build_children(listing, &dir.join(&item.name))?;
            nodes.push(StoreEntry::folder(item.name, children));
        } else if let Some(name) = secret_name(&item.name) {
            nodes.push(StoreEntry::secret(name));
        }
    }

    Ok(nodes)
}

/// Flatten every secret below `root` into `(name, path)` pairs.
pub fn collect_secret_files(listing: &dyn DirectoryListing, root: &Path) -> Result<Vec<SecretFile>> {
    let mut found = Vec::new();
    collect_into(listing, root, "", &mut found)?;
    Ok(found)
}

fn collect_into(
    listing: &dyn DirectoryListing,
    dir: &Path,
    prefix: &str,
    found: &mut Vec<SecretFile>,
) -> Result<()> {
    let items = sorted_listing(listing, dir)?;
    let sidecars: HashSet<&str> = items
        .iter()
        .filter(|i| !i.is_dir && i.name.ends_with(METADATA_SUFFIX))
        .map(|i| i.name.as_str())
        .collect();

    for item in &items {
        let path = dir.join(&item.name);
        if item.is_dir {
            if is_vcs_dir(&item.name) {
                continue;
            }
            let nested = format!("{prefix}{}/", item.name);
            collect_into(listing, &path, &nested, found)?;
        } else if let Some(name) = secret_name(&item.name) {
            let sidecar = format!("{name}{METADATA_SUFFIX}");
            let metadata_path = sidecars
                .contains(sidecar.as_str())
                .then(|| dir.join(&sidecar));
            found.push(SecretFile {
                name: format!("{prefix}{name}"),
                path,
                metadata_path,
            });
        }
    }
    Ok(())
}
