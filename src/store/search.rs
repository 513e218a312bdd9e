//! Search over entry names and decrypted metadata.
//!
//! 1. Flatten the store into `(name, path)` pairs.
//! 2. Decrypt every existing sidecar in one `decrypt_many` batch. A sidecar
//!    that fails to decrypt or parse counts as having no metadata.
//! 3. Build the tree and keep only leaves whose path or metadata contains
//!    the query (case-insensitive), plus the folders leading to them.
//!
//! `has_metadata_match` is set only when the query appears in the entry's
//! metadata, not merely when a sidecar exists.

use std::collections::HashSet;
use std::path::PathBuf;

use super::entry::StoreEntry;
use super::metadata::MetadataCollection;
use super::tree::{build_tree, collect_secret_files, DirectoryListing};
use crate::crypto::EncryptionGateway;
use crate::errors::Result;

/// Search the store below `root` for `query`.
///
/// An empty (or blank) query returns the whole tree.
pub fn search(
    listing: &dyn DirectoryListing,
    crypto: &dyn EncryptionGateway,
    root: &std::path::Path,
    query: &str,
) -> Result<Vec<StoreEntry>> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return build_tree(listing, root);
    }

    let files = collect_secret_files(listing, root)?;

    let path_matches: HashSet<&str> = files
        .iter()
        .filter(|f| f.name.to_lowercase().contains(&query))
        .map(|f| f.name.as_str())
        .collect();

    let with_sidecar: Vec<(&str, PathBuf)> = files
        .iter()
        .filter_map(|f| f.metadata_path.clone().map(|p| (f.name.as_str(), p)))
        .collect();
    let sidecar_paths: Vec<PathBuf> = with_sidecar.iter().map(|(_, p)| p.clone()).collect();
    let decrypted = crypto.decrypt_many(&sidecar_paths)?;

    let mut metadata_matches: HashSet<&str> = HashSet::new();
    for (i, (name, path)) in with_sidecar.iter().enumerate() {
        let Some(Some(plaintext)) = decrypted.get(i) else {
            tracing::debug!(path = %path.display(), "no readable metadata, skipping");
            continue;
        };
        match MetadataCollection::from_json(plaintext) {
            Ok(metadata) if metadata.contains_text(&query) => {
                metadata_matches.insert(*name);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "unparsable metadata, skipping");
            }
        }
    }

    let tree = build_tree(listing, root)?;
    Ok(retain_matches(tree, "", &path_matches, &metadata_matches))
}

fn retain_matches(
    nodes: Vec<StoreEntry>,
    prefix: &str,
    path_matches: &HashSet<&str>,
    metadata_matches: &HashSet<&str>,
) -> Vec<StoreEntry> {
    let mut kept = Vec::new();

    for mut node in nodes {
        let relative = format!("{prefix}{}", node.name);
        if node.is_folder {
            let children = std::mem::take(&mut node.children);
            node.children = retain_matches(
                children,
                &format!("{relative}/"),
                path_matches,
                metadata_matches,
            );
            if !node.children.is_empty() {
                kept.push(node);
            }
        } else {
            node.has_metadata_match = metadata_matches.contains(relative.as_str());
            if node.has_metadata_match || path_matches.contains(relative.as_str()) {
                kept.push(node);
            }
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreError;
    use crate::store::tree::tests::MemoryDirectory;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;
    use zeroize::Zeroizing;

    /// Serves canned sidecar plaintexts and records batch sizes.
    struct CannedCrypto {
        plaintexts: HashMap<PathBuf, String>,
        batches: Mutex<Vec<usize>>,
    }

    impl CannedCrypto {
        fn new(entries: &[(&str, &str)]) -> Self {
            Self {
                plaintexts: entries
                    .iter()
                    .map(|(p, t)| (PathBuf::from(p), t.to_string()))
                    .collect(),
                batches: Mutex::new(Vec::new()),
            }
        }
    }

    impl EncryptionGateway for CannedCrypto {
        fn encrypt(&self, _path: &Path, _plaintext: &[u8], _recipient: &str) -> Result<()> {
            Err(StoreError::EncryptFailed("read-only".into()))
        }

        fn decrypt(&self, path: &Path) -> Result<Zeroizing<String>> {
            self.plaintexts
                .get(path)
                .map(|t| Zeroizing::new(t.clone()))
                .ok_or_else(|| StoreError::DecryptFailed(path.display().to_string()))
        }

        fn decrypt_many(&self, paths: &[PathBuf]) -> Result<Vec<Option<Zeroizing<String>>>> {
            self.batches.lock().unwrap().push(paths.len());
            Ok(paths.iter().map(|p| self.decrypt(p).ok()).collect())
        }

        fn verify_key_valid(&self, _recipient: &str) -> Result<bool> {
            Ok(true)
        }
    }

    const GITHUB_META: &str = r#"[{"key":"created","value":"2026-01-01 00:00:00","type":"Internal"},
        {"key":"user","value":"octocat","type":"Normal"}]"#;

    fn store() -> MemoryDirectory {
        MemoryDirectory::new(
            "/s",
            &[
                "mail.gpg",
                "web/github.gpg",
                "web/github.m.gpg",
                "web/gitlab.gpg",
                "web/gitlab.m.gpg",
                "bank/savings.gpg",
                "broken.gpg",
                "broken.m.gpg",
            ],
        )
    }

    fn crypto() -> CannedCrypto {
        CannedCrypto::new(&[
            ("/s/web/github.m.gpg", GITHUB_META),
            ("/s/broken.m.gpg", "not json"),
        ])
    }

    #[test]
    fn matches_on_path() {
        let result = search(&store(), &crypto(), Path::new("/s"), "GIT").unwrap();

        assert_eq!(result.len(), 1);
        let web = &result[0];
        assert_eq!(web.name, "web");
        let names: Vec<&str> = web.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["github", "gitlab"]);
        assert!(web.children.iter().all(|c| !c.has_metadata_match));
    }

    #[test]
    fn matches_on_metadata_value() {
        let result = search(&store(), &crypto(), Path::new("/s"), "octo").unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].children.len(), 1);
        let github = &result[0].children[0];
        assert_eq!(github.name, "github");
        assert!(github.has_metadata_match);
    }

    #[test]
    fn sidecar_presence_alone_is_not_a_match() {
        let result = search(&store(), &crypto(), Path::new("/s"), "github").unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].children.len(), 1);
        assert_eq!(result[0].children[0].name, "github");
        assert!(!result[0].children[0].has_metadata_match);
    }

    #[test]
    fn failed_and_unparsable_sidecars_do_not_abort() {
        let result = search(&store(), &crypto(), Path::new("/s"), "broken").unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "broken");
        assert!(!result[0].has_metadata_match);
    }

    #[test]
    fn decrypts_existing_sidecars_in_one_batch() {
        let crypto = crypto();
        search(&store(), &crypto, Path::new("/s"), "anything").unwrap();
        assert_eq!(*crypto.batches.lock().unwrap(), vec![3]);
    }

    #[test]
    fn blank_query_returns_whole_tree() {
        let crypto = crypto();
        let result = search(&store(), &crypto, Path::new("/s"), "  ").unwrap();
        assert_eq!(result.len(), 4);
        assert!(crypto.batches.lock().unwrap().is_empty());
    }

    #[test]
    fn no_match_is_empty() {
        let result = search(&store(), &crypto(), Path::new("/s"), "zzz").unwrap();
        assert!(result.is_empty());
    }
}
