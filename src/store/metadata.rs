//! Entry metadata and its encrypted sidecar.
//!
//! Each entry `name` may have a sidecar `name.m.gpg` holding an ordered
//! list of `{key, value, type}` records as JSON. Two keys are managed by
//! the store itself and typed `Internal`: `created` and `modified`.
//! Everything else is a free-form `Normal` field.

use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::locator::StoreLocator;
use crate::crypto::EncryptionGateway;
use crate::errors::{Result, StoreError};

/// Key of the creation stamp.
pub const CREATED_KEY: &str = "created";

/// Key of the last-modification stamp.
pub const MODIFIED_KEY: &str = "modified";

/// Local time, second precision, lexicographically sortable.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time formatted for `created` / `modified`.
pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetadataType {
    Normal,
    Internal,
}

/// One metadata record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: MetadataType,
}

impl Metadata {
    pub fn normal(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            kind: MetadataType::Normal,
        }
    }

    pub fn internal(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            kind: MetadataType::Internal,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.kind == MetadataType::Internal
    }
}

/// Ordered metadata of one entry.
///
/// Lookups go by key and return the first record in insertion order.
/// Duplicate keys are tolerated when read from disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataCollection {
    items: Vec<Metadata>,
}

impl MetadataCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata of an entry that was never written: `created` and
    /// `modified` both set to `stamp`.
    pub fn fresh(stamp: &str) -> Self {
        Self {
            items: vec![
                Metadata::internal(CREATED_KEY, stamp),
                Metadata::internal(MODIFIED_KEY, stamp),
            ],
        }
    }

    pub fn is_reserved_key(key: &str) -> bool {
        key == CREATED_KEY || key == MODIFIED_KEY
    }

    pub fn iter(&self) -> impl Iterator<Item = &Metadata> {
        self.items.iter()
    }

    /// User-editable records only.
    pub fn normal(&self) -> impl Iterator<Item = &Metadata> {
        self.items.iter().filter(|m| !m.is_internal())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Metadata> {
        self.items.iter().find(|m| m.key == key)
    }

    pub fn created(&self) -> Option<&str> {
        self.items
            .iter()
            .find(|m| m.is_internal() && m.key == CREATED_KEY)
            .map(|m| m.value.as_str())
    }

    pub fn modified(&self) -> Option<&str> {
        self.items
            .iter()
            .find(|m| m.is_internal() && m.key == MODIFIED_KEY)
            .map(|m| m.value.as_str())
    }

    /// Set a `Normal` field. Returns `true` if an existing field was
    /// overwritten, `false` if a new one was appended.
    pub fn set(&mut self, key: &str, value: &str) -> Result<bool> {
        if Self::is_reserved_key(key) {
            return Err(StoreError::ReservedMetadataKey(key.to_string()));
        }
        if key.trim().is_empty() {
            return Err(StoreError::CommandFailed(
                "metadata key cannot be empty".into(),
            ));
        }

        match self
            .items
            .iter_mut()
            .find(|m| !m.is_internal() && m.key == key)
        {
            Some(existing) => {
                existing.value.zeroize();
                existing.value = value.to_string();
                Ok(true)
            }
            None => {
                self.items.push(Metadata::normal(key, value));
                Ok(false)
            }
        }
    }

    /// Remove every `Normal` field named `key`. Returns `true` if any was removed.
    pub fn remove(&mut self, key: &str) -> Result<bool> {
        if Self::is_reserved_key(key) {
            return Err(StoreError::ReservedMetadataKey(key.to_string()));
        }
        let before = self.items.len();
        self.items.retain(|m| m.is_internal() || m.key != key);
        Ok(self.items.len() != before)
    }

    /// Overwrite the `modified` stamp, appending it if missing.
    /// Returns `true` if it was already present.
    ///
    /// Only the first `Internal` modified record survives; duplicates left by
    /// hand-edited sidecars are dropped.
    pub fn stamp_modified(&mut self, stamp: &str) -> bool {
        let mut seen = false;
        self.items.retain_mut(|item| {
            if !(item.is_internal() && item.key == MODIFIED_KEY) {
                return true;
            }
            if seen {
                return false;
            }
            seen = true;
            item.value = stamp.to_string();
            true
        });
        if !seen {
            self.items.push(Metadata::internal(MODIFIED_KEY, stamp));
        }
        seen
    }

    /// Keep this collection's `Internal` records and take every `Normal`
    /// record from `edited`, in its order.
    pub fn replace_normal(&mut self, edited: &MetadataCollection) {
        self.items.retain(Metadata::is_internal);
        self.items.extend(edited.normal().cloned());
    }

    /// Case-insensitive substring match against `Normal` keys and values.
    pub(crate) fn contains_text(&self, needle_lower: &str) -> bool {
        self.normal().any(|m| {
            m.key.to_lowercase().contains(needle_lower)
                || m.value.to_lowercase().contains(needle_lower)
        })
    }

    pub(crate) fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| StoreError::SerializationError(e.to_string()))
    }

    pub(crate) fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| StoreError::DecryptFailed(format!("metadata is not readable: {e}")))
    }
}

impl Drop for MetadataCollection {
    fn drop(&mut self) {
        for item in &mut self.items {
            item.value.zeroize();
        }
    }
}

/// Reads and writes metadata sidecars.
pub struct MetadataManager {
    locator: StoreLocator,
    crypto: Arc<dyn EncryptionGateway>,
}

impl MetadataManager {
    pub fn new(locator: StoreLocator, crypto: Arc<dyn EncryptionGateway>) -> Self {
        Self { locator, crypto }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.locator.metadata_path(name).exists()
    }

    /// Read the metadata of `name`.
    ///
    /// Without a sidecar, returns fresh `created`/`modified` stamps set to
    /// now and writes nothing.
    pub fn retrieve(&self, name: &str) -> Result<MetadataCollection> {
        let path = self.locator.metadata_path(name);
        if !path.exists() {
            return Ok(MetadataCollection::fresh(&timestamp_now()));
        }

        let plaintext = self.crypto.decrypt(&path)?;
        MetadataCollection::from_json(&plaintext)
    }

    /// Encrypt `collection` into the sidecar of `name`.
    pub fn write(&self, name: &str, collection: &MetadataCollection) -> Result<()> {
        let recipient = self.locator.store_id()?;
        let path = self.locator.metadata_path(name);

        let mut json = collection.to_json()?;
        let result = self.crypto.encrypt(&path, &json, &recipient);
        json.zeroize();
        result
    }

    /// Refresh the `modified` stamp and write the sidecar.
    ///
    /// Uses `collection` when the caller already has one, otherwise the
    /// current sidecar (or fresh stamps). Returns what was written.
    pub fn touch(
        &self,
        name: &str,
        collection: Option<MetadataCollection>,
    ) -> Result<MetadataCollection> {
        let mut collection = match collection {
            Some(c) => c,
            None => self.retrieve(name)?,
        };

        collection.stamp_modified(&timestamp_now());
        self.write(name, &collection)?;
        tracing::debug!(entry = name, "metadata touched");
        Ok(collection)
    }
}
