//! Store engine: the on-disk password store.
//!
//! This module provides:
//! - Root resolution and file layout (`locator`)
//! - The single-writer lock (`lock`)
//! - Metadata sidecars with audit stamps (`metadata`)
//! - `StoreEntry` / `Password` types (`entry`)
//! - Tree enumeration (`tree`) and search (`search`)
//! - `PasswordStore`, the lifecycle API callers use (`engine`)

pub mod engine;
pub mod entry;
pub mod locator;
pub mod lock;
pub mod metadata;
pub mod search;
pub mod tree;

// Re-export the most commonly used items.
pub use engine::{GeneratorDefaults, PasswordStore};
pub use entry::{Password, StoreEntry};
pub use locator::StoreLocator;
pub use lock::LockManager;
pub use metadata::{Metadata, MetadataCollection, MetadataManager, MetadataType};
pub use tree::{DirectoryListing, ListedEntry, OsDirectory};
