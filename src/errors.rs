use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in gpgpass.
#[derive(Debug, Error)]
pub enum StoreError {
    // --- Entry errors ---
    #[error("Entry '{0}' not found")]
    EntryNotFound(String),

    #[error("Entry '{0}' already exists")]
    EntryAlreadyExists(String),

    #[error("Invalid entry name '{0}'")]
    InvalidEntryName(String),

    #[error("Metadata key '{0}' is managed by the store and cannot be edited")]
    ReservedMetadataKey(String),

    // --- Store errors ---
    #[error("Password store at {0} is already initialized")]
    StoreAlreadyInitialized(PathBuf),

    #[error("Store folder {0} already exists and is not empty")]
    StoreFolderAlreadyExists(PathBuf),

    #[error("Password store at {0} is not initialized (run `gpgpass init <gpg-id>`)")]
    StoreNotInitialized(PathBuf),

    #[error("Recipient identity file not found at {0}")]
    IdentityNotFound(PathBuf),

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptFailed(String),

    #[error("Entry '{0}' decrypted to an empty secret")]
    EmptySecretAfterDecrypt(String),

    #[error("Key '{0}' not found in the keyring")]
    KeyNotFound(String),

    #[error("Key '{0}' is invalid, revoked or expired")]
    KeyInvalidOrExpired(String),

    // --- Lock errors ---
    #[error("Store lock verification failed: lock file missing, corrupted or not held")]
    LockVerificationFailed,

    #[error("Store lock {0} is held by another process")]
    StoreLocked(PathBuf),

    // --- Version control errors ---
    #[error("Cloning remote store from '{0}' failed")]
    RemoteCloneFailed(String),

    #[error("Version control error: {0}")]
    VersionControl(String),

    // --- Generator errors ---
    #[error("Invalid password generator input: {0}")]
    InvalidGeneratorInput(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

/// Convenience type alias for gpgpass results.
pub type Result<T> = std::result::Result<T, StoreError>;
