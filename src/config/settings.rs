use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, StoreError};

/// Environment variable pointing at an alternative config file.
pub const CONFIG_ENV: &str = "GPGPASS_CONFIG";

/// Environment variable overriding `store_dir`.
pub const STORE_DIR_ENV: &str = "GPGPASS_STORE_DIR";

/// User-level configuration, loaded from `~/.gpgpass.toml`.
///
/// Every field has a default so gpgpass works without any config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Store root. Defaults to `~/.password-store`.
    #[serde(default)]
    pub store_dir: Option<PathBuf>,

    /// Length used by `generate` when the caller passes zero.
    #[serde(default = "default_password_length")]
    pub password_length: usize,

    /// Alphabet used by `generate` when the caller passes a blank one.
    #[serde(default = "default_password_alphabet")]
    pub password_alphabet: String,

    /// Program invoked for encryption and decryption.
    #[serde(default = "default_gpg_program")]
    pub gpg_program: String,

    /// Program invoked for version control.
    #[serde(default = "default_git_program")]
    pub git_program: String,

    /// Commit every mutation when the store is a git repository.
    #[serde(default = "default_git")]
    pub git: bool,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_password_length() -> usize {
    20
}

fn default_password_alphabet() -> String {
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()-_=+[]{};:,.<>/?"
        .to_string()
}

fn default_gpg_program() -> String {
    "gpg".to_string()
}

fn default_git_program() -> String {
    "git".to_string()
}

fn default_git() -> bool {
    true
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_dir: None,
            password_length: default_password_length(),
            password_alphabet: default_password_alphabet(),
            gpg_program: default_gpg_program(),
            git_program: default_git_program(),
            git: default_git(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the home directory.
    const FILE_NAME: &'static str = ".gpgpass.toml";

    /// Name of the store directory under the home directory.
    const STORE_DIR_NAME: &'static str = ".password-store";

    /// Load settings from `$GPGPASS_CONFIG` or `~/.gpgpass.toml`.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load_from(Path::new(&path)),
            None => match dirs::home_dir() {
                Some(home) => Self::load_from(&home.join(Self::FILE_NAME)),
                None => Ok(Self::default()),
            },
        }
    }

    /// Load settings from an explicit file.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            StoreError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        tracing::debug!(path = %config_path.display(), "loaded settings");
        Ok(settings)
    }

    /// Resolve the store root.
    ///
    /// Precedence: explicit override, `$GPGPASS_STORE_DIR`, `store_dir`,
    /// then `~/.password-store`.
    pub fn store_root(&self, override_dir: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = override_dir {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = std::env::var_os(STORE_DIR_ENV) {
            if !dir.is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }
        if let Some(dir) = &self.store_dir {
            return Ok(dir.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(Self::STORE_DIR_NAME))
            .ok_or_else(|| StoreError::ConfigError("cannot determine home directory".into()))
    }
}

// ── Tests ────────────────────────────────────────────────────────────
