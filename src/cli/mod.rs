//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, StoreError};
use crate::store::PasswordStore;

/// gpgpass CLI: a gpg-encrypted, git-versioned password store.
#[derive(Parser)]
#[command(
    name = "gpgpass",
    about = "Encrypted hierarchical password store backed by gpg and git",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Store directory (default: $GPGPASS_STORE_DIR, then config, then ~/.password-store)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Initialize a new store for a gpg recipient
    Init {
        /// gpg key id, fingerprint or email of the recipient
        recipient: String,
    },

    /// Clone an existing store from a git remote
    Clone {
        /// Remote URL
        url: String,
    },

    /// List all entries as a tree
    #[command(alias = "list")]
    Ls,

    /// Search entry names and metadata
    Find {
        /// Text to look for (case-insensitive)
        query: String,
    },

    /// Decrypt and print an entry
    Show {
        /// Entry name (e.g. web/github)
        name: String,
        /// Print only this line (1-based)
        #[arg(short, long)]
        line: Option<usize>,
        /// Copy to the clipboard instead of printing
        #[arg(short, long)]
        clip: bool,
    },

    /// Add a new entry
    Insert {
        /// Entry name
        name: String,
        /// Read a multi-line secret from stdin until EOF
        #[arg(short, long)]
        multiline: bool,
    },

    /// Edit an existing entry's secret in $EDITOR
    Edit {
        /// Entry name
        name: String,
    },

    /// Show or change an entry's metadata
    Meta {
        #[command(subcommand)]
        action: MetaAction,
    },

    /// Move or rename an entry
    Mv {
        /// Current entry name
        from: String,
        /// New entry name
        to: String,
    },

    /// Copy an entry
    Cp {
        /// Entry to copy
        from: String,
        /// Name of the copy
        to: String,
    },

    /// Delete an entry
    Rm {
        /// Entry name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Generate a random password (creates or replaces the entry)
    Generate {
        /// Entry name
        name: String,
        /// Password length (default from config)
        #[arg(short, long, default_value_t = 0)]
        length: usize,
        /// Characters to draw from (default from config)
        #[arg(short, long, default_value = "")]
        alphabet: String,
        /// Copy to the clipboard instead of printing
        #[arg(short, long)]
        clip: bool,
    },

    /// Synchronize the store with its git remote
    Git {
        #[command(subcommand)]
        action: GitAction,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

/// Metadata subcommands.
#[derive(clap::Subcommand)]
pub enum MetaAction {
    /// Print all metadata of an entry
    Show {
        /// Entry name
        name: String,
    },

    /// Set a field
    Set {
        /// Entry name
        name: String,
        /// Field name
        key: String,
        /// Field value
        value: String,
    },

    /// Remove a field
    Unset {
        /// Entry name
        name: String,
        /// Field name
        key: String,
    },
}

/// Git subcommands.
#[derive(clap::Subcommand)]
pub enum GitAction {
    /// Pull and rebase onto the remote
    Pull,

    /// Push local commits
    Push,

    /// Fetch and report how far the store is ahead/behind
    Status,

    /// Remove git history from the store, keeping all entries
    Disconnect {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Open the store selected by `--store` / env / config.
pub fn open_store(cli: &Cli) -> Result<PasswordStore> {
    let settings = Settings::load()?;
    PasswordStore::from_settings(&settings, cli.store.as_deref())
}

/// Open the store for a mutating command: it must be initialized and the
/// lock must be taken.
pub fn open_locked_store(cli: &Cli) -> Result<PasswordStore> {
    let mut store = open_initialized_store(cli)?;
    store.acquire_lock()?;
    Ok(store)
}

/// Open the store and fail early if it has no recipient yet.
pub fn open_initialized_store(cli: &Cli) -> Result<PasswordStore> {
    let store = open_store(cli)?;
    if !store.is_initialized() {
        output::tip("Run `gpgpass init <gpg-id>` or `gpgpass clone <url>` first.");
        return Err(StoreError::StoreNotInitialized(
            store.locator().root().to_path_buf(),
        ));
    }
    Ok(store)
}

/// Prompt for a secret with confirmation.
///
/// Returns `Zeroizing<String>` so the secret is wiped from memory on drop.
pub fn prompt_secret(name: &str) -> Result<Zeroizing<String>> {
    let secret = dialoguer::Password::new()
        .with_prompt(format!("Enter password for {name}"))
        .with_confirmation(
            format!("Retype password for {name}"),
            "Passwords do not match, try again",
        )
        .interact()
        .map_err(|e| StoreError::CommandFailed(format!("password prompt: {e}")))?;

    if secret.is_empty() {
        return Err(StoreError::CommandFailed("secret cannot be empty".into()));
    }
    Ok(Zeroizing::new(secret))
}

/// Read a multi-line secret from stdin until EOF.
pub fn read_secret_from_stdin() -> Result<Zeroizing<String>> {
    let mut buf = Zeroizing::new(String::new());
    std::io::stdin().read_to_string(&mut buf)?;
    if buf.trim().is_empty() {
        return Err(StoreError::CommandFailed("secret cannot be empty".into()));
    }
    Ok(buf)
}

/// Ask a yes/no question, defaulting to no.
pub fn confirm(prompt: &str) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| StoreError::CommandFailed(format!("confirm prompt: {e}")))
}

/// Put `text` on the system clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new()
        .map_err(|e| StoreError::CommandFailed(format!("clipboard unavailable: {e}")))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|e| StoreError::CommandFailed(format!("clipboard write failed: {e}")))
}
