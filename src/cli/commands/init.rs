//! `gpgpass init`: create a new store for a gpg recipient.

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::{Result, StoreError};

/// Execute the `init` command.
pub fn execute(cli: &Cli, recipient: &str) -> Result<()> {
    let store = open_store(cli)?;
    let root = store.locator().root().display().to_string();

    match store.initialize(recipient) {
        Ok(()) => {}
        Err(StoreError::StoreAlreadyInitialized(path)) => {
            output::tip("Use `gpgpass insert <name>` to add entries to the existing store.");
            return Err(StoreError::StoreAlreadyInitialized(path));
        }
        Err(e @ StoreError::VersionControl(_)) => {
            // .gpg-id is written before the first commit; the store is usable.
            output::warning(&format!("Store initialized but not committed: {e}"));
            return Ok(());
        }
        Err(e) => return Err(e),
    }

    output::success(&format!("Store initialized for {} at {root}", recipient.trim()));
    output::tip("Run `gpgpass insert <name>` to add your first entry.");
    Ok(())
}
