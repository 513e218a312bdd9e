//! `gpgpass rm`: delete an entry and its metadata.

use crate::cli::output;
use crate::cli::{confirm, open_locked_store, Cli};
use crate::errors::{Result, StoreError};

/// Execute the `rm` command.
pub fn execute(cli: &Cli, name: &str, force: bool) -> Result<()> {
    let store = open_locked_store(cli)?;
    if !store.exists(name) {
        return Err(StoreError::EntryNotFound(name.to_string()));
    }

    // Unless --force is set, ask for confirmation before deleting.
    if !force && !confirm(&format!("Delete {name}?"))? {
        output::info("Cancelled.");
        return Ok(());
    }

    store.remove(name)?;
    output::success(&format!("Removed {name}"));
    Ok(())
}
