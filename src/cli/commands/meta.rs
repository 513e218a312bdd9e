//! `gpgpass meta`: show and edit an entry's metadata.

use crate::cli::output;
use crate::cli::{open_initialized_store, open_locked_store, Cli, MetaAction};
use crate::errors::{Result, StoreError};

/// Execute a `meta` subcommand.
pub fn execute(cli: &Cli, action: &MetaAction) -> Result<()> {
    match action {
        MetaAction::Show { name } => show(cli, name),
        MetaAction::Set { name, key, value } => set(cli, name, key, value),
        MetaAction::Unset { name, key } => unset(cli, name, key),
    }
}

fn show(cli: &Cli, name: &str) -> Result<()> {
    let store = open_initialized_store(cli)?;
    let metadata = store.metadata(name)?;
    output::print_metadata_table(&metadata);
    Ok(())
}

fn set(cli: &Cli, name: &str, key: &str, value: &str) -> Result<()> {
    let store = open_locked_store(cli)?;
    let mut metadata = store.metadata(name)?;
    let replaced = metadata.set(key, value)?;

    store.edit_metadata(name, &metadata)?;
    if replaced {
        output::success(&format!("Updated '{key}' on {name}"));
    } else {
        output::success(&format!("Added '{key}' to {name}"));
    }
    Ok(())
}

fn unset(cli: &Cli, name: &str, key: &str) -> Result<()> {
    let store = open_locked_store(cli)?;
    let mut metadata = store.metadata(name)?;
    if !metadata.remove(key)? {
        return Err(StoreError::CommandFailed(format!(
            "{name} has no metadata field '{key}'"
        )));
    }

    store.edit_metadata(name, &metadata)?;
    output::success(&format!("Removed '{key}' from {name}"));
    Ok(())
}
