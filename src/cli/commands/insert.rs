//! `gpgpass insert`: add a new entry.

use crate::cli::output;
use crate::cli::{open_locked_store, prompt_secret, read_secret_from_stdin, Cli};
use crate::errors::{Result, StoreError};
use crate::store::{MetadataCollection, Password};

/// Execute the `insert` command.
pub fn execute(cli: &Cli, name: &str, multiline: bool) -> Result<()> {
    let store = open_locked_store(cli)?;
    if store.exists(name) {
        output::tip(&format!("Use `gpgpass edit {name}` to change it."));
        return Err(StoreError::EntryAlreadyExists(name.to_string()));
    }

    let secret = if multiline {
        read_secret_from_stdin()?
    } else {
        prompt_secret(name)?
    };
    let password = Password::new(secret, MetadataCollection::new());

    store.add(name, &password)?;
    output::success(&format!("Added {name}"));
    Ok(())
}
