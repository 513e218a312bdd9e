//! `gpgpass generate`: create or replace an entry with a random password.

use crate::cli::output;
use crate::cli::{copy_to_clipboard, open_locked_store, Cli};
use crate::errors::Result;

/// Execute the `generate` command.
pub fn execute(cli: &Cli, name: &str, length: usize, alphabet: &str, clip: bool) -> Result<()> {
    let store = open_locked_store(cli)?;
    let existed = store.exists(name);

    let mut password = store.generate(name, length, alphabet)?;

    if existed {
        output::success(&format!("Replaced the password of {name}"));
    } else {
        output::success(&format!("Created {name}"));
    }

    if clip {
        copy_to_clipboard(password.value())?;
        output::info("Password copied to the clipboard.");
    } else {
        println!("{}", password.value());
    }

    password.clear();
    Ok(())
}
