//! `gpgpass mv` / `gpgpass cp`: move or duplicate an entry.

use crate::cli::output;
use crate::cli::{open_locked_store, Cli};
use crate::errors::Result;

/// Execute `mv` (`duplicate = false`) or `cp` (`duplicate = true`).
pub fn execute(cli: &Cli, from: &str, to: &str, duplicate: bool) -> Result<()> {
    let store = open_locked_store(cli)?;
    store.rename(from, to, duplicate)?;

    if duplicate {
        output::success(&format!("Copied {from} to {to}"));
    } else {
        output::success(&format!("Moved {from} to {to}"));
    }
    Ok(())
}
