//! `gpgpass clone`: fetch an existing store from a git remote.

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::Result;

/// Execute the `clone` command.
pub fn execute(cli: &Cli, url: &str) -> Result<()> {
    let store = open_store(cli)?;
    store.clone_remote(url)?;

    output::success(&format!(
        "Cloned {url} into {}",
        store.locator().root().display()
    ));
    if !store.is_initialized() {
        output::warning("The cloned repository has no .gpg-id; run `gpgpass init <gpg-id>`.");
    }
    Ok(())
}
