//! `gpgpass ls`: display every entry as a tree.

use crate::cli::output;
use crate::cli::{open_initialized_store, Cli};
use crate::errors::Result;
use crate::store::StoreEntry;

/// Execute the `ls` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let store = open_initialized_store(cli)?;
    let tree = store.tree()?;

    let count: usize = tree.iter().map(StoreEntry::secret_count).sum();
    if count == 0 {
        output::info("No entries in this store yet.");
        output::tip("Run `gpgpass insert <name>` to add your first entry.");
        return Ok(());
    }

    output::info(&format!(
        "{}: {count} entr{}",
        store.locator().root().display(),
        if count == 1 { "y" } else { "ies" }
    ));
    output::print_tree(&tree);
    Ok(())
}
