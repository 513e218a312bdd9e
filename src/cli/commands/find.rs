//! `gpgpass find`: search entry names and metadata.

use crate::cli::output;
use crate::cli::{open_initialized_store, Cli};
use crate::errors::Result;
use crate::store::StoreEntry;

/// Execute the `find` command.
pub fn execute(cli: &Cli, query: &str) -> Result<()> {
    let store = open_initialized_store(cli)?;
    let results = store.search(query)?;

    let count: usize = results.iter().map(StoreEntry::secret_count).sum();
    if count == 0 {
        output::info(&format!("No entries match '{query}'."));
        return Ok(());
    }

    output::print_tree(&results);
    if results.iter().any(has_metadata_hit) {
        output::tip("* matched in metadata");
    }
    Ok(())
}

fn has_metadata_hit(entry: &StoreEntry) -> bool {
    entry.has_metadata_match || entry.children.iter().any(has_metadata_hit)
}
