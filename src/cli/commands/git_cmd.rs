//! `gpgpass git`: synchronize the store with its remote.

use crate::cli::output;
use crate::cli::{confirm, open_initialized_store, Cli, GitAction};
use crate::errors::Result;

/// Execute a `git` subcommand.
pub fn execute(cli: &Cli, action: &GitAction) -> Result<()> {
    let store = open_initialized_store(cli)?;

    match action {
        GitAction::Pull => {
            store.pull()?;
            output::success("Pulled remote changes");
        }
        GitAction::Push => {
            store.push()?;
            output::success("Pushed local changes");
        }
        GitAction::Status => {
            let (ahead, behind) = store.fetch()?;
            match (ahead, behind) {
                (0, 0) => output::success("Up to date with the remote"),
                (a, 0) => output::info(&format!("{a} commit(s) ahead; run `gpgpass git push`")),
                (0, b) => output::info(&format!("{b} commit(s) behind; run `gpgpass git pull`")),
                (a, b) => output::warning(&format!(
                    "Diverged: {a} ahead, {b} behind; run `gpgpass git pull` then push"
                )),
            }
        }
        GitAction::Disconnect { force } => {
            if !force && !confirm("Remove git history from this store? Entries are kept.")? {
                output::info("Cancelled.");
                return Ok(());
            }
            store.delete_repository()?;
            output::success("Store is no longer a git repository");
        }
    }

    Ok(())
}
