//! `gpgpass show`: decrypt an entry and print it (or copy it).

use crate::cli::output;
use crate::cli::{copy_to_clipboard, open_initialized_store, Cli};
use crate::errors::{Result, StoreError};

/// Execute the `show` command.
pub fn execute(cli: &Cli, name: &str, line: Option<usize>, clip: bool) -> Result<()> {
    let store = open_initialized_store(cli)?;
    let mut password = store.show(name)?;

    let text = match line {
        Some(n) => password.line(n).ok_or_else(|| {
            StoreError::CommandFailed(format!("entry '{name}' has no line {n}"))
        })?,
        None if clip => password.first_line(),
        None => password.value(),
    };

    if clip {
        copy_to_clipboard(text)?;
        output::success(&format!("Copied {name} to the clipboard"));
    } else {
        println!("{}", text.trim_end_matches('\n'));
    }

    password.clear();
    Ok(())
}
