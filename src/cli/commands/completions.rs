//! `gpgpass completions <shell>`: print a completion script for the store CLI.
//!
//! Entry names are not completed; the script only knows subcommands and flags.
//! Source the output from your shell profile, e.g.
//! `gpgpass completions zsh > "${fpath[1]}/_gpgpass"`.

use std::io::{self, Write};

use clap::{CommandFactory, ValueEnum};
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::{Result, StoreError};

const BIN_NAME: &str = "gpgpass";

pub fn execute(shell: &str) -> Result<()> {
    let shell = parse_shell(shell)?;
    write_script(shell, &mut io::stdout().lock());
    Ok(())
}

fn write_script(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, BIN_NAME, out);
}

/// Accepts clap's shell names in any case, plus `ps` for PowerShell.
fn parse_shell(name: &str) -> Result<Shell> {
    if name.eq_ignore_ascii_case("ps") {
        return Ok(Shell::PowerShell);
    }
    Shell::from_str(name, true).map_err(|_| {
        let known: Vec<String> = Shell::value_variants()
            .iter()
            .filter_map(|s| s.to_possible_value())
            .map(|v| v.get_name().to_string())
            .collect();
        StoreError::CommandFailed(format!(
            "no completion support for shell '{name}', try one of: {}",
            known.join(", ")
        ))
    })
}
