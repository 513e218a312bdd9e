use clap::Parser;
use gpgpass::cli::commands;
use gpgpass::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `debug`, `gpgpass=trace`).
const LOG_ENV: &str = "GPGPASS_LOG";

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays pipe-friendly.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Init { ref recipient } => commands::init::execute(&cli, recipient),
        Commands::Clone { ref url } => commands::clone::execute(&cli, url),
        Commands::Ls => commands::ls::execute(&cli),
        Commands::Find { ref query } => commands::find::execute(&cli, query),
        Commands::Show {
            ref name,
            line,
            clip,
        } => commands::show::execute(&cli, name, line, clip),
        Commands::Insert {
            ref name,
            multiline,
        } => commands::insert::execute(&cli, name, multiline),
        Commands::Edit { ref name } => commands::edit::execute(&cli, name),
        Commands::Meta { ref action } => commands::meta::execute(&cli, action),
        Commands::Mv { ref from, ref to } => commands::rename::execute(&cli, from, to, false),
        Commands::Cp { ref from, ref to } => commands::rename::execute(&cli, from, to, true),
        Commands::Rm { ref name, force } => commands::rm::execute(&cli, name, force),
        Commands::Generate {
            ref name,
            length,
            ref alphabet,
            clip,
        } => commands::generate::execute(&cli, name, length, alphabet, clip),
        Commands::Git { ref action } => commands::git_cmd::execute(&cli, action),
        Commands::Completions { ref shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        gpgpass::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
