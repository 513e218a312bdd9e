//! User configuration loaded from `~/.gpgpass.toml`.

pub mod settings;

pub use settings::Settings;
