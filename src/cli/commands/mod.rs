//! One module per CLI command.

pub mod clone;
pub mod completions;
pub mod edit;
pub mod find;
pub mod generate;
pub mod git_cmd;
pub mod init;
pub mod insert;
pub mod ls;
pub mod meta;
pub mod rename;
pub mod rm;
pub mod show;
