//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// filecache - inspect and edit a file-backed cache namespace
///
/// Values live under `<dir>/fc-namespaces/<namespace>/<key>`.
#[derive(Parser, Debug)]
#[command(name = "filecache")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Cache namespace
    #[arg(short, long, global = true, env = "FILECACHE_NAMESPACE", default_value = "default")]
    pub namespace: String,

    /// Base directory, defaults to the system temp dir
    #[arg(short, long, global = true)]
    pub dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store a value, read from stdin when omitted
    Set {
        key: String,
        value: Option<String>,
    },

    /// Print a value to stdout
    Get { key: String },

    /// Remove a value
    Delete { key: String },

    /// Exit with status 0 if the key is cached, 1 otherwise
    Exists { key: String },

    /// Remove the whole namespace from disk
    Destroy,
}
