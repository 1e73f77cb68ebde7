//! Command-line surface (`clap`, derive style — matches the teacher's
//! CLI tools such as `docs-generator`).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// The Generation Orchestration Engine.
#[derive(Parser)]
#[command(name = "forge")]
#[command(about = "Generation Orchestration Engine: job manager + multi-model ensembles")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to a TOML config file (defaults to `forge.toml` in the
    /// current directory; missing file falls back to built-in defaults).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP + JSON-RPC server (default if no subcommand given).
    Serve {
        /// Override `server.bind_addr` from the config file.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Load and print the resolved configuration, then exit.
    CheckConfig,
}
