//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::commands::Command;

/// OAI-PMH backend tool: harvest from and populate a record store.
#[derive(Parser, Debug)]
#[command(name = "oai-backend")]
#[command(author, version = env!("OAI_BACKEND_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub store: StoreOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Where records come from and how they are served.
#[derive(Args, Debug, Clone)]
pub struct StoreOptions {
    /// Root directory of the record store
    #[arg(long, env = "OAI_STORE_ROOT", global = true)]
    pub root: Option<PathBuf>,

    /// Backend configuration file (JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Serve from the empty placeholder backend instead of a store
    #[arg(long, global = true)]
    pub prototype: bool,
}
