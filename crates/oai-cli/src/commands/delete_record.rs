//! Delete record command implementation.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;

use oai_core::Identifier;

use crate::cli::StoreOptions;
use crate::commands::open_store;
use crate::output;

#[derive(Args, Debug)]
pub struct DeleteRecordArgs {
    /// Record identifier
    #[arg(long)]
    pub identifier: String,

    /// Remove the record entirely instead of leaving a tombstone
    #[arg(long)]
    pub purge: bool,
}

pub async fn run(args: DeleteRecordArgs, store: &StoreOptions) -> Result<()> {
    let identifier = Identifier::new(&args.identifier).context("Invalid identifier")?;
    let store = open_store(store)?;

    let existed = store
        .delete_record(&identifier, Utc::now(), args.purge)
        .context("Failed to delete record")?;

    if !existed {
        anyhow::bail!("Record {} not found", identifier);
    }

    let action = if args.purge { "Purged" } else { "Deleted" };
    output::success(&format!("{} record: {}", action, identifier));
    Ok(())
}
