//! Identify command implementation.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::StoreOptions;
use crate::commands::open_backend;
use crate::output;

#[derive(Args, Debug)]
pub struct IdentifyArgs {
    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Identity {
    earliest_datestamp: String,
    deleted_record: &'static str,
    granularity: &'static str,
}

pub async fn run(args: IdentifyArgs, store: &StoreOptions) -> Result<()> {
    let backend = open_backend(store).await?;
    let capabilities = backend.capabilities();

    let earliest = backend.earliest_datestamp().await;

    output::json(
        &Identity {
            earliest_datestamp: capabilities.granularity.format(&earliest),
            deleted_record: capabilities.deleted_records.as_str(),
            granularity: capabilities.granularity.pattern(),
        },
        args.pretty,
    )
}
