//! Get record command implementation.

use anyhow::{Context, Result};
use clap::Args;

use oai_core::{Identifier, MetadataPrefix};

use crate::cli::StoreOptions;
use crate::commands::open_backend;
use crate::output;

#[derive(Args, Debug)]
pub struct GetRecordArgs {
    /// Record identifier
    #[arg(long)]
    pub identifier: String,

    /// Metadata format to disseminate
    #[arg(long, default_value = "oai_dc")]
    pub metadata_prefix: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: GetRecordArgs, store: &StoreOptions) -> Result<()> {
    let identifier = Identifier::new(&args.identifier).context("Invalid identifier")?;
    let prefix = MetadataPrefix::new(&args.metadata_prefix).context("Invalid metadata prefix")?;

    let backend = open_backend(store).await?;
    let record = backend
        .get_record(&identifier, &prefix)
        .await
        .context("Failed to get record")?;

    output::json(&record, args.pretty)
}
