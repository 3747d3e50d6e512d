//! List metadata formats command implementation.

use anyhow::{Context, Result};
use clap::Args;

use oai_core::Identifier;

use crate::cli::StoreOptions;
use crate::commands::open_backend;
use crate::output;

#[derive(Args, Debug)]
pub struct ListMetadataFormatsArgs {
    /// Only formats the given record is available in
    #[arg(long)]
    pub identifier: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: ListMetadataFormatsArgs, store: &StoreOptions) -> Result<()> {
    let identifier = args
        .identifier
        .as_deref()
        .map(Identifier::new)
        .transpose()
        .context("Invalid identifier")?;

    let backend = open_backend(store).await?;
    let formats = backend
        .metadata_formats(identifier.as_ref())
        .await
        .context("Failed to list metadata formats")?;

    output::json(&formats, args.pretty)
}
