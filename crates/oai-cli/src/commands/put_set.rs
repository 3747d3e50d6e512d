//! Put set command implementation.

use anyhow::{Context, Result};
use clap::Args;

use oai_core::{SetDescriptor, SetSpec};

use crate::cli::StoreOptions;
use crate::commands::open_store;
use crate::output;

#[derive(Args, Debug)]
pub struct PutSetArgs {
    /// Colon-delimited set spec (e.g. science:physics)
    #[arg(long)]
    pub spec: String,

    /// Display name
    #[arg(long)]
    pub name: String,

    /// Free-text description
    #[arg(long)]
    pub description: Option<String>,
}

pub async fn run(args: PutSetArgs, store: &StoreOptions) -> Result<()> {
    let spec = SetSpec::new(&args.spec).context("Invalid set spec")?;
    let store = open_store(store)?;

    let mut set = SetDescriptor::new(spec, &args.name);
    if let Some(description) = args.description {
        set = set.with_description(description);
    }

    store.put_set(set).context("Failed to store set")?;

    output::success(&format!("Stored set: {}", args.spec));
    Ok(())
}
