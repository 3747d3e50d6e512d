//! List sets command implementation.

use anyhow::{Context, Result};
use clap::Args;

use oai_core::Page;

use crate::cli::StoreOptions;
use crate::commands::open_backend;
use crate::output;

#[derive(Args, Debug)]
pub struct ListSetsArgs {
    /// Resume a previous listing
    #[arg(long)]
    pub token: Option<String>,

    /// Follow resumption tokens until the list is complete
    #[arg(long)]
    pub all: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: ListSetsArgs, store: &StoreOptions) -> Result<()> {
    let backend = open_backend(store).await?;

    let mut page = backend
        .list_sets(args.token.as_deref())
        .await
        .context("Failed to list sets")?;

    if args.all {
        let mut sets = std::mem::take(&mut page.items);
        while let Some(token) = page.next_token().cloned() {
            page = backend
                .list_sets(Some(token.as_str()))
                .await
                .context("Failed to list sets")?;
            sets.append(&mut page.items);
        }
        page = Page::complete(sets);
    }

    output::json(&page, args.pretty)
}
