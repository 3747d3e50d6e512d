//! List records and list identifiers command implementations.

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use oai_core::{Page, QueryParams, SelectiveQuery};

use crate::cli::StoreOptions;
use crate::commands::open_backend;
use crate::output;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Metadata format to harvest
    #[arg(long)]
    pub metadata_prefix: Option<String>,

    /// Lower datestamp bound (YYYY-MM-DD or YYYY-MM-DDThh:mm:ssZ)
    #[arg(long)]
    pub from: Option<String>,

    /// Upper datestamp bound, inclusive
    #[arg(long)]
    pub until: Option<String>,

    /// Restrict to a set and its descendants
    #[arg(long)]
    pub set: Option<String>,

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

impl ListArgs {
    fn query(&self) -> Result<SelectiveQuery> {
        let params = QueryParams {
            metadata_prefix: self.metadata_prefix.clone(),
            from: self.from.clone(),
            until: self.until.clone(),
            set: self.set.clone(),
            resumption_token: self.token.clone(),
        };
        params.parse().context("Invalid arguments")
    }
}

pub async fn records(args: ListArgs, store: &StoreOptions) -> Result<()> {
    let backend = open_backend(store).await?;
    let backend = backend.as_ref();
    let query = args.query()?;

    let page = harvest(&args, query, |q| async move { backend.list_records(&q).await })
        .await
        .context("Failed to list records")?;

    output::json(&page, args.pretty)
}

pub async fn identifiers(args: ListArgs, store: &StoreOptions) -> Result<()> {
    let backend = open_backend(store).await?;
    let backend = backend.as_ref();
    let query = args.query()?;

    let page = harvest(&args, query, |q| async move { backend.list_identifiers(&q).await })
        .await
        .context("Failed to list identifiers")?;

    output::json(&page, args.pretty)
}

/// Fetch one page, or every page when `--all` is given.
async fn harvest<T, F, Fut>(
    args: &ListArgs,
    query: SelectiveQuery,
    fetch: F,
) -> oai_core::Result<Page<T>>
where
    F: Fn(SelectiveQuery) -> Fut,
    Fut: Future<Output = oai_core::Result<Page<T>>>,
{
    let mut page = fetch(query).await?;
    if !args.all {
        return Ok(page);
    }

    let mut items = std::mem::take(&mut page.items);
    while let Some(token) = page.next_token().cloned() {
        debug!(fetched = items.len(), "Following resumption token");
        page = fetch(SelectiveQuery::resume(token.into_string())).await?;
        items.append(&mut page.items);
    }

    Ok(Page::complete(items))
}
