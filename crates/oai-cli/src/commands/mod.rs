//! Subcommand implementations.

mod delete_record;
mod get_record;
mod identify;
mod list;
mod list_metadata_formats;
mod list_sets;
mod put_record;
mod put_set;

use anyhow::{Context, Result};
use clap::Subcommand;

use oai_core::{Backend, PrototypeBackend};
use oai_file::FileStore;

use crate::cli::StoreOptions;
use crate::config;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Describe the backend's capabilities
    Identify(identify::IdentifyArgs),

    /// List supported metadata formats
    ListMetadataFormats(list_metadata_formats::ListMetadataFormatsArgs),

    /// Fetch a single record in one format
    GetRecord(get_record::GetRecordArgs),

    /// List records matching a selective query
    ListRecords(list::ListArgs),

    /// List record headers matching a selective query
    ListIdentifiers(list::ListArgs),

    /// List the set hierarchy
    ListSets(list_sets::ListSetsArgs),

    /// Store a record (file store only)
    PutRecord(put_record::PutRecordArgs),

    /// Delete a record (file store only)
    DeleteRecord(delete_record::DeleteRecordArgs),

    /// Store a set description (file store only)
    PutSet(put_set::PutSetArgs),
}

pub async fn handle(cmd: Command, store: &StoreOptions) -> Result<()> {
    match cmd {
        Command::Identify(args) => identify::run(args, store).await,
        Command::ListMetadataFormats(args) => list_metadata_formats::run(args, store).await,
        Command::GetRecord(args) => get_record::run(args, store).await,
        Command::ListRecords(args) => list::records(args, store).await,
        Command::ListIdentifiers(args) => list::identifiers(args, store).await,
        Command::ListSets(args) => list_sets::run(args, store).await,
        Command::PutRecord(args) => put_record::run(args, store).await,
        Command::DeleteRecord(args) => delete_record::run(args, store).await,
        Command::PutSet(args) => put_set::run(args, store).await,
    }
}

/// Open the backend selected by the global options.
pub(crate) async fn open_backend(options: &StoreOptions) -> Result<Box<dyn Backend>> {
    if options.prototype {
        return Ok(Box::new(PrototypeBackend::new()));
    }

    let root = root(options)?;
    let config = config::load(options.config.as_deref())?;
    let backend = oai_file::open(root, config)
        .await
        .context("Failed to open backend")?;

    Ok(Box::new(backend))
}

/// Open the file store for writing.
pub(crate) fn open_store(options: &StoreOptions) -> Result<FileStore> {
    if options.prototype {
        anyhow::bail!("The placeholder backend is read-only");
    }

    Ok(FileStore::new(root(options)?))
}

fn root(options: &StoreOptions) -> Result<&std::path::Path> {
    options
        .root
        .as_deref()
        .context("No store root. Pass --root or set OAI_STORE_ROOT.")
}
