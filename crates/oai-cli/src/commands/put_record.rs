//! Put record command implementation.

use std::io::{self, Read};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use serde_json::Value;

use oai_core::{
    Datestamp, Identifier, MetadataDocument, MetadataPrefix, RecordStore, SetSpec, StoredRecord,
};

use crate::cli::StoreOptions;
use crate::commands::open_store;
use crate::{config, output};

#[derive(Args, Debug)]
pub struct PutRecordArgs {
    /// Record identifier
    #[arg(long)]
    pub identifier: String,

    /// Modification datestamp (defaults to now)
    #[arg(long)]
    pub datestamp: Option<String>,

    /// Set the record belongs to (repeatable; replaces existing membership)
    #[arg(long = "set")]
    pub sets: Vec<String>,

    /// Metadata format of the document
    #[arg(long, default_value = "oai_dc")]
    pub metadata_prefix: String,

    /// JSON file with the metadata document (use - for stdin)
    #[arg(long)]
    pub file: String,
}

fn read_document(path: &str) -> Result<MetadataDocument> {
    let value: Value = if path == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        serde_json::from_str(&buf).context("Invalid JSON from stdin")?
    } else {
        let content = std::fs::read_to_string(path).context("Failed to read JSON file")?;
        serde_json::from_str(&content).context("Invalid JSON in file")?
    };

    MetadataDocument::new(value).context("Invalid metadata document")
}

pub async fn run(args: PutRecordArgs, store: &StoreOptions) -> Result<()> {
    let identifier = Identifier::new(&args.identifier).context("Invalid identifier")?;
    let prefix = MetadataPrefix::new(&args.metadata_prefix).context("Invalid metadata prefix")?;
    let datestamp = match &args.datestamp {
        Some(raw) => Datestamp::parse(raw).context("Invalid datestamp")?.start(),
        None => Utc::now(),
    };
    let sets = args
        .sets
        .iter()
        .map(SetSpec::new)
        .collect::<Result<Vec<_>, _>>()
        .context("Invalid set spec")?;

    let config = config::load(store.config.as_deref())?;
    if !config.metadata_formats.iter().any(|f| f.prefix == prefix) {
        anyhow::bail!("Metadata format {} is not configured", prefix);
    }

    let document = read_document(&args.file)?;
    let store = open_store(store)?;

    // Other formats of a live record are kept.
    let mut record = match store.record(&identifier).await? {
        Some(existing) if !existing.deleted => existing,
        _ => StoredRecord::new(identifier.clone(), datestamp),
    };
    record.datestamp = datestamp;
    if !sets.is_empty() {
        record.sets = sets;
    }
    let record = record.with_format(prefix, document);

    store.put_record(&record).context("Failed to store record")?;

    output::success(&format!("Stored record: {}", identifier));
    Ok(())
}
