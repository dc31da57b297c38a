//! Snapshot ingestion: pick the newest extract per entity kind, parse and
//! validate all of them, then replace the reference tables in one go.
//!
//! Nothing reaches storage until every located file has parsed cleanly, and
//! the store applies the whole snapshot in a single transaction, so a bad
//! file for one kind never leaves the other tables half-replaced.

pub mod locate;
pub mod parse;
pub mod schema;

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::database::{DatabaseError, ReferenceStore, ReplaceOutcome, Snapshot};
use parse::FromRecord;
pub use schema::{EntityKind, EntitySchema, HeaderError};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("data directory {} is not readable: {source}", .path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: header does not match the expected layout: {source}", .path.display())]
    Header {
        path: PathBuf,
        #[source]
        source: HeaderError,
    },

    #[error("{}, line {line}, column {column}: {reason}", .path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        column: &'static str,
        reason: String,
    },

    #[error("{}: malformed CSV: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("storage rejected the snapshot: {0}")]
    Storage(#[from] DatabaseError),

    #[error("ingest task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// One extract that went into a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SourceFile {
    pub kind: EntityKind,
    pub path: PathBuf,
    pub sha256: String,
    pub rows: usize,
}

/// Parsed snapshot plus where each part came from.
#[derive(Debug, Default)]
pub struct PreparedSnapshot {
    pub snapshot: Snapshot,
    pub sources: Vec<SourceFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub sources: Vec<SourceFile>,
    pub outcome: ReplaceOutcome,
}

impl IngestReport {
    /// One-line summary for the flash message and CLI output.
    pub fn message(&self) -> String {
        if self.sources.is_empty() {
            return "Data loaded successfully. No household, product or transaction files were found."
                .to_string();
        }

        let loaded: Vec<String> = self
            .sources
            .iter()
            .map(|s| format!("{} {}", s.rows, plural(s.kind)))
            .collect();
        let mut message = format!("Data loaded successfully: {}.", loaded.join(", "));

        let orphans = self.outcome.orphan_households + self.outcome.orphan_products;
        if orphans > 0 {
            message.push_str(&format!(
                " {} transaction(s) reference unknown households and {} unknown products.",
                self.outcome.orphan_households, self.outcome.orphan_products
            ));
        }
        message
    }
}

fn plural(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Household => "households",
        EntityKind::Product => "products",
        EntityKind::Transaction => "transactions",
    }
}

/// Read, checksum and parse one extract.
fn load<T: FromRecord>(path: &Path) -> Result<(Vec<T>, SourceFile), IngestError> {
    let bytes = fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let sha256 = format!("{:x}", Sha256::digest(&bytes));
    let rows: Vec<T> = parse::parse_reader(bytes.as_slice(), path)?;

    let kind = T::KIND;
    info!(%kind, path = %path.display(), rows = rows.len(), %sha256, "Parsed extract");
    let source = SourceFile {
        kind,
        path: path.to_path_buf(),
        sha256,
        rows: rows.len(),
    };
    Ok((rows, source))
}

/// Locate and parse every extract in `dir` without touching storage.
pub fn prepare(dir: &Path) -> Result<PreparedSnapshot, IngestError> {
    let mut prepared = PreparedSnapshot::default();

    for kind in EntityKind::ALL {
        let Some(path) = locate::locate_latest(dir, kind)? else {
            warn!(%kind, dir = %dir.display(), "No extract found; table left untouched");
            continue;
        };

        match kind {
            EntityKind::Household => {
                let (rows, source) = load(&path)?;
                prepared.snapshot.households = Some(rows);
                prepared.sources.push(source);
            }
            EntityKind::Product => {
                let (rows, source) = load(&path)?;
                prepared.snapshot.products = Some(rows);
                prepared.sources.push(source);
            }
            EntityKind::Transaction => {
                let (rows, source) = load(&path)?;
                prepared.snapshot.transactions = Some(rows);
                prepared.sources.push(source);
            }
        }
    }

    Ok(prepared)
}

/// Runs ingestion against a reference store.
#[derive(Clone)]
pub struct IngestPipeline {
    store: Arc<dyn ReferenceStore>,
}

impl IngestPipeline {
    pub fn new(store: Arc<dyn ReferenceStore>) -> Self {
        Self { store }
    }

    pub async fn run(&self, dir: &Path) -> Result<IngestReport, IngestError> {
        let owned_dir = dir.to_path_buf();
        let prepared = tokio::task::spawn_blocking(move || prepare(&owned_dir))
            .await?
            .inspect_err(|e| error!("Ingest from {} aborted before storage: {}", dir.display(), e))?;

        if prepared.snapshot.is_empty() {
            return Ok(IngestReport {
                sources: prepared.sources,
                outcome: ReplaceOutcome::default(),
            });
        }

        let outcome = self
            .store
            .replace_snapshot(prepared.snapshot)
            .await
            .inspect_err(|e| error!("Snapshot replace rolled back: {}", e))?;

        if outcome.orphan_households > 0 || outcome.orphan_products > 0 {
            warn!(
                orphan_households = outcome.orphan_households,
                orphan_products = outcome.orphan_products,
                "Transactions reference rows missing from the reference tables"
            );
        }

        Ok(IngestReport {
            sources: prepared.sources,
            outcome,
        })
    }
}
