//! Copies every record of one environment into another.
//!
//! One run: fetch the source dump, parse it, then for each record issue a
//! delete followed by a put against the destination. Only the fetch can
//! stop the run. Delete failures are expected (the key is usually new) and
//! put failures skip the record.

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;
use zeroize::Zeroize;

use crate::error::TransferError;
use crate::parser::parse_dump;
use crate::record::Record;
use crate::store::CredentialStore;

/// What to copy where.
#[derive(Clone, Debug)]
pub struct TransferOptions {
    pub from: String,
    pub to: String,
    /// Fetch and parse only; no delete/put calls.
    pub dry_run: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Migrated,
    PutFailed,
    DryRun,
}

/// Per-record result. Never carries the secret value.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOutcome {
    pub key: String,
    pub status: OutcomeStatus,
    /// Whether the pre-put delete succeeded
    pub deleted: bool,
    /// Put response on success, error text on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub run_id: Uuid,
    pub started_at: String,
    pub from: String,
    pub to: String,
    pub dry_run: bool,
    pub rejected_lines: Vec<usize>,
    pub outcomes: Vec<RecordOutcome>,
}

impl MigrationReport {
    fn new(opts: &TransferOptions) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: now_rfc3339(),
            from: opts.from.clone(),
            to: opts.to.clone(),
            dry_run: opts.dry_run,
            rejected_lines: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}

fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

/// Runs one transfer. Errors only when the source dump cannot be fetched.
pub async fn run_migration<S>(store: &S, opts: &TransferOptions) -> Result<MigrationReport, TransferError>
where
    S: CredentialStore + ?Sized,
{
    let mut report = MigrationReport::new(opts);

    let mut dump = store
        .enumerate(&opts.from)
        .await
        .map_err(|source| TransferError::FetchFailed {
            env: opts.from.clone(),
            source,
        })?;

    let parsed = parse_dump(&dump);
    dump.zeroize();

    info!(
        from = %opts.from,
        to = %opts.to,
        records = parsed.records.len(),
        rejected = parsed.rejected.len(),
        "parsed source dump"
    );
    report.rejected_lines = parsed.rejected;

    for record in &parsed.records {
        let outcome = if opts.dry_run {
            info!(key = %record.key_str(), to = %opts.to, "would migrate");
            RecordOutcome {
                key: record.key_str().into_owned(),
                status: OutcomeStatus::DryRun,
                deleted: false,
                message: None,
            }
        } else {
            migrate_record(store, &opts.to, record).await
        };
        report.outcomes.push(outcome);
    }

    Ok(report)
}

async fn migrate_record<S>(store: &S, to: &str, record: &Record) -> RecordOutcome
where
    S: CredentialStore + ?Sized,
{
    let key = record.key_str().into_owned();

    let deleted = match store.delete(to, record.key()).await {
        Ok(_) => true,
        Err(source) => {
            let cause = source.to_string();
            let err = TransferError::DeleteFailed {
                key: key.clone(),
                env: to.to_string(),
                source,
            };
            warn!(error = %err, %cause, "delete failed, putting anyway");
            false
        }
    };

    match store.put(to, record.key(), record.value()).await {
        Ok(response) => {
            let message = String::from_utf8_lossy(&response).trim_end().to_string();
            info!(key = %key, env = to, "{key} stored in: {to} message: {message}");
            RecordOutcome {
                key,
                status: OutcomeStatus::Migrated,
                deleted,
                message: Some(message),
            }
        }
        Err(source) => {
            let cause = source.to_string();
            let err = TransferError::PutFailed {
                key: key.clone(),
                env: to.to_string(),
                source,
            };
            warn!(error = %err, %cause, "record not migrated");
            RecordOutcome {
                key,
                status: OutcomeStatus::PutFailed,
                deleted,
                message: Some(format!("{err}: {cause}")),
            }
        }
    }
}
