use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::cli::Cli;
use crate::migrate::{run_migration, MigrationReport, OutcomeStatus, TransferOptions};
use crate::store::CredstashCli;

/// Validates the arguments, runs the transfer and reports on it.
pub async fn run(cli: &Cli) -> Result<()> {
    cli.validate()?;

    let store = CredstashCli::new(&cli.credstash_bin, cli.region.clone());
    let opts = TransferOptions {
        from: cli.from.clone(),
        to: cli.to.clone(),
        dry_run: cli.dry_run,
    };

    let report = run_migration(&store, &opts).await?;
    println!("{}", summary(&report));

    if let Some(path) = &cli.report {
        emit(&report, path)?;
    }
    Ok(())
}

pub fn summary(report: &MigrationReport) -> String {
    let total = report.outcomes.len();
    if report.dry_run {
        return format!(
            "Dry run: {} of {} records would be copied from {} to {} ({} unparsed lines)",
            report.count(OutcomeStatus::DryRun),
            total,
            report.from,
            report.to,
            report.rejected_lines.len()
        );
    }
    format!(
        "✓ Migrated {} of {} records from {} to {} ({} put failures, {} unparsed lines)",
        report.count(OutcomeStatus::Migrated),
        total,
        report.from,
        report.to,
        report.count(OutcomeStatus::PutFailed),
        report.rejected_lines.len()
    )
}

pub fn emit(report: &MigrationReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok();
    }
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    println!("✓ Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate::RecordOutcome;
    use uuid::Uuid;

    fn report(dry_run: bool, statuses: &[OutcomeStatus]) -> MigrationReport {
        MigrationReport {
            run_id: Uuid::new_v4(),
            started_at: String::new(),
            from: "staging".into(),
            to: "prod".into(),
            dry_run,
            rejected_lines: vec![4],
            outcomes: statuses
                .iter()
                .enumerate()
                .map(|(i, status)| RecordOutcome {
                    key: format!("k{i}"),
                    status: *status,
                    deleted: true,
                    message: None,
                })
                .collect(),
        }
    }

    #[test]
    fn summary_counts_failures() {
        let r = report(false, &[OutcomeStatus::Migrated, OutcomeStatus::PutFailed]);
        assert_eq!(
            summary(&r),
            "✓ Migrated 1 of 2 records from staging to prod (1 put failures, 1 unparsed lines)"
        );
    }

    #[test]
    fn summary_for_dry_run() {
        let r = report(true, &[OutcomeStatus::DryRun]);
        assert!(summary(&r).starts_with("Dry run: 1 of 1 records"));
    }

    #[test]
    fn emit_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/run.json");
        emit(&report(false, &[OutcomeStatus::Migrated]), &path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["to"], "prod");
        assert_eq!(written["outcomes"][0]["key"], "k0");
    }
}
