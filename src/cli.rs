use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::defaults::Defaults;
use crate::error::TransferError;

/// Copy every credstash secret from one environment to another
#[derive(Parser, Debug)]
#[command(version, about = "Copy credstash secrets between environments")]
pub struct Cli {
    /// Destination environment (credstash table) to write into
    #[arg(long, value_name = "ENV")]
    pub to: String,

    /// Source environment (credstash table) to read from
    #[arg(long, value_name = "ENV")]
    pub from: String,

    /// credstash executable to invoke
    #[arg(long, env = Defaults::STORE_BIN_ENV, default_value = Defaults::STORE_BIN)]
    pub credstash_bin: PathBuf,

    /// AWS region passed to credstash as `-r`
    #[arg(long)]
    pub region: Option<String>,

    /// Fetch and parse the source only; do not touch the destination
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Optional path to write a JSON run report (keys and outcomes, no values)
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Checks that clap cannot express.
    pub fn validate(&self) -> Result<(), TransferError> {
        if self.to.is_empty() || self.from.is_empty() {
            return Err(TransferError::InvalidArguments(
                "--to and --from must not be empty".into(),
            ));
        }
        if self.to == self.from {
            return Err(TransferError::InvalidArguments(format!(
                "--to and --from both name {}",
                self.to
            )));
        }
        Ok(())
    }
}
