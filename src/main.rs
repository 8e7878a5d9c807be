use clap::Parser;
use std::process::ExitCode;
use tracing::error;

mod cli;
mod commands;
mod defaults;
mod error;
mod logging;
mod migrate;
mod parser;
mod record;
mod store;

use crate::cli::Cli;
use crate::defaults::Defaults;
use crate::error::TransferError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match commands::transfer::run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            let code = e
                .downcast_ref::<TransferError>()
                .map_or(Defaults::EXIT_FAILURE, TransferError::exit_code);
            ExitCode::from(code)
        }
    }
}
