//! Access to the external credential store.
//!
//! The workflow only sees [`CredentialStore`]. [`CredstashCli`] backs it
//! with one `credstash` subprocess per call.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::defaults::Defaults;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("exited with status {}{}", fmt_status(.status), fmt_stderr(.stderr))]
    NonZeroExit { status: Option<i32>, stderr: String },
}

fn fmt_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

fn fmt_stderr(stderr: &str) -> String {
    match stderr.trim() {
        "" => String::new(),
        text => format!(": {text}"),
    }
}

/// The three calls a transfer needs. Each returns the command's stdout.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Dump every `"key": "value"` pair stored in `env`.
    async fn enumerate(&self, env: &str) -> Result<Vec<u8>, StoreError>;

    async fn delete(&self, env: &str, key: &[u8]) -> Result<Vec<u8>, StoreError>;

    async fn put(&self, env: &str, key: &[u8], value: &[u8]) -> Result<Vec<u8>, StoreError>;
}

/// Runs `credstash [-r region] -t <env> <action> ...`.
#[derive(Clone, Debug)]
pub struct CredstashCli {
    program: PathBuf,
    region: Option<String>,
}

impl CredstashCli {
    pub fn new(program: impl Into<PathBuf>, region: Option<String>) -> Self {
        Self {
            program: program.into(),
            region,
        }
    }

    fn base_args(&self, env: &str) -> Vec<OsString> {
        let mut args = Vec::with_capacity(7);
        if let Some(region) = &self.region {
            args.push(Defaults::ARG_REGION.into());
            args.push(region.into());
        }
        args.push(Defaults::ARG_TABLE.into());
        args.push(env.into());
        args
    }

    /// Keys and values follow `--` so a leading `-` is never read as an option.
    fn command_args(&self, env: &str, action: &str, operands: &[&[u8]]) -> Vec<OsString> {
        let mut args = self.base_args(env);
        args.push(action.into());
        if !operands.is_empty() {
            args.push(Defaults::END_OF_OPTIONS.into());
            args.extend(operands.iter().map(|op| os_arg(op)));
        }
        args
    }

    async fn run(&self, env: &str, action: &str, operands: &[&[u8]]) -> Result<Vec<u8>, StoreError> {
        let program = self.program.display().to_string();
        debug!(%program, env, action, "invoking store command");

        let args = self.command_args(env, action, operands);

        let Output {
            status,
            stdout,
            stderr,
        } = Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| StoreError::Spawn { program, source })?;

        if !status.success() {
            return Err(StoreError::NonZeroExit {
                status: status.code(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            });
        }
        Ok(stdout)
    }
}

#[async_trait]
impl CredentialStore for CredstashCli {
    async fn enumerate(&self, env: &str) -> Result<Vec<u8>, StoreError> {
        self.run(env, Defaults::ACTION_GETALL, &[]).await
    }

    async fn delete(&self, env: &str, key: &[u8]) -> Result<Vec<u8>, StoreError> {
        self.run(env, Defaults::ACTION_DELETE, &[key]).await
    }

    async fn put(&self, env: &str, key: &[u8], value: &[u8]) -> Result<Vec<u8>, StoreError> {
        self.run(env, Defaults::ACTION_PUT, &[key, value]).await
    }
}

#[cfg(unix)]
fn os_arg(bytes: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStrExt;
    std::ffi::OsStr::from_bytes(bytes).to_os_string()
}

#[cfg(not(unix))]
fn os_arg(bytes: &[u8]) -> OsString {
    String::from_utf8_lossy(bytes).into_owned().into()
}
