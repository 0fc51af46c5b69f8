use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

/// Runtime configuration for the CLI.
///
/// Sources, in order: the `--token` flag, then environment variables
/// (`SLACK_API_TOKEN`, `SLACK_TOKEN_FILE`, `SMV_*`). A `.env` file is
/// honored but never overrides variables already set.
#[derive(Clone, Debug)]
pub struct Config {
    pub token: String,
    /// Pause between replayed messages during a mirror.
    pub post_delay: Duration,
    /// Messages requested per history call.
    pub history_limit: u32,
    /// Where archive files land; defaults to the working directory.
    pub archive_dir: PathBuf,
}

impl Config {
    pub fn load(token_flag: Option<String>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let direct = token_flag.or_else(|| env_str("SLACK_API_TOKEN"));
        let token_file = env_str("SLACK_TOKEN_FILE").map(PathBuf::from);
        let token = resolve_token(direct.as_deref(), token_file.as_deref())?;

        let post_delay = Duration::from_millis(env_u64("SMV_POST_DELAY_MS").unwrap_or(500));
        let history_limit = env_u32("SMV_HISTORY_LIMIT").unwrap_or(1000);
        let archive_dir = env_str("SMV_ARCHIVE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            token,
            post_delay,
            history_limit,
            archive_dir,
        })
    }
}

/// Resolve the API credential.
///
/// A direct value wins and is returned verbatim; otherwise the named
/// file's contents are read and trimmed. Either way the credential must
/// be non-empty.
pub fn resolve_token(direct: Option<&str>, file: Option<&Path>) -> Result<String> {
    let token = if let Some(value) = direct {
        value.to_string()
    } else if let Some(path) = file {
        fs::read_to_string(path)?.trim().to_string()
    } else {
        return Err(Error::Config(
            "no credential source provided: pass --token, or set SLACK_API_TOKEN or SLACK_TOKEN_FILE"
                .to_string(),
        ));
    };

    if token.trim().is_empty() {
        return Err(Error::Config("credential is empty".to_string()));
    }
    Ok(token)
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_u32(key: &str) -> Option<u32> {
    env_str(key).and_then(|s| s.trim().parse::<u32>().ok())
}
