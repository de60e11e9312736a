use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use log::warn;

use crate::blockchain::{DEFAULT_DIFFICULTY, DIFF_MAX, DIFF_MIN};

/// Runtime settings, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the per-port snapshot and node id files.
    pub storage_dir: PathBuf,
    /// Leading hex zeros required of a proof.
    pub difficulty: u32,
    /// Give up on a mining attempt after this long. `None` waits forever.
    pub mine_timeout: Option<Duration>,
    /// Per-peer timeout when fetching chains during resolve.
    pub peer_timeout: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            storage_dir: PathBuf::from("./storage"),
            difficulty: DEFAULT_DIFFICULTY,
            mine_timeout: None,
            peer_timeout: Duration::from_secs(5),
        }
    }
}

impl NodeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Missing or unparseable values
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| parse::<u64>(&v));

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|v| parse(&v))
                .unwrap_or(defaults.port),
            storage_dir: lookup("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            difficulty: lookup("DIFFICULTY")
                .and_then(|v| parse(&v))
                .and_then(checked_difficulty)
                .unwrap_or(defaults.difficulty),
            mine_timeout: parsed("MINE_TIMEOUT_SECS")
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            peer_timeout: parsed("PEER_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.peer_timeout),
        }
    }
}

fn parse<T: FromStr>(value: &str) -> Option<T> {
    value.trim().parse().ok()
}

fn checked_difficulty(difficulty: u32) -> Option<u32> {
    if (DIFF_MIN..=DIFF_MAX).contains(&difficulty) {
        Some(difficulty)
    } else {
        warn!(
            "DIFFICULTY={difficulty} outside {DIFF_MIN}..={DIFF_MAX}, using {DEFAULT_DIFFICULTY}"
        );
        None
    }
}
