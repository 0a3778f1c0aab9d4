//! Configuration loading and management

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

/// Assistant configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// How long one listen call waits for a command before giving up
    pub listen_timeout: Duration,

    /// Upper bound on the length of a single recognized phrase
    pub phrase_limit: Duration,

    /// Pixels scrolled per "scroll up"/"scroll down" command
    pub scroll_step_px: i64,

    /// Directory for runtime data (dictated documents land here)
    pub data_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        let home = std::env::var("HOME")?;
        let data_dir = PathBuf::from(&home)
            .join(".local")
            .join("share")
            .join("aural");

        Ok(Self {
            listen_timeout: Duration::from_secs(env_u64("AURAL_LISTEN_TIMEOUT_SECS", 5)),
            phrase_limit: Duration::from_secs(env_u64("AURAL_PHRASE_LIMIT_SECS", 8)),
            scroll_step_px: env_u64("AURAL_SCROLL_STEP_PX", 500) as i64,
            data_dir,
        })
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
