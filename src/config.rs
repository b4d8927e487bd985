//! Configuration passed explicitly into the API client, cache and pipeline.

use std::path::PathBuf;
use std::time::Duration;

use crate::pacing::PacingPolicy;

pub const DEFAULT_API_BASE: &str = "https://weread.qq.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";

/// Settings for a book download operation.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Delay inserted between chapter fetches.
    pub pacing: PacingPolicy,
    /// Directory the default output filename is placed in.
    pub out_dir: PathBuf,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            pacing: PacingPolicy::CHAPTER,
            out_dir: PathBuf::from("."),
        }
    }
}

impl DownloadConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_pacing(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = pacing;
        self
    }

    #[must_use]
    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }
}

/// Settings for the HTTP client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Settings for the on-disk response cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub path: PathBuf,
    pub ttl: Duration,
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        let cache_dir = dirs::cache_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: cache_dir.join("shelf2html").join("cache.json"),
            ttl: Duration::from_secs(60 * 60),
            enabled: true,
        }
    }
}
