use serde::{Deserialize, Serialize};

/// Outbound fetch and caching settings for `GET /api/preview`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Outbound fetch timeout in seconds (default: 5)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept")]
    pub accept: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// HTML beyond this many bytes is not parsed (default: 1 MiB)
    #[serde(default = "default_max_html_bytes")]
    pub max_html_bytes: usize,
    /// Cached previews kept by the gateway; 0 disables the cache (default: 256)
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Reject loopback, private and link-local targets (default: true)
    #[serde(default = "default_true")]
    pub block_private_hosts: bool,
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36"
        .into()
}

fn default_accept() -> String {
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".into()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.5".into()
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_html_bytes() -> usize {
    1024 * 1024
}

fn default_cache_capacity() -> usize {
    256
}

fn default_true() -> bool {
    true
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            accept: default_accept(),
            accept_language: default_accept_language(),
            max_redirects: default_max_redirects(),
            max_html_bytes: default_max_html_bytes(),
            cache_capacity: default_cache_capacity(),
            block_private_hosts: true,
        }
    }
}
