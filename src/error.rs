use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `chatline`.
///
/// Library callers can match on these to decide how to respond; application
/// plumbing keeps using `anyhow::Result` for context chains.
#[derive(Debug, Error)]
pub enum ChatlineError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Link previews ───────────────────────────────────────────────────
    #[error("preview: {0}")]
    Preview(#[from] PreviewError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),
}

// ─── Preview errors ─────────────────────────────────────────────────────────

/// Everything that can go wrong while producing a link preview.
///
/// The gateway reports every variant the same way (`400 {error}`).
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Refusing to preview private or internal host: {0}")]
    PrivateHost(String),

    #[error("Failed to fetch URL: {0}")]
    Fetch(String),

    #[error("Failed to fetch URL: upstream responded with status {status}")]
    UpstreamStatus { status: u16 },

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, ChatlineError>;
