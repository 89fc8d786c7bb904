pub mod bot;
pub mod cache;
pub mod detector;
pub mod fetch;
pub mod guard;
pub mod metadata;
pub mod types;

pub use bot::is_bot;
pub use cache::PreviewCache;
pub use detector::detect_links;
pub use fetch::{PreviewFetcher, parse_target};
pub use metadata::extract_metadata;
pub use types::{CachedPreview, DetectedLink, LinkMetadata, PreviewBody, PreviewOutcome};
