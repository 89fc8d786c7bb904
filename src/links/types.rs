use serde::{Deserialize, Serialize};

/// Best-effort preview metadata scraped from one HTML document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Always absolute when present.
    pub image: Option<String>,
    pub source_url: String,
}

/// JSON body returned by a successful preview request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

pub const NOT_HTML_DESCRIPTION: &str = "This URL does not contain HTML content.";

impl PreviewBody {
    /// Placeholder preview for responses that are not HTML.
    pub fn not_html(url: &str) -> Self {
        Self {
            title: Some(url.to_string()),
            description: Some(NOT_HTML_DESCRIPTION.to_string()),
            image: None,
        }
    }
}

impl From<LinkMetadata> for PreviewBody {
    fn from(meta: LinkMetadata) -> Self {
        Self {
            title: meta.title,
            description: meta.description,
            image: meta.image,
        }
    }
}

/// A cached preview result. Non-HTML targets are stored as a marker so the
/// placeholder title always echoes the URL of the request being served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedPreview {
    Page(PreviewBody),
    NotHtml,
}

impl CachedPreview {
    pub fn into_body(self, requested_url: &str) -> PreviewBody {
        match self {
            Self::Page(body) => body,
            Self::NotHtml => PreviewBody::not_html(requested_url),
        }
    }
}

/// What a preview fetch produced, short of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewOutcome {
    Html(LinkMetadata),
    NotHtml,
    BotBlocked,
}

/// An http(s) URL found in the prose of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectedLink {
    pub url: String,
    /// Index of the text segment the URL was found in.
    pub segment: usize,
}
