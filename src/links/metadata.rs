use super::types::LinkMetadata;
use scraper::{Html, Selector};
use url::Url;

/// One place a metadata value may live in a document.
#[derive(Debug, Clone, Copy)]
enum MetaSource {
    /// `<meta property="..." content="...">`
    Property(&'static str),
    /// `<meta name="..." content="...">`
    Name(&'static str),
    /// Text content of the first matching element.
    ElementText(&'static str),
}

const TITLE_SOURCES: &[MetaSource] = &[
    MetaSource::Property("og:title"),
    MetaSource::Name("twitter:title"),
    MetaSource::Name("title"),
    MetaSource::ElementText("title"),
];

const DESCRIPTION_SOURCES: &[MetaSource] = &[
    MetaSource::Property("og:description"),
    MetaSource::Name("twitter:description"),
    MetaSource::Name("description"),
];

const IMAGE_SOURCES: &[MetaSource] = &[
    MetaSource::Property("og:image"),
    MetaSource::Name("twitter:image"),
    MetaSource::Name("image"),
];

impl MetaSource {
    fn lookup(self, document: &Html) -> Option<String> {
        let css = match self {
            Self::Property(key) => format!(r#"meta[property="{key}"]"#),
            Self::Name(key) => format!(r#"meta[name="{key}"]"#),
            Self::ElementText(tag) => tag.to_string(),
        };
        let selector = Selector::parse(&css).ok()?;

        document.select(&selector).find_map(|element| {
            let raw = match self {
                Self::Property(_) | Self::Name(_) => element.value().attr("content")?.to_string(),
                Self::ElementText(_) => element.text().collect::<String>(),
            };
            non_empty(&raw)
        })
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Walk `sources` in priority order and return the first non-empty value.
fn first_match(document: &Html, sources: &[MetaSource]) -> Option<String> {
    sources.iter().find_map(|source| source.lookup(document))
}

/// Make an image reference absolute against the page it came from.
///
/// Returns `None` when the reference cannot be resolved.
fn resolve_image(candidate: &str, source_url: &str) -> Option<String> {
    if let Ok(absolute) = Url::parse(candidate)
        && matches!(absolute.scheme(), "http" | "https")
    {
        return Some(candidate.to_string());
    }

    let base = Url::parse(source_url).ok()?;
    base.join(candidate).ok().map(String::from)
}

/// Extract preview metadata from a fetched HTML document.
///
/// Tolerates any input: a document with none of the known tags yields
/// all-absent fields.
pub fn extract_metadata(html: &str, source_url: &str) -> LinkMetadata {
    let document = Html::parse_document(html);

    let title = first_match(&document, TITLE_SOURCES);
    let description = first_match(&document, DESCRIPTION_SOURCES);
    let image = first_match(&document, IMAGE_SOURCES)
        .and_then(|candidate| resolve_image(&candidate, source_url));

    LinkMetadata {
        title,
        description,
        image,
        source_url: source_url.to_string(),
    }
}
