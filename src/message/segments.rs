use regex::Regex;
use serde::Serialize;
use std::ops::Range;
use std::sync::LazyLock;

/// Language recorded for fences that carry no tag.
pub const DEFAULT_LANGUAGE: &str = "plaintext";

/// Opening fence, optional ASCII word-character language tag, newline,
/// lazily-matched body, closing fence.
static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```([A-Za-z0-9_]+)?\n(.*?)```").expect("fence pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Text,
    Code,
}

/// One contiguous piece of a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Byte range of the untrimmed, fenced source text.
    #[serde(skip)]
    pub span: Range<usize>,
}

impl Segment {
    fn text(source: &str, span: Range<usize>) -> Self {
        Self {
            kind: SegmentKind::Text,
            content: source[span.clone()].to_string(),
            language: None,
            span,
        }
    }

    fn code(language: Option<&str>, body: &str, span: Range<usize>) -> Self {
        Self {
            kind: SegmentKind::Code,
            content: body.trim().to_string(),
            language: Some(language.unwrap_or(DEFAULT_LANGUAGE).to_string()),
            span,
        }
    }

    pub fn is_code(&self) -> bool {
        self.kind == SegmentKind::Code
    }

    /// The exact slice of `source` this segment was scanned from.
    pub fn original<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.clone()]
    }
}

/// Split a message into text and fenced-code segments in source order.
///
/// Never fails: an opening fence without a closing one matches nothing and
/// stays inside the surrounding text.
pub fn scan_segments(message: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for captures in FENCE.captures_iter(message) {
        let Some(fence) = captures.get(0) else {
            continue;
        };
        if fence.start() > cursor {
            segments.push(Segment::text(message, cursor..fence.start()));
        }
        let language = captures.get(1).map(|m| m.as_str());
        let body = captures.get(2).map_or("", |m| m.as_str());
        segments.push(Segment::code(language, body, fence.range()));
        cursor = fence.end();
    }

    if cursor < message.len() {
        segments.push(Segment::text(message, cursor..message.len()));
    }

    segments
}

/// Rebuild the scanned message from segment spans.
pub fn reconstruct(message: &str, segments: &[Segment]) -> String {
    segments.iter().map(|s| s.original(message)).collect()
}
