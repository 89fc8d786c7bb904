use super::types::DetectedLink;
use crate::message::Segment;
use std::collections::HashSet;
use url::Url;

/// Find http(s) URLs in the prose of a scanned message.
///
/// Code segments are skipped. Results are deduplicated and kept in order of
/// first appearance.
pub fn detect_links(segments: &[Segment]) -> Vec<DetectedLink> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for (index, segment) in segments.iter().enumerate() {
        if segment.is_code() {
            continue;
        }
        for token in segment.content.split_whitespace() {
            let Some(url) = parse_candidate(unwrap_token(token)) else {
                continue;
            };
            let normalized = url.to_string();
            if seen.insert(normalized.clone()) {
                links.push(DetectedLink {
                    url: normalized,
                    segment: index,
                });
            }
        }
    }

    links
}

/// Peel markdown link syntax, angle brackets, parentheses and trailing
/// punctuation off a whitespace-delimited token.
fn unwrap_token(token: &str) -> &str {
    if let Some(start) = token.find("](")
        && let Some(end) = token[start + 2..].find(')')
    {
        return &token[start + 2..start + 2 + end];
    }

    let stripped = token
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(token);
    let stripped = stripped.strip_prefix('(').unwrap_or(stripped);

    stripped.trim_end_matches(['.', ',', ';', ':', '!', '?', ')', '\'', '"'])
}

fn parse_candidate(candidate: &str) -> Option<Url> {
    let url = Url::parse(candidate).ok()?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Some(url),
        _ => None,
    }
}
