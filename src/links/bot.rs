//! Heuristic classification of agent strings as automated traffic.

const BOT_MARKERS: &[&str] = &[
    "bot",
    "crawler",
    "crawl",
    "spider",
    "slurp",
    "scraper",
    "headless",
    "phantomjs",
    "facebookexternalhit",
    "embedly",
    "preview",
    "curl/",
    "wget/",
    "python-requests",
    "python-urllib",
    "go-http-client",
    "java/",
    "okhttp",
    "axios/",
    "node-fetch",
    "httpclient",
    "libwww-perl",
];

/// Whether `agent` looks like a bot or crawler. Empty agents are not bots.
pub fn is_bot(agent: &str) -> bool {
    let agent = agent.trim().to_ascii_lowercase();
    if agent.is_empty() {
        return false;
    }
    BOT_MARKERS.iter().any(|marker| agent.contains(marker))
}
