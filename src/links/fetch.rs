use super::bot::is_bot;
use super::guard::{ensure_public_target, is_internal_literal_host};
use super::metadata::extract_metadata;
use super::types::PreviewOutcome;
use crate::config::PreviewConfig;
use crate::error::PreviewError;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::redirect::Policy;
use std::error::Error as _;
use std::time::Duration;
use url::Url;

/// Validate a caller-supplied preview target.
pub fn parse_target(raw: &str) -> Result<Url, PreviewError> {
    let url = Url::parse(raw.trim()).map_err(|e| PreviewError::InvalidUrl(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(PreviewError::InvalidUrl(format!(
            "unsupported scheme '{other}'"
        ))),
    }
}

fn is_html(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html"))
}

/// Why the redirect to `next` must not be followed, if it must not.
/// `previous` counts the URLs already requested, the original included.
fn redirect_refusal(
    next: &Url,
    previous: usize,
    max_redirects: usize,
    block_private_hosts: bool,
) -> Option<PreviewError> {
    if previous > max_redirects {
        return Some(PreviewError::Fetch(format!(
            "too many redirects (limit {max_redirects})"
        )));
    }
    match next.host_str() {
        Some(host) if block_private_hosts && is_internal_literal_host(host) => {
            Some(PreviewError::PrivateHost(host.to_string()))
        }
        _ => None,
    }
}

fn redirect_policy(max_redirects: usize, block_private_hosts: bool) -> Policy {
    Policy::custom(move |attempt| {
        match redirect_refusal(
            attempt.url(),
            attempt.previous().len(),
            max_redirects,
            block_private_hosts,
        ) {
            Some(refusal) => attempt.error(refusal),
            None => attempt.follow(),
        }
    })
}

/// Surfaces a refused redirect as the `PreviewError` the policy raised.
fn send_error(error: &reqwest::Error) -> PreviewError {
    match error
        .source()
        .and_then(|source| source.downcast_ref::<PreviewError>())
    {
        Some(PreviewError::PrivateHost(host)) => PreviewError::PrivateHost(host.clone()),
        Some(PreviewError::Fetch(reason)) => PreviewError::Fetch(reason.clone()),
        _ => PreviewError::Fetch(error.to_string()),
    }
}

/// Drop a multi-byte character cut in half by the body cap.
fn trim_partial_char(body: &mut Vec<u8>) {
    let tail_start = body.len().saturating_sub(4);
    let Some(lead) = (tail_start..body.len()).rev().find(|&i| body[i] & 0xc0 != 0x80) else {
        return;
    };
    let width = match body[lead] {
        b if b >= 0xf0 => 4,
        b if b >= 0xe0 => 3,
        b if b >= 0xc0 => 2,
        _ => 1,
    };
    if body.len() - lead < width {
        body.truncate(lead);
    }
}

/// Outbound fetcher for link previews.
///
/// One GET per call with a fixed header set and timeout; no retries.
#[derive(Debug, Clone)]
pub struct PreviewFetcher {
    client: reqwest::Client,
    max_html_bytes: usize,
    block_private_hosts: bool,
}

impl PreviewFetcher {
    pub fn new(config: &PreviewConfig) -> Result<Self, PreviewError> {
        let header = |value: &str| {
            HeaderValue::from_str(value).map_err(|e| PreviewError::Client(e.to_string()))
        };
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header(&config.accept)?);
        headers.insert(ACCEPT_LANGUAGE, header(&config.accept_language)?);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .redirect(redirect_policy(
                config.max_redirects,
                config.block_private_hosts,
            ))
            .build()
            .map_err(|e| PreviewError::Client(e.to_string()))?;

        Ok(Self {
            client,
            max_html_bytes: config.max_html_bytes,
            block_private_hosts: config.block_private_hosts,
        })
    }

    pub async fn fetch(&self, url: &Url) -> Result<PreviewOutcome, PreviewError> {
        if self.block_private_hosts {
            ensure_public_target(url).await?;
        }
        self.fetch_checked(url).await
    }

    /// Fetch a target whose host already passed the private-host check.
    /// Redirect hops are still checked by the client's redirect policy.
    async fn fetch_checked(&self, url: &Url) -> Result<PreviewOutcome, PreviewError> {
        let mut response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| send_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PreviewError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        if !is_html(content_type) {
            tracing::debug!(url = %url, content_type, "skipping non-HTML preview target");
            return Ok(PreviewOutcome::NotHtml);
        }

        // Inspects the agent reported by the upstream response, not the caller's.
        let upstream_agent = response
            .headers()
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if is_bot(upstream_agent) {
            return Ok(PreviewOutcome::BotBlocked);
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| PreviewError::Body(e.to_string()))?
        {
            body.extend_from_slice(&chunk);
            if body.len() >= self.max_html_bytes {
                body.truncate(self.max_html_bytes);
                trim_partial_char(&mut body);
                break;
            }
        }
        let html = String::from_utf8_lossy(&body);

        Ok(PreviewOutcome::Html(extract_metadata(&html, url.as_str())))
    }
}
