//! Keeps the preview fetcher away from loopback, private and metadata hosts.

use crate::error::PreviewError;
use std::net::{IpAddr, Ipv4Addr};
use url::Url;

fn is_internal_v4(v4: &Ipv4Addr) -> bool {
    let [first, second, ..] = v4.octets();
    v4.is_loopback()
        || v4.is_private()
        || v4.is_link_local()
        || v4.is_broadcast()
        // 0.0.0.0/8 "this network"
        || first == 0
        // 100.64.0.0/10 carrier-grade NAT
        || (first == 100 && (second & 0xc0) == 64)
}

/// Loopback, RFC 1918, carrier-grade NAT, link-local (cloud metadata
/// included), unique-local and unspecified addresses.
pub fn is_internal_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_internal_v4(v4),
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                || (first & 0xfe00) == 0xfc00
                || (first & 0xffc0) == 0xfe80
                || v6.to_ipv4_mapped().is_some_and(|v4| is_internal_v4(&v4))
        }
    }
}

fn bare_host(host: &str) -> &str {
    host.strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host)
}

/// `localhost`, `*.localhost`, or an IP literal in an internal range.
///
/// No DNS lookup; this is the check applied to every redirect hop.
pub fn is_internal_literal_host(host: &str) -> bool {
    let bare = bare_host(host);
    if bare.eq_ignore_ascii_case("localhost")
        || bare.to_ascii_lowercase().ends_with(".localhost")
    {
        return true;
    }
    bare.parse::<IpAddr>().is_ok_and(|ip| is_internal_ip(&ip))
}

/// Reject a preview target whose host is, or resolves to, an internal address.
pub async fn ensure_public_target(url: &Url) -> Result<(), PreviewError> {
    let host = url
        .host_str()
        .ok_or_else(|| PreviewError::InvalidUrl(format!("{url} has no host")))?;
    if is_internal_literal_host(host) {
        return Err(PreviewError::PrivateHost(host.to_string()));
    }
    let bare = bare_host(host);
    if bare.parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    let port = url.port_or_known_default().unwrap_or(443);
    // Resolution failures surface later as a fetch error.
    if let Ok(addrs) = tokio::net::lookup_host((bare, port)).await {
        for addr in addrs {
            if is_internal_ip(&addr.ip()) {
                return Err(PreviewError::PrivateHost(format!(
                    "{host} resolves to {}",
                    addr.ip()
                )));
            }
        }
    }
    Ok(())
}
