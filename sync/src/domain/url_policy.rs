//! Source URL policy: shape checks and address classification.
//!
//! The network half of the check (resolving the host and feeding the
//! answers to [`check_resolved`]) lives in the application layer so it can
//! run against a fake resolver in tests.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use url::Url;

use crate::domain::error::{
    GitSyncError, GitSyncErrorCode, SyncOutcome, host_not_allowed, invalid_port,
    invalid_protocol, invalid_url,
};

/// The only scheme clone URLs may use.
pub const REQUIRED_SCHEME: &str = "https";

/// Validate everything about `raw` that does not need the network.
///
/// Checks run in a fixed order and the first failure wins:
/// parse, scheme, port, host allow-list, embedded credentials.
///
/// # Errors
///
/// `INVALID_URL`, `INVALID_PROTOCOL`, `INVALID_PORT` or `HOST_NOT_ALLOWED`.
pub fn check_url_shape(raw: &str, allowed_hosts: &[String]) -> SyncOutcome<Url> {
    let url = Url::parse(raw.trim()).map_err(invalid_url)?;

    if url.scheme() != REQUIRED_SCHEME {
        return Err(invalid_protocol(url.scheme()));
    }

    // `Url::port` is `None` for both an absent port and an explicit default.
    if let Some(port) = url.port() {
        return Err(invalid_port(port));
    }

    let host = url.host_str().unwrap_or_default();
    if !is_allowed_host(host, allowed_hosts) {
        return Err(host_not_allowed(host));
    }

    if !url.username().is_empty() || url.password().is_some() {
        return Err(invalid_url("embedded credentials are not allowed"));
    }

    Ok(url)
}

/// Exact, case-insensitive hostname match. No suffix or wildcard matching.
#[must_use]
pub fn is_allowed_host(host: &str, allowed_hosts: &[String]) -> bool {
    !host.is_empty()
        && allowed_hosts
            .iter()
            .any(|allowed| allowed.trim().eq_ignore_ascii_case(host))
}

/// Returns the name of the private, loopback or link-local range `ip`
/// falls in, or `None` if the address is publicly routable for our purposes.
#[must_use]
pub fn blocked_range(ip: IpAddr) -> Option<&'static str> {
    match ip {
        IpAddr::V4(v4) => blocked_v4(v4),
        IpAddr::V6(v6) => blocked_v6(v6),
    }
}

fn blocked_v4(ip: Ipv4Addr) -> Option<&'static str> {
    match ip.octets() {
        [10, ..] => Some("10.0.0.0/8"),
        [172, b, ..] if (16..=31).contains(&b) => Some("172.16.0.0/12"),
        [192, 168, ..] => Some("192.168.0.0/16"),
        [127, ..] => Some("127.0.0.0/8"),
        [169, 254, ..] => Some("169.254.0.0/16"),
        [0, ..] => Some("0.0.0.0/8"),
        _ => None,
    }
}

fn blocked_v6(ip: Ipv6Addr) -> Option<&'static str> {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return blocked_v4(v4);
    }
    if ip == Ipv6Addr::LOCALHOST {
        return Some("::1/128");
    }
    let first = ip.segments()[0];
    if first & 0xfe00 == 0xfc00 {
        return Some("fc00::/7");
    }
    if first & 0xffc0 == 0xfe80 {
        return Some("fe80::/10");
    }
    None
}

/// Decide whether the live DNS answers for `host` are safe to clone from.
///
/// # Errors
///
/// `DNS_RESOLUTION_FAILED` when there are no answers, `SSRF_BLOCKED` when
/// any answer is in a blocked range.
pub fn check_resolved(host: &str, addrs: &[IpAddr]) -> SyncOutcome<()> {
    if addrs.is_empty() {
        return Err(GitSyncError::new(
            GitSyncErrorCode::DnsResolutionFailed,
            format!("Host '{host}' did not resolve to any address"),
        ));
    }
    for addr in addrs {
        if let Some(range) = blocked_range(*addr) {
            return Err(GitSyncError::new(
                GitSyncErrorCode::SsrfBlocked,
                format!("Host '{host}' resolves to {addr} in blocked range {range}"),
            ));
        }
    }
    Ok(())
}
