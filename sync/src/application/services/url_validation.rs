//! Source URL validation, including the live DNS
//! re-check that makes the host allow-list meaningful.

use url::Url;

use crate::application::ports::HostResolver;
use crate::domain::error::{GitSyncError, GitSyncErrorCode, SyncOutcome};
use crate::domain::url_policy::{check_resolved, check_url_shape};

/// Validate `raw` for cloning.
///
/// Shape checks run first so a disallowed URL never causes a DNS query.
/// The hostname is then resolved at call time and every answer must be
/// outside the private, loopback and link-local ranges: DNS answers are
/// live input, not trusted metadata.
///
/// # Errors
///
/// Any URL-policy code, `SSRF_BLOCKED` or `DNS_RESOLUTION_FAILED`.
pub async fn validate_source_url(
    raw: &str,
    allowed_hosts: &[String],
    resolver: &impl HostResolver,
) -> SyncOutcome<Url> {
    let url = check_url_shape(raw, allowed_hosts)?;
    let host = url.host_str().unwrap_or_default().to_string();

    let addrs = resolver.resolve(&host).await.map_err(|e| {
        GitSyncError::new(
            GitSyncErrorCode::DnsResolutionFailed,
            format!("Failed to resolve '{host}': {e:#}"),
        )
    })?;
    check_resolved(&host, &addrs)?;

    tracing::debug!(host = %host, addresses = addrs.len(), "source url validated");
    Ok(url)
}
