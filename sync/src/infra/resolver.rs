//! DNS infrastructure. Implements `HostResolver` with the system resolver.

use std::net::IpAddr;

use anyhow::{Context, Result};

use crate::application::ports::HostResolver;

/// Production resolver backed by `tokio::net::lookup_host`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioResolver;

impl HostResolver for TokioResolver {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 443))
            .await
            .with_context(|| format!("looking up {host}"))?;
        let mut ips: Vec<IpAddr> = addrs.map(|addr| addr.ip()).collect();
        ips.sort_unstable();
        ips.dedup();
        Ok(ips)
    }
}
