//! Single-attempt reachability probes.
//!
//! Nothing in here returns an error: every transport fault, DNS failure or
//! timeout is folded into a non-online [`ProbeOutcome`].

use async_trait::async_trait;
use hickory_resolver::config::ResolverConfig;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::TokioResolver;
use std::net::IpAddr;
use std::time::Duration;
use surge_ping::{Client as PingClient, Config as PingConfig, PingIdentifier, PingSequence, ICMP};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::models::ProbeOutcome;

const PING_PAYLOAD: [u8; 56] = [0u8; 56];

#[async_trait]
pub trait Prober: Send + Sync {
    /// One ICMP echo; online iff a reply arrives within `timeout`.
    async fn ping(&self, address: &str, timeout: Duration) -> ProbeOutcome;

    /// One HEAD request; online iff the final status is in `200..400`.
    async fn http(&self, url: &str, timeout: Duration) -> ProbeOutcome;
}

/// Maps an HTTP status code to an outcome. Redirects count as online,
/// informational codes do not.
pub fn classify_status(code: u16) -> ProbeOutcome {
    if (200..400).contains(&code) {
        ProbeOutcome::Online
    } else {
        ProbeOutcome::Failed { reason: format!("HTTP {}", code) }
    }
}

pub struct NetProber {
    icmp_v4: Option<PingClient>,
    icmp_v6: Option<PingClient>,
    http_client: reqwest::Client,
    dns_resolver: TokioResolver,
}

impl NetProber {
    /// Must be called inside a tokio runtime. A missing ICMP socket is not
    /// fatal: pings then report `Errored` for every target.
    pub fn new() -> Self {
        let icmp_v4 = PingClient::new(&PingConfig::default())
            .map_err(|e| warn!("ICMPv4 socket unavailable, pings will report offline: {}", e))
            .ok();
        let icmp_v6 = PingClient::new(&PingConfig::builder().kind(ICMP::V6).build())
            .map_err(|e| debug!("ICMPv6 socket unavailable: {}", e))
            .ok();

        let dns_resolver = match TokioResolver::builder_tokio() {
            Ok(builder) => builder.build(),
            Err(e) => {
                warn!("System DNS config unreadable ({}), falling back to Cloudflare", e);
                TokioResolver::builder_with_config(
                    ResolverConfig::cloudflare(),
                    TokioConnectionProvider::default(),
                )
                .build()
            }
        };

        Self {
            icmp_v4,
            icmp_v6,
            http_client: reqwest::Client::new(),
            dns_resolver,
        }
    }

    async fn resolve(&self, address: &str) -> Result<IpAddr, String> {
        if let Ok(ip) = address.parse::<IpAddr>() { return Ok(ip); }
        match self.dns_resolver.lookup_ip(address).await {
            Ok(lookup) => lookup.iter().next().ok_or_else(|| "No IP Address Found".into()),
            Err(e) => Err(format!("DNS Resolution Failed: {}", e)),
        }
    }
}

#[async_trait]
impl Prober for NetProber {
    async fn ping(&self, address: &str, timeout: Duration) -> ProbeOutcome {
        let deadline = Instant::now() + timeout;

        let ip = match tokio::time::timeout_at(deadline, self.resolve(address)).await {
            Ok(Ok(ip)) => ip,
            Ok(Err(reason)) => return ProbeOutcome::Errored { reason },
            Err(_) => return ProbeOutcome::Errored { reason: "DNS Resolution Timeout".into() },
        };

        let client = match ip {
            IpAddr::V4(_) => self.icmp_v4.as_ref(),
            IpAddr::V6(_) => self.icmp_v6.as_ref(),
        };
        let Some(client) = client else {
            return ProbeOutcome::Errored { reason: "ICMP socket unavailable".into() };
        };

        let mut pinger = client.pinger(ip, PingIdentifier(rand::random())).await;
        pinger.timeout(deadline.saturating_duration_since(Instant::now()));

        match pinger.ping(PingSequence(0), &PING_PAYLOAD).await {
            Ok((_, latency)) => {
                debug!("{} replied in {:.1}ms", address, latency.as_secs_f64() * 1000.0);
                ProbeOutcome::Online
            }
            Err(e) => ProbeOutcome::Errored { reason: format!("No echo reply: {}", e) },
        }
    }

    async fn http(&self, url: &str, timeout: Duration) -> ProbeOutcome {
        match self.http_client.head(url).timeout(timeout).send().await {
            Ok(response) => classify_status(response.status().as_u16()),
            Err(e) if e.is_timeout() => ProbeOutcome::Errored { reason: "HTTP Timeout".into() },
            Err(e) => ProbeOutcome::Errored { reason: format!("HTTP Request Failed: {}", e) },
        }
    }
}
