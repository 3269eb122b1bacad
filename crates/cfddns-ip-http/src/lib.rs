// # HTTP IP Discovery
//
// This crate provides the HTTP-based public IP source for cfddns.
//
// ## Architecture
//
// Queries a fixed, prioritized list of "what is my IP" endpoints, each
// expected to return the caller's IP as a trimmed plain-text body. The
// first 200 response wins; every failure (network, non-200, timeout) is
// logged and the next endpoint is tried. The whole list is attempted at
// most once per call; retry happens only via the scheduler's next tick.
//
// The body is returned as trimmed text without IP-syntax validation. The
// provider API is the authority on whether the content is acceptable.

use std::time::Duration;

use async_trait::async_trait;
use cfddns_core::error::{Error, Result};
use cfddns_core::traits::IpSource;
use tracing::{info, warn};

/// Default discovery endpoints, in priority order
pub const DEFAULT_ENDPOINTS: &[&str] = &[
    "https://ifconfig.me/ip",
    "https://api.ip.sb/ip",
    "https://ipinfo.io/ip",
];

/// Per-request timeout for discovery calls (10 seconds)
const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based public IP source
pub struct HttpIpSource {
    endpoints: Vec<String>,
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a source using the default endpoint list
    pub fn new() -> Self {
        Self::with_endpoints(DEFAULT_ENDPOINTS.iter().map(|s| s.to_string()).collect())
    }

    /// Create a source with a custom endpoint list
    ///
    /// Endpoints are tried in the given order. This constructor is mainly
    /// useful for testing purposes.
    pub fn with_endpoints(endpoints: Vec<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DISCOVERY_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self { endpoints, client }
    }
}

impl Default for HttpIpSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<String> {
        for endpoint in &self.endpoints {
            let response = match self.client.get(endpoint).send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Failed to get IP from {}: {}", endpoint, e);
                    continue;
                }
            };

            if !response.status().is_success() {
                warn!(
                    "Failed to get IP from {}: HTTP {}",
                    endpoint,
                    response.status()
                );
                continue;
            }

            match response.text().await {
                Ok(body) => {
                    let ip = body.trim().to_string();
                    info!("Successfully obtained public IP: {}", ip);
                    return Ok(ip);
                }
                Err(e) => {
                    warn!("Failed to read IP response from {}: {}", endpoint, e);
                    continue;
                }
            }
        }

        Err(Error::NoPublicIp)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
