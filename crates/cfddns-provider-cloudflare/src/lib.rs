// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare DNS provider implementation for cfddns.
//
// ## Responsibility Boundary
//
// The provider is isolated, stateless, and single-shot: each trait method is
// exactly one API call. The decision whether a create, update, or no-op is
// required is owned by the `Reconciler`; this crate only executes the
// operation it is asked for and reports success or failure.
//
// ## Security
//
// Credentials NEVER appear in logs; the Debug implementation redacts them.
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...&type=...`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`
//
// Every response carries the `{success, errors, result}` envelope; an HTTP
// 200 with `success: false` is still a failure.

use std::time::Duration;

use async_trait::async_trait;
use cfddns_core::config::{AuthCredential, DomainSpec};
use cfddns_core::error::{Error, ProviderOp, Result};
use cfddns_core::traits::{DnsProvider, DnsRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Cloudflare API base URL
const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// HTTP timeout for provider API calls (30 seconds)
///
/// The upstream behavior this replaces issued unbounded provider calls;
/// 30 seconds is the conservative bound chosen here.
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Cloudflare DNS provider
pub struct CloudflareProvider {
    /// Authentication credential
    /// ⚠️ NEVER log this value
    auth: AuthCredential,

    /// API base URL (overridable for tests)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the credential
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("auth", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Cloudflare API response envelope
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiError>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    message: String,
}

/// Body shared by record create and update calls
#[derive(Debug, Serialize)]
struct RecordPayload<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
    ttl: u32,
    proxied: bool,
}

impl<'a> RecordPayload<'a> {
    fn for_spec(spec: &'a DomainSpec, content: &'a str) -> Self {
        Self {
            record_type: spec.record_type.as_str(),
            name: &spec.name,
            content,
            ttl: spec.ttl,
            proxied: spec.proxied,
        }
    }
}

impl CloudflareProvider {
    /// Create a provider against the production Cloudflare API
    pub fn new(auth: AuthCredential) -> Self {
        Self::with_base_url(auth, CLOUDFLARE_API_BASE)
    }

    /// Create a provider against the given base URL
    ///
    /// This constructor is mainly useful for testing purposes.
    pub fn with_base_url(auth: AuthCredential, base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            auth,
            base_url: base_url.into(),
            client,
        }
    }

    /// Attach authentication headers to a request
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = match &self.auth {
            AuthCredential::Token { token } => request.bearer_auth(token),
            AuthCredential::ApiKey { api_key, email } => request
                .header("X-Auth-Email", email)
                .header("X-Auth-Key", api_key),
        };
        request.header("Content-Type", "application/json")
    }

    /// Send a request and decode the Cloudflare envelope
    ///
    /// Maps transport errors, non-2xx statuses, and `success: false`
    /// envelopes to a provider error for the given operation. Returns the
    /// envelope's `result`, which write responses may omit.
    async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        op: ProviderOp,
        domain: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<T>> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| Error::provider(op, domain, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(Error::provider(
                op,
                domain,
                format!("HTTP {}: {}", status, body),
            ));
        }

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| Error::provider(op, domain, format!("Failed to parse response: {}", e)))?;

        if !envelope.success {
            return Err(Error::provider(op, domain, format_errors(&envelope.errors)));
        }

        Ok(envelope.result)
    }
}

fn format_errors(errors: &[ApiError]) -> String {
    if errors.is_empty() {
        return "API reported success: false with no errors".to_string();
    }
    errors
        .iter()
        .map(|e| format!("{}: {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn find_record(&self, spec: &DomainSpec) -> Result<Option<DnsRecord>> {
        debug!(
            "Looking up DNS record: {} (type: {})",
            spec.name, spec.record_type
        );

        let url = format!(
            "{}/zones/{}/dns_records?name={}&type={}",
            self.base_url,
            spec.zone_id,
            spec.name,
            spec.record_type.as_str()
        );

        let records: Vec<DnsRecord> = self
            .execute(ProviderOp::Read, &spec.name, self.client.get(&url))
            .await?
            .unwrap_or_default();

        // Multiple matches: the first is treated as the authoritative record
        Ok(records.into_iter().next())
    }

    async fn create_record(&self, spec: &DomainSpec, content: &str) -> Result<()> {
        debug!("Creating DNS record: {} -> {}", spec.name, content);

        let url = format!("{}/zones/{}/dns_records", self.base_url, spec.zone_id);
        let payload = RecordPayload::for_spec(spec, content);

        self.execute::<serde_json::Value>(
            ProviderOp::Create,
            &spec.name,
            self.client.post(&url).json(&payload),
        )
        .await?;

        Ok(())
    }

    async fn update_record(&self, spec: &DomainSpec, record_id: &str, content: &str) -> Result<()> {
        debug!(
            "Updating DNS record: {} ({}) -> {}",
            spec.name, record_id, content
        );

        let url = format!(
            "{}/zones/{}/dns_records/{}",
            self.base_url, spec.zone_id, record_id
        );
        let payload = RecordPayload::for_spec(spec, content);

        self.execute::<serde_json::Value>(
            ProviderOp::Update,
            &spec.name,
            self.client.put(&url).json(&payload),
        )
        .await?;

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
