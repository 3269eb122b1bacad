// # DNS Provider Trait
//
// Defines the interface for reading and writing DNS records via provider APIs.
//
// ## Implementations
//
// - Cloudflare: `cfddns-provider-cloudflare` crate
//
// ## Responsibility Boundary
//
// Providers are isolated, stateless, single-shot API callers. The decision
// whether a create, update, or no-op is required is owned by the
// `Reconciler`; providers only execute the operation they are asked for.
// They must not cache record state across calls and must not touch the
// IP cache.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::DomainSpec;

/// A DNS record as read from the provider
///
/// Fetched on demand during a reconciliation pass and never cached beyond it.
#[derive(Debug, Clone, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned record identifier
    pub id: String,
    /// Fully qualified record name
    pub name: String,
    /// Record content (the IP for A/AAAA records)
    pub content: String,
    /// Any additional provider metadata, kept opaque
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Trait for DNS provider implementations
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Fetch the live DNS record for a domain
    ///
    /// When the provider reports multiple matches, implementations return
    /// the first one and treat it as the authoritative record.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(DnsRecord))`: A matching record exists
    /// - `Ok(None)`: The provider holds no record for this name and type
    /// - `Err(Error)`: The lookup itself failed (network, auth, API error)
    async fn find_record(&self, spec: &DomainSpec) -> crate::Result<Option<DnsRecord>>;

    /// Create a new record with the given content
    async fn create_record(&self, spec: &DomainSpec, content: &str) -> crate::Result<()>;

    /// Replace the content of an existing record
    ///
    /// The TTL and proxied flag from `spec` are sent along with the new
    /// content.
    async fn update_record(
        &self,
        spec: &DomainSpec,
        record_id: &str,
        content: &str,
    ) -> crate::Result<()>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
