//! Core reconciliation engine
//!
//! The Reconciler is responsible for:
//! - Discovering the current public IP via IpSource
//! - Comparing it against the persisted cache and the live provider record
//! - Issuing the minimal corrective provider call (create / update / nothing)
//! - Persisting the cache after a fully successful run
//!
//! ## Run Flow
//!
//! ```text
//! ┌──────────┐
//! │ IpSource │── current IP ──┐
//! └──────────┘                │
//!                             ▼
//!                      ┌────────────┐
//!                      │ Reconciler │◄── IpCache (load)
//!                      └────────────┘
//!                             │ per domain, sequentially
//!                             ▼
//!                      ┌─────────────┐
//!                      │ DnsProvider │ find / create / update
//!                      └─────────────┘
//!                             │
//!                             ▼
//!                      IpCache (save, only if every domain succeeded)
//! ```
//!
//! ## Decision Table (per domain)
//!
//! | Cached IP    | Live record      | Action                      |
//! |--------------|------------------|-----------------------------|
//! | == current   | (not fetched)    | nothing, success            |
//! | != current   | none             | create                      |
//! | != current   | content == IP    | refresh cache entry only    |
//! | != current   | content != IP    | update                      |
//!
//! One domain's failure never stops the remaining domains, but any failure
//! suppresses the batch cache write-back (see `run_once`).

use std::collections::HashMap;

use tracing::{error, info, warn};

use crate::cache::IpCache;
use crate::config::DomainSpec;
use crate::error::Result;
use crate::traits::{DnsProvider, IpSource};

/// What the reconciler did for one domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainOutcome {
    /// Cache already matched the current IP; no provider call was made
    CacheHit,
    /// The live record already carried the current IP; only the cache entry
    /// was refreshed
    InSync,
    /// An existing record was updated to the current IP
    Updated,
    /// No record existed; one was created with the current IP
    Created,
    /// The provider call failed; the cache entry was left untouched
    Failed(String),
}

impl DomainOutcome {
    /// Whether this outcome counts toward the batch success signal
    pub fn succeeded(&self) -> bool {
        !matches!(self, DomainOutcome::Failed(_))
    }
}

/// Summary of one reconciliation run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// The discovered public IP used for every domain in this run
    pub current_ip: String,
    /// Per-domain outcomes, in configuration order
    pub outcomes: Vec<(String, DomainOutcome)>,
    /// Whether the cache file was written back
    pub cache_persisted: bool,
}

impl RunSummary {
    /// Whether every domain in the run succeeded
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|(_, outcome)| outcome.succeeded())
    }

    /// Number of failed domains
    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.succeeded())
            .count()
    }
}

/// Core reconciliation engine
///
/// Holds the collaborators and the immutable domain list as an explicit
/// context value; the cache is loaded and saved as discrete operations
/// around each run rather than carried as ambient state.
pub struct Reconciler {
    /// Public IP discovery
    ip_source: Box<dyn IpSource>,

    /// DNS provider for record reads and writes
    provider: Box<dyn DnsProvider>,

    /// Persisted last-applied-IP cache
    cache: IpCache,

    /// Domains to keep in sync, in configuration order
    domains: Vec<DomainSpec>,
}

impl Reconciler {
    /// Create a new reconciler
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        cache: IpCache,
        domains: Vec<DomainSpec>,
    ) -> Self {
        Self {
            ip_source,
            provider,
            cache,
            domains,
        }
    }

    /// Run one reconciliation pass over every configured domain
    ///
    /// Domains are processed sequentially; a failing domain is logged and
    /// the remaining domains are still attempted. The cache file is written
    /// back only when every domain succeeded, so a mixed-result run persists
    /// none of its successes. That matches the long-standing behavior this
    /// tool replaces; partial success arguably should persist per-domain,
    /// but changing it would re-issue updates that already went through.
    ///
    /// # Errors
    ///
    /// `Error::NoPublicIp` when discovery exhausted every source. In that
    /// case no provider call was made and the cache is untouched.
    pub async fn run_once(&self) -> Result<RunSummary> {
        let current_ip = self.ip_source.current().await?;
        info!("Current public IP: {}", current_ip);

        let domain_names: Vec<String> =
            self.domains.iter().map(|spec| spec.name.clone()).collect();
        let mut cached = self.cache.load(&domain_names).await;

        let mut outcomes = Vec::with_capacity(self.domains.len());
        for spec in &self.domains {
            let cached_ip = cached.get(&spec.name).map(String::as_str);
            let outcome = match self.reconcile_domain(spec, &current_ip, cached_ip).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Failed to reconcile {}: {}", spec.name, e);
                    DomainOutcome::Failed(e.to_string())
                }
            };

            match outcome {
                DomainOutcome::InSync | DomainOutcome::Updated | DomainOutcome::Created => {
                    cached.insert(spec.name.clone(), current_ip.clone());
                }
                DomainOutcome::CacheHit | DomainOutcome::Failed(_) => {}
            }

            outcomes.push((spec.name.clone(), outcome));
        }

        let all_succeeded = outcomes.iter().all(|(_, outcome)| outcome.succeeded());

        let mut cache_persisted = false;
        if all_succeeded {
            match self.cache.save(&cached).await {
                Ok(()) => cache_persisted = true,
                Err(e) => warn!("{}", e),
            }
        } else {
            warn!(
                "{} of {} domain(s) failed; skipping cache write-back",
                outcomes.iter().filter(|(_, o)| !o.succeeded()).count(),
                outcomes.len()
            );
        }

        Ok(RunSummary {
            current_ip,
            outcomes,
            cache_persisted,
        })
    }

    /// Reconcile a single domain against the current IP
    async fn reconcile_domain(
        &self,
        spec: &DomainSpec,
        current_ip: &str,
        cached_ip: Option<&str>,
    ) -> Result<DomainOutcome> {
        // Fast path: an unchanged IP costs zero provider calls
        if cached_ip == Some(current_ip) {
            info!("IP address unchanged for {}: {}", spec.name, current_ip);
            return Ok(DomainOutcome::CacheHit);
        }

        match self.provider.find_record(spec).await? {
            Some(record) => {
                if record.content == current_ip {
                    // Provider already correct, the cache was merely stale
                    info!("DNS record already up to date for {}", spec.name);
                    return Ok(DomainOutcome::InSync);
                }

                self.provider
                    .update_record(spec, &record.id, current_ip)
                    .await?;
                info!(
                    "Updated DNS record for {}: {} -> {}",
                    spec.name, record.content, current_ip
                );
                Ok(DomainOutcome::Updated)
            }
            None => {
                self.provider.create_record(spec, current_ip).await?;
                info!("Created DNS record for {}: {}", spec.name, current_ip);
                Ok(DomainOutcome::Created)
            }
        }
    }
}
