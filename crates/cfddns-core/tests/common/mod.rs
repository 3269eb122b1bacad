#![allow(dead_code)]
//! Test doubles and common utilities for reconciler tests
//!
//! These doubles script provider behavior per domain and count every call,
//! so tests can assert not only outcomes but also which network operations
//! were (or were not) issued.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use cfddns_core::config::DomainSpec;
use cfddns_core::error::{Error, ProviderOp, Result};
use cfddns_core::traits::{DnsProvider, DnsRecord, IpSource};

/// An IP source that always returns the same text
pub struct FixedIpSource {
    ip: String,
    call_count: Arc<AtomicUsize>,
}

impl FixedIpSource {
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for FixedIpSource {
    async fn current(&self) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.ip.clone())
    }

    fn source_name(&self) -> &'static str {
        "fixed"
    }
}

/// An IP source where every endpoint has failed
pub struct ExhaustedIpSource;

#[async_trait::async_trait]
impl IpSource for ExhaustedIpSource {
    async fn current(&self) -> Result<String> {
        Err(Error::NoPublicIp)
    }

    fn source_name(&self) -> &'static str {
        "exhausted"
    }
}

/// Scripted provider behavior for one domain
#[derive(Debug, Clone)]
pub enum Script {
    /// find_record returns no match; create succeeds
    NoRecord,
    /// find_record returns no match; create fails
    NoRecordCreateFails,
    /// find_record returns a record with this content; update succeeds
    Record { id: &'static str, content: &'static str },
    /// find_record returns a record with this content; update fails
    RecordUpdateFails { id: &'static str, content: &'static str },
    /// find_record itself fails
    FindFails,
}

/// A DnsProvider double driven by per-domain scripts
pub struct ScriptedProvider {
    scripts: HashMap<String, Script>,
    find_calls: Arc<AtomicUsize>,
    create_calls: Arc<AtomicUsize>,
    update_calls: Arc<AtomicUsize>,
    /// Every write issued, as (domain, content)
    writes: Arc<Mutex<Vec<(String, String)>>>,
}

/// Cloneable view of a `ScriptedProvider`'s call counters
///
/// The reconciler takes ownership of its provider, so tests grab this
/// handle before handing the provider over.
#[derive(Clone)]
pub struct ProviderCounters {
    find: Arc<AtomicUsize>,
    create: Arc<AtomicUsize>,
    update: Arc<AtomicUsize>,
    writes: Arc<Mutex<Vec<(String, String)>>>,
}

impl ProviderCounters {
    pub fn find_calls(&self) -> usize {
        self.find.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.find_calls() + self.create_calls() + self.update_calls()
    }

    /// Every write issued, as (domain, content)
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().unwrap().clone()
    }
}

impl ScriptedProvider {
    pub fn new(scripts: impl IntoIterator<Item = (&'static str, Script)>) -> Self {
        Self {
            scripts: scripts
                .into_iter()
                .map(|(name, script)| (name.to_string(), script))
                .collect(),
            find_calls: Arc::new(AtomicUsize::new(0)),
            create_calls: Arc::new(AtomicUsize::new(0)),
            update_calls: Arc::new(AtomicUsize::new(0)),
            writes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn counters(&self) -> ProviderCounters {
        ProviderCounters {
            find: self.find_calls.clone(),
            create: self.create_calls.clone(),
            update: self.update_calls.clone(),
            writes: self.writes.clone(),
        }
    }

    fn script_for(&self, name: &str) -> Script {
        self.scripts
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("no script for domain {}", name))
    }
}

#[async_trait::async_trait]
impl DnsProvider for ScriptedProvider {
    async fn find_record(&self, spec: &DomainSpec) -> Result<Option<DnsRecord>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);

        match self.script_for(&spec.name) {
            Script::NoRecord | Script::NoRecordCreateFails => Ok(None),
            Script::Record { id, content } | Script::RecordUpdateFails { id, content } => {
                Ok(Some(DnsRecord {
                    id: id.to_string(),
                    name: spec.name.clone(),
                    content: content.to_string(),
                    extra: serde_json::Map::new(),
                }))
            }
            Script::FindFails => Err(Error::provider(
                ProviderOp::Read,
                &spec.name,
                "scripted read failure",
            )),
        }
    }

    async fn create_record(&self, spec: &DomainSpec, content: &str) -> Result<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.writes
            .lock()
            .unwrap()
            .push((spec.name.clone(), content.to_string()));

        match self.script_for(&spec.name) {
            Script::NoRecordCreateFails => Err(Error::provider(
                ProviderOp::Create,
                &spec.name,
                "scripted create failure",
            )),
            _ => Ok(()),
        }
    }

    async fn update_record(&self, spec: &DomainSpec, _record_id: &str, content: &str) -> Result<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.writes
            .lock()
            .unwrap()
            .push((spec.name.clone(), content.to_string()));

        match self.script_for(&spec.name) {
            Script::RecordUpdateFails { .. } => Err(Error::provider(
                ProviderOp::Update,
                &spec.name,
                "scripted update failure",
            )),
            _ => Ok(()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}
