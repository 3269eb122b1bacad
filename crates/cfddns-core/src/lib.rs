// # cfddns-core
//
// Core library for the cfddns reconciliation loop.
//
// ## Architecture Overview
//
// This library provides the core functionality for dynamic DNS updates:
// - **IpSource**: Trait for discovering the current public IP
// - **DnsProvider**: Trait for reading and writing DNS records via provider APIs
// - **IpCache**: Persisted last-applied-IP map, surviving process restarts
// - **Reconciler**: Decides create / update / no-op per domain and drives the run
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Plugin Seams**: IP discovery and the DNS provider sit behind traits
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Idempotency**: Cache and live-record comparison avoid redundant writes

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod traits;

// Re-export core types for convenience
pub use cache::IpCache;
pub use config::{AuthCredential, DomainSpec, RecordType, Settings, TTL_AUTO};
pub use engine::{DomainOutcome, Reconciler, RunSummary};
pub use error::{Error, Result};
pub use traits::{DnsProvider, DnsRecord, IpSource};
