//! Core traits for the cfddns system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Discover the current public IP
//! - [`DnsProvider`]: Read and write DNS records via provider APIs

pub mod dns_provider;
pub mod ip_source;

pub use dns_provider::{DnsProvider, DnsRecord};
pub use ip_source::IpSource;
