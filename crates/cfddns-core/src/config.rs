//! Configuration types for the cfddns system
//!
//! These are the already-normalized shapes the reconciler consumes. Parsing
//! the on-disk configuration syntax (INI) lives in the `cfddnsd` binary;
//! whatever shape the file had (multi-domain sections or the legacy single
//! domain), it is normalized into one `Vec<DomainSpec>` at load time and
//! never branched on again downstream.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Cloudflare's TTL sentinel for "automatic"
pub const TTL_AUTO: u32 = 1;

/// DNS record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RecordType {
    /// A record (IPv4)
    #[default]
    A,
    /// AAAA record (IPv6)
    #[serde(rename = "AAAA")]
    Aaaa,
    /// CNAME record
    #[serde(rename = "CNAME")]
    Cname,
}

impl RecordType {
    /// The wire representation used by the provider API
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
        }
    }

    /// Parse a record type from its configuration spelling (case-insensitive)
    pub fn parse(s: &str) -> crate::Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            "CNAME" => Ok(RecordType::Cname),
            other => Err(crate::Error::config(format!(
                "Unsupported record type '{}'. Supported types: A, AAAA, CNAME",
                other
            ))),
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured domain to keep in sync
///
/// Immutable once loaded; uniqueness by name is assumed but not enforced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainSpec {
    /// Fully qualified record name (e.g. "home.example.com")
    pub name: String,

    /// Provider zone identifier the record lives in
    pub zone_id: String,

    /// Record type (default A)
    #[serde(default)]
    pub record_type: RecordType,

    /// Time-to-live in seconds; `TTL_AUTO` (1) means provider-managed
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Whether the record is proxied through the provider's edge
    #[serde(default)]
    pub proxied: bool,
}

impl DomainSpec {
    /// Create a spec with default record type, TTL, and proxy flag
    pub fn new(name: impl Into<String>, zone_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            zone_id: zone_id.into(),
            record_type: RecordType::default(),
            ttl: default_ttl(),
            proxied: false,
        }
    }

    /// Set the record type
    pub fn with_record_type(mut self, record_type: RecordType) -> Self {
        self.record_type = record_type;
        self
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the proxied flag
    pub fn with_proxied(mut self, proxied: bool) -> Self {
        self.proxied = proxied;
        self
    }
}

fn default_ttl() -> u32 {
    TTL_AUTO
}

/// Provider authentication credential
///
/// Exactly one variant is active; it is selected when the configuration is
/// loaded and never mixed.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthCredential {
    /// Scoped API token, sent as `Authorization: Bearer <token>`
    Token {
        /// The API token
        token: String,
    },

    /// Global API key, sent as `X-Auth-Key` + `X-Auth-Email`
    ApiKey {
        /// The API key
        api_key: String,
        /// The account email
        email: String,
    },
}

// Custom Debug implementation that hides the secret material
impl std::fmt::Debug for AuthCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthCredential::Token { .. } => f
                .debug_struct("Token")
                .field("token", &"<REDACTED>")
                .finish(),
            AuthCredential::ApiKey { email, .. } => f
                .debug_struct("ApiKey")
                .field("api_key", &"<REDACTED>")
                .field("email", email)
                .finish(),
        }
    }
}

impl AuthCredential {
    /// Validate that the active variant carries non-empty fields
    pub fn validate(&self) -> crate::Result<()> {
        match self {
            AuthCredential::Token { token } => {
                if token.is_empty() {
                    return Err(crate::Error::config("API token cannot be empty"));
                }
                Ok(())
            }
            AuthCredential::ApiKey { api_key, email } => {
                if api_key.is_empty() {
                    return Err(crate::Error::config("API key cannot be empty"));
                }
                if email.is_empty() {
                    return Err(crate::Error::config("Account email cannot be empty"));
                }
                Ok(())
            }
        }
    }
}

/// Fully resolved runtime settings
///
/// Produced once by the configuration resolver; the reconciler treats this
/// as an immutable context value.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Provider authentication
    pub auth: AuthCredential,

    /// Domains to keep in sync, in configuration order
    pub domains: Vec<DomainSpec>,

    /// Path of the persisted IP cache file
    pub cache_path: PathBuf,
}

impl Settings {
    /// Validate the resolved settings
    pub fn validate(&self) -> crate::Result<()> {
        self.auth.validate()?;

        if self.domains.is_empty() {
            return Err(crate::Error::config("No domain configurations found"));
        }

        for domain in &self.domains {
            if domain.name.is_empty() {
                return Err(crate::Error::config("Domain name cannot be empty"));
            }
            if domain.zone_id.is_empty() {
                return Err(crate::Error::config(format!(
                    "Domain {} is missing its zone_id",
                    domain.name
                )));
            }
        }

        Ok(())
    }
}
