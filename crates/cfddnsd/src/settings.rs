//! INI configuration resolver
//!
//! Turns the on-disk INI document into the normalized `Settings` value the
//! reconciler consumes. Two shapes are accepted:
//!
//! ```ini
//! [cloudflare]
//! api_token = ...            ; or api_key = ... plus email = ...
//!
//! [domain:home.example.com]
//! zone_id = abc123
//! record_type = A            ; optional, default A
//! ttl = 120                  ; optional, default 1 (automatic)
//! proxied = true             ; optional, default false
//! ```
//!
//! and the legacy single-domain shape with `domain`, `zone_id`, and friends
//! directly under `[cloudflare]`. Both are normalized into the same
//! `Vec<DomainSpec>` here; nothing downstream ever branches on the shape
//! again.

use std::path::{Path, PathBuf};

use cfddns_core::config::{AuthCredential, DomainSpec, RecordType, Settings, TTL_AUTO};
use cfddns_core::error::{Error, Result};
use ini::{Ini, Properties};
use tracing::{error, info, warn};

/// Prefix of per-domain INI sections
const DOMAIN_SECTION_PREFIX: &str = "domain:";

/// Load and normalize the configuration file
pub fn load(path: &Path, cache_path: PathBuf) -> Result<Settings> {
    let ini = Ini::load_from_file(path).map_err(|e| {
        Error::config(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let global = ini
        .section(Some("cloudflare"))
        .ok_or_else(|| Error::config("Configuration file missing [cloudflare] section"))?;

    let auth = resolve_auth(global)?;
    let domains = resolve_domains(&ini, global)?;

    info!("Loaded {} domain configuration(s)", domains.len());

    Ok(Settings {
        auth,
        domains,
        cache_path,
    })
}

/// Pick the credential variant from the global section
///
/// A token wins over a key; the two are never mixed.
fn resolve_auth(global: &Properties) -> Result<AuthCredential> {
    if let Some(token) = global.get("api_token") {
        return Ok(AuthCredential::Token {
            token: token.to_string(),
        });
    }

    match (global.get("api_key"), global.get("email")) {
        (Some(api_key), Some(email)) => Ok(AuthCredential::ApiKey {
            api_key: api_key.to_string(),
            email: email.to_string(),
        }),
        (Some(_), None) => Err(Error::config(
            "Configuration uses api_key but is missing email",
        )),
        _ => Err(Error::config(
            "Configuration missing authentication info, requires api_token or api_key",
        )),
    }
}

/// Collect per-domain sections, falling back to the legacy single-domain shape
fn resolve_domains(ini: &Ini, global: &Properties) -> Result<Vec<DomainSpec>> {
    let mut domains = Vec::new();

    for (section, props) in ini.iter() {
        let Some(name) = section.and_then(|s| s.strip_prefix(DOMAIN_SECTION_PREFIX)) else {
            continue;
        };

        match domain_from_props(name, props) {
            Ok(spec) => domains.push(spec),
            Err(e) => {
                // Match the long-standing behavior: a broken domain section
                // is skipped, not fatal, as long as others remain.
                error!("Skipping domain {}: {}", name, e);
            }
        }
    }

    if domains.is_empty() {
        if let Some(name) = global.get("domain") {
            warn!(
                "Using legacy single domain configuration format, \
                consider updating to multi-domain format"
            );
            domains.push(domain_from_props(name, global)?);
        }
    }

    if domains.is_empty() {
        return Err(Error::config("No domain configurations found in config file"));
    }

    Ok(domains)
}

/// Build one DomainSpec from a property bag (domain section or legacy global)
fn domain_from_props(name: &str, props: &Properties) -> Result<DomainSpec> {
    let zone_id = props
        .get("zone_id")
        .ok_or_else(|| Error::config("missing required field zone_id"))?;

    let record_type = match props.get("record_type") {
        Some(value) => RecordType::parse(value)?,
        None => RecordType::default(),
    };

    let ttl = match props.get("ttl") {
        Some(value) => value
            .parse::<u32>()
            .map_err(|_| Error::config(format!("invalid ttl value '{}'", value)))?,
        None => TTL_AUTO,
    };

    let proxied = match props.get("proxied") {
        Some(value) => parse_bool(value)
            .ok_or_else(|| Error::config(format!("invalid proxied value '{}'", value)))?,
        None => false,
    };

    Ok(DomainSpec::new(name, zone_id)
        .with_record_type(record_type)
        .with_ttl(ttl)
        .with_proxied(proxied))
}

/// INI-style boolean spellings
fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
