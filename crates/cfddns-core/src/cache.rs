// # IP Cache
//
// File-backed map of domain name -> last-applied IP.
//
// ## Purpose
//
// Survives process restarts so an unchanged IP costs zero provider calls.
// The cache is advisory: any read or parse problem degrades to an empty map
// and a warning, never to a failed run.
//
// ## File Format
//
// A flat JSON document with one shared timestamp:
//
// ```json
// {
//   "example.com": "1.2.3.4",
//   "home.example.com": "1.2.3.4",
//   "updated_at": "2025-01-09T12:00:00+00:00"
// }
// ```
//
// A legacy single-IP document `{"ip": "1.2.3.4"}` is still accepted; the one
// IP is applied to every currently configured domain at load time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;

use crate::error::{Error, Result};

/// Key carrying the document-wide timestamp, skipped on load
const UPDATED_AT_KEY: &str = "updated_at";

/// Key of the legacy single-IP document shape
const LEGACY_IP_KEY: &str = "ip";

/// File-backed last-applied-IP cache
#[derive(Debug, Clone)]
pub struct IpCache {
    path: PathBuf,
}

impl IpCache {
    /// Create a cache handle for the given file path
    ///
    /// The file is not touched until `load` or `save` is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached IP map
    ///
    /// - Missing file: empty map
    /// - Unreadable or malformed file: warning, empty map
    /// - Legacy `{"ip": ...}` shape: the single IP fans out to every name in
    ///   `domains`
    pub async fn load(&self, domains: &[String]) -> HashMap<String, String> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("IP cache file does not exist: {}", self.path.display());
                return HashMap::new();
            }
            Err(e) => {
                tracing::warn!("Failed to read IP cache file {}: {}", self.path.display(), e);
                return HashMap::new();
            }
        };

        let doc: Value = match serde_json::from_str(&content) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(
                    "Failed to parse IP cache file {}: {}",
                    self.path.display(),
                    e
                );
                return HashMap::new();
            }
        };

        let Value::Object(map) = doc else {
            tracing::warn!(
                "IP cache file {} is not a JSON object, ignoring it",
                self.path.display()
            );
            return HashMap::new();
        };

        // Legacy single-IP cache: apply the one IP to all configured domains
        if let Some(Value::String(ip)) = map.get(LEGACY_IP_KEY) {
            tracing::debug!("Loaded legacy single-IP cache: {}", ip);
            return domains
                .iter()
                .map(|name| (name.clone(), ip.clone()))
                .collect();
        }

        map.into_iter()
            .filter(|(key, _)| key != UPDATED_AT_KEY)
            .filter_map(|(key, value)| match value {
                Value::String(ip) => Some((key, ip)),
                _ => None,
            })
            .collect()
    }

    /// Persist the full IP map plus a fresh `updated_at` timestamp
    ///
    /// Overwrites the previous file. Callers treat a failure as a warning,
    /// not a run failure; the `Result` exists so tests can observe it.
    pub async fn save(&self, ips: &HashMap<String, String>) -> Result<()> {
        let mut doc = serde_json::Map::with_capacity(ips.len() + 1);
        for (name, ip) in ips {
            doc.insert(name.clone(), Value::String(ip.clone()));
        }
        doc.insert(
            UPDATED_AT_KEY.to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );

        let json = serde_json::to_string(&Value::Object(doc))?;

        fs::write(&self.path, json).await.map_err(|e| {
            Error::cache(format!(
                "Failed to write IP cache file {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let cache = IpCache::new(dir.path().join("ip_cache.json"));

        let loaded = cache.load(&names(&["example.com"])).await;
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn malformed_file_loads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ip_cache.json");
        std::fs::write(&path, "{not json at all").unwrap();

        let cache = IpCache::new(&path);
        let loaded = cache.load(&names(&["example.com"])).await;
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn non_object_document_loads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ip_cache.json");
        std::fs::write(&path, "[\"1.2.3.4\"]").unwrap();

        let cache = IpCache::new(&path);
        let loaded = cache.load(&names(&["example.com"])).await;
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn legacy_single_ip_fans_out_to_all_domains() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ip_cache.json");
        std::fs::write(&path, r#"{"ip": "1.2.3.4"}"#).unwrap();

        let cache = IpCache::new(&path);
        let loaded = cache.load(&names(&["a.example.com", "b.example.com"])).await;

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("a.example.com").map(String::as_str), Some("1.2.3.4"));
        assert_eq!(loaded.get("b.example.com").map(String::as_str), Some("1.2.3.4"));
    }

    #[tokio::test]
    async fn save_then_load_round_trips_ignoring_timestamp() {
        let dir = tempdir().unwrap();
        let cache = IpCache::new(dir.path().join("ip_cache.json"));

        let mut ips = HashMap::new();
        ips.insert("a.example.com".to_string(), "9.9.9.9".to_string());
        cache.save(&ips).await.unwrap();

        let loaded = cache.load(&names(&["a.example.com"])).await;
        assert_eq!(loaded, ips);
    }

    #[tokio::test]
    async fn saved_document_carries_updated_at() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ip_cache.json");
        let cache = IpCache::new(&path);

        let mut ips = HashMap::new();
        ips.insert("a.example.com".to_string(), "9.9.9.9".to_string());
        cache.save(&ips).await.unwrap();

        let doc: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(doc.get("updated_at").and_then(Value::as_str).is_some());
    }

    #[tokio::test]
    async fn save_overwrites_previous_document() {
        let dir = tempdir().unwrap();
        let cache = IpCache::new(dir.path().join("ip_cache.json"));

        let mut first = HashMap::new();
        first.insert("a.example.com".to_string(), "1.1.1.1".to_string());
        first.insert("b.example.com".to_string(), "1.1.1.1".to_string());
        cache.save(&first).await.unwrap();

        let mut second = HashMap::new();
        second.insert("a.example.com".to_string(), "2.2.2.2".to_string());
        cache.save(&second).await.unwrap();

        let loaded = cache.load(&names(&["a.example.com", "b.example.com"])).await;
        assert_eq!(loaded, second);
    }

    #[tokio::test]
    async fn save_to_unwritable_path_reports_cache_error() {
        let cache = IpCache::new("/nonexistent-dir/ip_cache.json");

        let mut ips = HashMap::new();
        ips.insert("a.example.com".to_string(), "9.9.9.9".to_string());

        let err = cache.save(&ips).await.unwrap_err();
        assert!(matches!(err, Error::Cache(_)));
    }
}
