//! Runtime configuration
//!
//! Read once from environment variables; every unset or invalid value falls
//! back to its default with a log line saying so.

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::{info, warn};

use crate::households::MembershipPolicy;
use crate::persistence::SnapshotFormat;

pub const DEFAULT_LOG_LIMIT: usize = 50;
/// bcrypt work factor.
pub const DEFAULT_HASH_COST: u32 = 10;

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub data_dir: PathBuf,
    pub storage_format: SnapshotFormat,
    pub membership_policy: MembershipPolicy,
    /// Activity log entries kept in a session before the oldest are dropped.
    pub log_limit: usize,
    pub hash_cost: u32,
    pub log_level: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            storage_format: SnapshotFormat::Json,
            membership_policy: MembershipPolicy::Lenient,
            log_limit: DEFAULT_LOG_LIMIT,
            hash_cost: DEFAULT_HASH_COST,
            log_level: "info".to_string(),
        }
    }
}

impl RegistryConfig {
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, so tests need not touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let strict: bool = try_load(&lookup, "REGISTRY_STRICT_MEMBERSHIP", false);

        Self {
            data_dir: try_load(&lookup, "REGISTRY_DATA_DIR", defaults.data_dir),
            storage_format: try_load(&lookup, "REGISTRY_STORAGE_FORMAT", defaults.storage_format),
            membership_policy: if strict {
                MembershipPolicy::Strict
            } else {
                MembershipPolicy::Lenient
            },
            log_limit: try_load(&lookup, "REGISTRY_LOG_LIMIT", defaults.log_limit),
            hash_cost: try_load(&lookup, "REGISTRY_HASH_COST", defaults.hash_cost),
            log_level: try_load(&lookup, "REGISTRY_LOG_LEVEL", defaults.log_level),
        }
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir
            .join(format!("registry.{}", self.storage_format.extension()))
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => {
            info!("{key} not set, using default");
            default
        }
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{raw}': {e}, using default");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = RegistryConfig::from_lookup(lookup(&[]));
        assert_eq!(config.log_limit, DEFAULT_LOG_LIMIT);
        assert_eq!(config.membership_policy, MembershipPolicy::Lenient);
        assert_eq!(config.snapshot_path(), PathBuf::from("data/registry.json"));
    }

    #[test]
    fn test_values_are_read_and_bad_values_ignored() {
        let config = RegistryConfig::from_lookup(lookup(&[
            ("REGISTRY_DATA_DIR", "/srv/registry"),
            ("REGISTRY_STORAGE_FORMAT", "bincode"),
            ("REGISTRY_STRICT_MEMBERSHIP", "true"),
            ("REGISTRY_LOG_LIMIT", "many"),
            ("REGISTRY_HASH_COST", "12"),
        ]));
        assert_eq!(config.storage_format, SnapshotFormat::Bincode);
        assert_eq!(config.membership_policy, MembershipPolicy::Strict);
        assert_eq!(config.log_limit, DEFAULT_LOG_LIMIT);
        assert_eq!(config.hash_cost, 12);
        assert_eq!(
            config.snapshot_path(),
            PathBuf::from("/srv/registry/registry.bin")
        );
        assert_eq!(config.session_path(), PathBuf::from("/srv/registry/session.json"));
    }
}
