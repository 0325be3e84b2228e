// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Export configuration, read once at the function boundary

use crate::{Result, SyncError};

pub const ENV_INSTANCE: &str = "RDS_INSTANCE_NAME";
pub const ENV_BUCKET: &str = "S3_BUCKET_NAME";
pub const ENV_PREFIX: &str = "S3_BUCKET_PREFIX";
pub const ENV_LOG_FILTER: &str = "LOG_NAME_PREFIX";
pub const ENV_WATERMARK_FILE: &str = "LAST_RECEIVED_FILE";
pub const ENV_MAX_PAGES: &str = "MAX_LOG_PAGES";

/// Upper bound on download pages per log file unless overridden
pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// Where logs come from and where they go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// RDS instance identifier
    pub instance_id: String,

    /// Target bucket
    pub bucket: String,

    /// Key prefix for both log objects and the watermark object
    pub prefix: String,

    /// Substring a log file name must contain to be copied
    pub log_name_filter: String,

    /// Watermark object name, joined to `prefix`
    pub watermark_file: String,

    /// Download pages allowed per log file before giving up
    pub max_pages: usize,
}

impl SyncConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name).ok_or_else(|| {
                SyncError::Configuration(format!("{name} environment variable not set"))
            })
        };

        let max_pages = match lookup(ENV_MAX_PAGES) {
            None => DEFAULT_MAX_PAGES,
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| {
                SyncError::Configuration(format!("{ENV_MAX_PAGES}={raw:?} is not a count: {e}"))
            })?,
        };

        let config = SyncConfig {
            instance_id: required(ENV_INSTANCE)?,
            bucket: required(ENV_BUCKET)?,
            prefix: required(ENV_PREFIX)?,
            log_name_filter: required(ENV_LOG_FILTER)?,
            watermark_file: required(ENV_WATERMARK_FILE)?,
            max_pages,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make a run meaningless.
    ///
    /// Prefix and filter may be empty: an empty prefix writes to the bucket
    /// root and an empty filter matches every log file.
    pub fn validate(&self) -> Result<()> {
        if self.instance_id.trim().is_empty() {
            return Err(SyncError::Configuration(format!("{ENV_INSTANCE} cannot be empty")));
        }
        if self.bucket.trim().is_empty() {
            return Err(SyncError::Configuration(format!("{ENV_BUCKET} cannot be empty")));
        }
        if self.watermark_file.trim().is_empty() {
            return Err(SyncError::Configuration(format!(
                "{ENV_WATERMARK_FILE} cannot be empty"
            )));
        }
        if self.max_pages == 0 {
            return Err(SyncError::Configuration(format!(
                "{ENV_MAX_PAGES} must be greater than 0"
            )));
        }
        Ok(())
    }

    /// Key of the watermark object
    #[must_use]
    pub fn watermark_key(&self) -> String {
        join_key(&self.prefix, &self.watermark_file)
    }

    /// Key a log file is copied to
    #[must_use]
    pub fn log_key(&self, file_name: &str) -> String {
        join_key(&self.prefix, file_name)
    }
}

/// Join a prefix and a name with exactly one `/` between them.
///
/// Leading separators on the name and trailing ones on the prefix are
/// dropped, so the result never starts with `/` or holds an empty segment at
/// the seam; object store paths would silently remove either. A name that
/// contains `/` keeps its sub-path.
#[must_use]
pub fn join_key(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let name = name.trim_start_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn full_env() -> HashMap<String, String> {
        env(&[
            (ENV_INSTANCE, "prod-db"),
            (ENV_BUCKET, "log-bucket"),
            (ENV_PREFIX, "rds/prod-db"),
            (ENV_LOG_FILTER, "postgresql.log"),
            (ENV_WATERMARK_FILE, "last_received"),
        ])
    }

    #[test]
    fn test_from_lookup() {
        let vars = full_env();
        let config = SyncConfig::from_lookup(|k| vars.get(k).cloned()).expect("valid config");

        assert_eq!(config.instance_id, "prod-db");
        assert_eq!(config.bucket, "log-bucket");
        assert_eq!(config.log_name_filter, "postgresql.log");
        assert_eq!(config.max_pages, DEFAULT_MAX_PAGES);
        assert_eq!(config.watermark_key(), "rds/prod-db/last_received");
        assert_eq!(
            config.log_key("error/postgresql.log.2024-01-01-00"),
            "rds/prod-db/error/postgresql.log.2024-01-01-00"
        );
    }

    #[test]
    fn test_missing_variable_is_named() {
        let mut vars = full_env();
        let _ = vars.remove(ENV_BUCKET);

        let err = SyncConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, SyncError::Configuration(ref msg) if msg.contains(ENV_BUCKET)));
    }

    #[test]
    fn test_max_pages_override() {
        let mut vars = full_env();
        let _ = vars.insert(ENV_MAX_PAGES.to_string(), "25".to_string());
        let config = SyncConfig::from_lookup(|k| vars.get(k).cloned()).expect("valid config");
        assert_eq!(config.max_pages, 25);

        let _ = vars.insert(ENV_MAX_PAGES.to_string(), "0".to_string());
        assert!(SyncConfig::from_lookup(|k| vars.get(k).cloned()).is_err());

        let _ = vars.insert(ENV_MAX_PAGES.to_string(), "lots".to_string());
        assert!(SyncConfig::from_lookup(|k| vars.get(k).cloned()).is_err());
    }

    #[test]
    fn test_empty_instance_rejected() {
        let mut vars = full_env();
        let _ = vars.insert(ENV_INSTANCE.to_string(), " ".to_string());
        assert!(SyncConfig::from_lookup(|k| vars.get(k).cloned()).is_err());
    }

    #[test]
    fn test_join_key() {
        assert_eq!(join_key("logs", "a.log"), "logs/a.log");
        assert_eq!(join_key("logs/", "a.log"), "logs/a.log");
        assert_eq!(join_key("", "a.log"), "a.log");
        assert_eq!(
            join_key("logs", "error/postgresql.log"),
            "logs/error/postgresql.log"
        );
    }

    #[test]
    fn test_join_key_keeps_names_under_prefix() {
        assert_eq!(join_key("logs", "/abs.log"), "logs/abs.log");
        assert_eq!(join_key("logs/", "/abs.log"), "logs/abs.log");
        assert_eq!(join_key("logs//", "a.log"), "logs/a.log");
        assert_eq!(join_key("", "/abs.log"), "abs.log");
        assert_eq!(join_key("/", "a.log"), "a.log");
    }
}
