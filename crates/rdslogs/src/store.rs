// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Object store plumbing: S3 store construction and bucket/key addressing

use crate::{Result, SyncError};
use object_store::ObjectStore;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use std::fmt;
use std::sync::Arc;

/// A blob addressed the way operators see it: bucket plus key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobLocation {
    pub bucket: String,
    pub key: String,
}

impl BlobLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Path within a store already bound to `bucket`.
    ///
    /// The object store normalises keys: empty segments are dropped and
    /// characters outside its safe set (such as `#`) are percent-encoded, so
    /// the stored key can differ from `key`. Keys built with
    /// [`join_key`](crate::config::join_key) from ordinary log file names
    /// are stored unchanged.
    #[must_use]
    pub fn path(&self) -> ObjectPath {
        ObjectPath::from(self.key.as_str())
    }
}

impl fmt::Display for BlobLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Build an S3 store for `bucket` in `region`.
///
/// Credentials come from the standard AWS environment (the function's
/// execution role when deployed).
pub fn build_s3_store(bucket: &str, region: &str) -> Result<Arc<dyn ObjectStore>> {
    let store = AmazonS3Builder::from_env()
        .with_bucket_name(bucket)
        .with_region(region)
        .build()
        .map_err(|source| SyncError::ObjectStore {
            bucket: bucket.to_string(),
            source,
        })?;

    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::join_key;

    #[test]
    fn test_location_display_and_path() {
        let location = BlobLocation::new("bucket", "rds/prod/error/postgresql.log.2024-01-01-00");
        assert_eq!(
            location.to_string(),
            "s3://bucket/rds/prod/error/postgresql.log.2024-01-01-00"
        );
        assert_eq!(
            location.path().as_ref(),
            "rds/prod/error/postgresql.log.2024-01-01-00"
        );
    }

    #[test]
    fn test_joined_keys_are_stored_unchanged() {
        for name in ["error/postgresql.log.2024-01-01-00", "/abs.log", "a.log"] {
            let location = BlobLocation::new("bucket", join_key("rds/prod/", name));
            assert_eq!(location.path().as_ref(), location.key);
        }
    }

    #[test]
    fn test_unsafe_characters_are_encoded() {
        let location = BlobLocation::new("bucket", "rds/log#1");
        assert_eq!(location.path().as_ref(), "rds/log%231");
    }

    #[test]
    fn test_build_s3_store() {
        assert!(build_s3_store("bucket", "us-west-2").is_ok());
    }
}
