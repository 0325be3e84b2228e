// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Watermark persistence.
//!
//! The watermark is the `LastWritten` timestamp of the newest log file
//! copied so far, stored as a bare decimal integer. It is the only record of
//! progress: a missing object means nothing has been copied yet.

use crate::store::BlobLocation;
use crate::{Result, SyncError};
use diagnostics::*;
use object_store::{ObjectStore, PutPayload};

/// Read the watermark at `location`, or 0 if it has never been written.
///
/// Any failure other than not-found is returned; falling back to 0 there
/// would re-copy every log file on the instance.
pub async fn read_watermark(store: &dyn ObjectStore, location: &BlobLocation) -> Result<u64> {
    let display = location.to_string();
    info!("Reading last received timestamp from {display}");

    let read_error = |source| SyncError::WatermarkRead {
        bucket: location.bucket.clone(),
        key: location.key.clone(),
        source,
    };

    let bytes = match store.get(&location.path()).await {
        Ok(result) => result.bytes().await.map_err(read_error)?,
        Err(object_store::Error::NotFound { .. }) => {
            info!("No last received timestamp found at {display}; all log files will be copied");
            return Ok(0);
        }
        Err(e) => return Err(read_error(e)),
    };

    let timestamp = parse_watermark(&bytes).ok_or_else(|| SyncError::InvalidWatermark {
        bucket: location.bucket.clone(),
        key: location.key.clone(),
        content: String::from_utf8_lossy(&bytes).into_owned(),
    })?;

    info!("Copying log files with LastWritten after {timestamp}");
    Ok(timestamp)
}

/// Overwrite the watermark at `location` with `value`.
pub async fn write_watermark(
    store: &dyn ObjectStore,
    location: &BlobLocation,
    value: u64,
) -> Result<()> {
    let payload = PutPayload::from(value.to_string().into_bytes());

    _ = store
        .put(&location.path(), payload)
        .await
        .map_err(|source| SyncError::WatermarkWrite {
            bucket: location.bucket.clone(),
            key: location.key.clone(),
            source,
        })?;

    let display = location.to_string();
    info!("Wrote last received timestamp {value} to {display}");
    Ok(())
}

/// Decode stored watermark bytes; surrounding whitespace is tolerated.
#[must_use]
pub fn parse_watermark(bytes: &[u8]) -> Option<u64> {
    std::str::from_utf8(bytes).ok()?.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use proptest::prelude::*;

    async fn round_trip(value: u64) -> u64 {
        let store = InMemory::new();
        let location = BlobLocation::new("bucket", "prefix/last_received");
        write_watermark(&store, &location, value)
            .await
            .expect("write");
        read_watermark(&store, &location).await.expect("read")
    }

    #[test]
    fn test_parse_watermark() {
        assert_eq!(parse_watermark(b"123456789"), Some(123_456_789));
        assert_eq!(parse_watermark(b" 42\n"), Some(42));
        assert_eq!(parse_watermark(b"0"), Some(0));
        assert_eq!(parse_watermark(b"-5"), None);
        assert_eq!(parse_watermark(b""), None);
        assert_eq!(parse_watermark(b"12ab"), None);
        assert_eq!(parse_watermark(&[0xff, 0xfe]), None);
    }

    #[tokio::test]
    async fn test_reads_int_from_object() {
        let store = InMemory::new();
        let location = BlobLocation::new("bucket", "timestamp-file");
        write_watermark(&store, &location, 123_456_789)
            .await
            .expect("write");

        let value = read_watermark(&store, &location).await.expect("read");
        assert_eq!(value, 123_456_789);
    }

    #[tokio::test]
    async fn test_returns_zero_when_not_found() {
        let store = InMemory::new();
        let location = BlobLocation::new("bucket", "timestamp-file");

        let value = read_watermark(&store, &location).await.expect("read");
        assert_eq!(value, 0);
    }

    #[tokio::test]
    async fn test_stored_as_plain_decimal() {
        let store = InMemory::new();
        let location = BlobLocation::new("bucket", "prefix/last_received");
        write_watermark(&store, &location, 1_700_000_000_000)
            .await
            .expect("write");

        let bytes = store
            .get(&location.path())
            .await
            .expect("get")
            .bytes()
            .await
            .expect("bytes");
        assert_eq!(&bytes[..], b"1700000000000");
    }

    #[tokio::test]
    async fn test_garbage_is_an_error() {
        let store = InMemory::new();
        let location = BlobLocation::new("bucket", "timestamp-file");
        _ = store
            .put(&location.path(), PutPayload::from_static(b"yesterday"))
            .await
            .expect("put");

        let err = read_watermark(&store, &location)
            .await
            .expect_err("garbage watermark");
        assert!(matches!(err, SyncError::InvalidWatermark { ref content, .. } if content == "yesterday"));
    }

    #[tokio::test]
    async fn test_round_trips_extremes() {
        assert_eq!(round_trip(0).await, 0);
        assert_eq!(round_trip(u64::MAX).await, u64::MAX);
    }

    proptest! {
        #[test]
        fn watermark_round_trips(value in any::<u64>()) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("runtime");
            prop_assert_eq!(rt.block_on(round_trip(value)), value);
        }

        #[test]
        fn padded_watermark_parses(value in any::<u64>(), pad in "[ \t\r\n]{0,3}") {
            let text = format!("{pad}{value}{pad}");
            prop_assert_eq!(parse_watermark(text.as_bytes()), Some(value));
        }
    }
}
