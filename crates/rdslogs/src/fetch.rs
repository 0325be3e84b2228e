// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Reassemble a whole log file from its download pages

use crate::source::{LogSource, START_MARKER};
use crate::{Result, SyncError};
use bytes::{BufMut, Bytes, BytesMut};
use diagnostics::*;

/// Download `file_name` in full.
///
/// Pages are appended in marker order until the source reports no more data
/// pending. A source that keeps reporting pending data for more than
/// `max_pages` pages is treated as broken.
pub async fn fetch_log_file(
    source: &dyn LogSource,
    instance_id: &str,
    file_name: &str,
    max_pages: usize,
) -> Result<Bytes> {
    let fetch_error = |source| SyncError::Fetch {
        instance: instance_id.to_string(),
        file: file_name.to_string(),
        source,
    };

    let mut content = BytesMut::new();
    let mut marker = START_MARKER.to_string();
    let mut pages = 0usize;

    loop {
        if pages == max_pages {
            error!("Giving up on {file_name} after {pages} pages");
            return Err(SyncError::PaginationLimit {
                file: file_name.to_string(),
                pages,
            });
        }

        let portion = source
            .download_portion(instance_id, file_name, &marker)
            .await
            .map_err(fetch_error)?;
        pages += 1;
        content.put_slice(portion.data.as_bytes());

        if !portion.additional_data_pending {
            break;
        }

        marker = match portion.marker {
            Some(next) => next,
            None => {
                return Err(SyncError::MissingMarker {
                    file: file_name.to_string(),
                    page: pages,
                });
            }
        };
    }

    let size = content.len();
    debug!("Downloaded {file_name}: {size} bytes in {pages} pages");
    Ok(content.freeze())
}
