// Copyright 2026 the Timeslice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loading resource and line-buffer tables from JSON.
//!
//! A document has two optional arrays:
//!
//! ```json
//! {
//!   "resources": [
//!     { "kind": "Buffer", "block": 0, "role": "Primary", "revision": 0,
//!       "port": "Any", "max_per_display": 2400, "total": 2400 }
//!   ],
//!   "buffers": [
//!     { "kind": "Buffer", "class": { "Rgb": "Eight" }, "bucket": "W8To512",
//!       "amount": 400 },
//!     { "kind": "ColorConversion", "class": { "Yuv": "Eight" }, "amount": 2 }
//!   ]
//! }
//! ```
//!
//! A buffer row without a `bucket` applies to every width bucket.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use timeslice_core::buffer::{BufferKey, BufferTable, FormatClass, WidthBucket};
use timeslice_core::kind::ResourceKind;
use timeslice_core::table::{Capacity, ResourceIndex, ResourceTable, TableError};

/// Errors produced while loading tables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read table file: {0}")]
    Io(#[from] std::io::Error),
    /// The document is not valid JSON or does not match the schema.
    #[error("malformed table document: {0}")]
    Json(#[from] serde_json::Error),
    /// A resource row conflicts with another.
    #[error("invalid resource table: {0}")]
    Table(#[from] TableError),
    /// Two buffer rows set the same key.
    #[error("duplicate buffer entry {0:?}")]
    DuplicateBuffer(BufferKey),
}

#[derive(Debug, Deserialize)]
struct TablesDocument {
    #[serde(default)]
    resources: Vec<ResourceRow>,
    #[serde(default)]
    buffers: Vec<BufferRow>,
}

#[derive(Debug, Deserialize)]
struct ResourceRow {
    #[serde(flatten)]
    index: ResourceIndex,
    #[serde(flatten)]
    capacity: Capacity,
}

#[derive(Debug, Deserialize)]
struct BufferRow {
    kind: ResourceKind,
    class: FormatClass,
    #[serde(default)]
    bucket: Option<WidthBucket>,
    amount: u32,
}

/// Parses a JSON document into a resource table and a line-buffer table.
pub fn load_tables(json: &str) -> Result<(ResourceTable, BufferTable), ConfigError> {
    let doc: TablesDocument = serde_json::from_str(json)?;

    let resources =
        ResourceTable::from_rows(doc.resources.into_iter().map(|r| (r.index, r.capacity)))?;

    let mut buffers = BufferTable::new();
    for row in doc.buffers {
        let buckets = match row.bucket {
            Some(bucket) => vec![bucket],
            None => WidthBucket::ALL.to_vec(),
        };
        for bucket in buckets {
            let key = BufferKey::new(row.kind, row.class, bucket);
            if buffers.insert(key, row.amount).is_some() {
                return Err(ConfigError::DuplicateBuffer(key));
            }
        }
    }

    Ok((resources, buffers))
}

/// Reads and parses a table file.
pub fn read_tables(path: impl AsRef<Path>) -> Result<(ResourceTable, BufferTable), ConfigError> {
    let json = std::fs::read_to_string(path)?;
    load_tables(&json)
}
