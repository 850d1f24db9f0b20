//! Bucket listing for bucketcp.
//!
//! Turns the pages of a remote `ListObjectsV2` pagination into a lazy
//! sequence of `(bucket/key, record)` pairs, normalizing every record's
//! timestamp to local time page by page before any of it is yielded.

mod lister;

pub use lister::{BucketLister, DateParser, ListObjectsPaginator, ObjectListing, Rfc3339Parser};

/// Errors produced while listing a bucket.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("list objects request failed: {0}")]
    Request(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("invalid LastModified timestamp {value:?} for key {key}")]
    Timestamp { key: String, value: String },
}
