use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::RequestParams;

/// One entry of a `ListObjectsV2` page, exactly as the service returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectSummary {
    pub key: String,
    /// Raw ISO-8601 timestamp (`2014-02-27T04:20:38.000Z`).
    pub last_modified: String,
    pub size: u64,
    #[serde(rename = "ETag", default, skip_serializing_if = "Option::is_none")]
    pub e_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

/// A listed object whose timestamp has been normalized to local time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectRecord {
    pub key: String,
    pub last_modified: DateTime<Local>,
    pub size: u64,
    #[serde(rename = "ETag", default, skip_serializing_if = "Option::is_none")]
    pub e_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

impl ObjectRecord {
    /// Builds a normalized record from a raw summary and its parsed timestamp.
    pub fn from_summary(summary: ObjectSummary, last_modified: DateTime<Local>) -> Self {
        Self {
            key: summary.key,
            last_modified,
            size: summary.size,
            e_tag: summary.e_tag,
            storage_class: summary.storage_class,
        }
    }
}

/// A single page produced by the pagination collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListObjectsPage {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<ObjectSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub common_prefixes: Vec<CommonPrefix>,
    #[serde(default)]
    pub is_truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_continuation_token: Option<String>,
}

/// A "directory" rolled up by a delimiter in a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CommonPrefix {
    pub prefix: String,
}

/// Arguments of one listing pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListObjectsRequest {
    pub bucket: String,
    pub prefix: Option<String>,
    pub page_size: Option<u32>,
    /// Extra service parameters merged into every page request
    /// (`RequestPayer`, `Delimiter`, ...).
    pub extra_args: RequestParams,
}

impl ListObjectsRequest {
    /// Creates a request listing the whole bucket with service defaults.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }
}

/// Source descriptor of a server-side copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CopySource {
    pub bucket: String,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

impl CopySource {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            version_id: None,
        }
    }
}
