//! Shared record shapes for bucketcp.
//!
//! Holds the object-listing records exchanged with the pagination
//! collaborator, S3 path helpers, the per-operation request parameter
//! mapping and the result records reported back to the user.

pub mod params;
pub mod paths;
pub mod results;
pub mod types;

pub use params::CliParams;
pub use paths::{find_bucket_key, split_s3_path};
pub use results::{TransferResult, create_warning};
pub use types::{
    CommonPrefix, CopySource, ListObjectsPage, ListObjectsRequest, ObjectRecord, ObjectSummary,
};

/// Request parameters for a single object-storage call, keyed by the
/// service's parameter name (`SSECustomerKey`, `ContentType`, ...).
pub type RequestParams = std::collections::BTreeMap<String, String>;
