//! S3 path splitting.

/// Scheme prefix accepted on remote paths.
pub const S3_SCHEME: &str = "s3://";

/// Splits `bucket/key/with/slashes` into `("bucket", "key/with/slashes")`.
///
/// The key is empty when the path names only a bucket.
pub fn find_bucket_key(s3_path: &str) -> (&str, &str) {
    match s3_path.split_once('/') {
        Some((bucket, key)) => (bucket, key),
        None => (s3_path, ""),
    }
}

/// Like [`find_bucket_key`], but first strips an optional `s3://` scheme.
pub fn split_s3_path(s3_path: &str) -> (&str, &str) {
    find_bucket_key(s3_path.strip_prefix(S3_SCHEME).unwrap_or(s3_path))
}
