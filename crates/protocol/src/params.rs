//! Maps flat CLI parameters onto the request shape of each operation.
//!
//! Every mapper copies only the parameters its operation accepts. Absent
//! (or empty) CLI values are omitted, never defaulted.

use serde::{Deserialize, Serialize};

use crate::RequestParams;

/// Transfer-related parameters collected from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliParams {
    pub sse: Option<String>,
    pub sse_kms_key_id: Option<String>,
    pub sse_c: Option<String>,
    pub sse_c_key: Option<String>,
    pub sse_c_copy_source: Option<String>,
    pub sse_c_copy_source_key: Option<String>,
    pub acl: Option<String>,
    pub storage_class: Option<String>,
    pub website_redirect: Option<String>,
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    pub content_disposition: Option<String>,
    pub content_encoding: Option<String>,
    pub content_language: Option<String>,
    pub expires: Option<String>,
    pub metadata_directive: Option<String>,
    pub request_payer: Option<String>,
}

/// Params for `HeadObject`.
pub fn map_head_object_params(request_params: &mut RequestParams, cli_params: &CliParams) {
    set_sse_c_params(request_params, cli_params);
    set_request_payer(request_params, cli_params);
}

/// Params for `GetObject`.
pub fn map_get_object_params(request_params: &mut RequestParams, cli_params: &CliParams) {
    set_sse_c_params(request_params, cli_params);
    set_request_payer(request_params, cli_params);
}

/// Params for `PutObject`.
pub fn map_put_object_params(request_params: &mut RequestParams, cli_params: &CliParams) {
    set_general_object_params(request_params, cli_params);
    set_sse_params(request_params, cli_params);
    set_sse_c_params(request_params, cli_params);
    set_request_payer(request_params, cli_params);
}

/// Params for `CopyObject`.
pub fn map_copy_object_params(request_params: &mut RequestParams, cli_params: &CliParams) {
    set_general_object_params(request_params, cli_params);
    set_param(
        request_params,
        "MetadataDirective",
        &cli_params.metadata_directive,
    );
    set_sse_params(request_params, cli_params);
    set_sse_c_params(request_params, cli_params);
    set_sse_c_copy_source_params(request_params, cli_params);
    set_request_payer(request_params, cli_params);
}

/// Params for `CreateMultipartUpload`.
pub fn map_create_multipart_upload_params(
    request_params: &mut RequestParams,
    cli_params: &CliParams,
) {
    set_general_object_params(request_params, cli_params);
    set_sse_params(request_params, cli_params);
    set_sse_c_params(request_params, cli_params);
    set_request_payer(request_params, cli_params);
}

/// Params for `UploadPart`.
pub fn map_upload_part_params(request_params: &mut RequestParams, cli_params: &CliParams) {
    set_sse_c_params(request_params, cli_params);
    set_request_payer(request_params, cli_params);
}

/// Params for `UploadPartCopy`.
pub fn map_upload_part_copy_params(request_params: &mut RequestParams, cli_params: &CliParams) {
    set_sse_c_params(request_params, cli_params);
    set_sse_c_copy_source_params(request_params, cli_params);
    set_request_payer(request_params, cli_params);
}

fn set_param(request_params: &mut RequestParams, name: &str, value: &Option<String>) {
    if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
        request_params.insert(name.to_string(), value.to_string());
    }
}

fn set_general_object_params(request_params: &mut RequestParams, cli_params: &CliParams) {
    let general = [
        ("ACL", &cli_params.acl),
        ("StorageClass", &cli_params.storage_class),
        ("WebsiteRedirectLocation", &cli_params.website_redirect),
        ("ContentType", &cli_params.content_type),
        ("CacheControl", &cli_params.cache_control),
        ("ContentDisposition", &cli_params.content_disposition),
        ("ContentEncoding", &cli_params.content_encoding),
        ("ContentLanguage", &cli_params.content_language),
        ("Expires", &cli_params.expires),
    ];
    for (name, value) in general {
        set_param(request_params, name, value);
    }
}

fn set_sse_params(request_params: &mut RequestParams, cli_params: &CliParams) {
    set_param(request_params, "ServerSideEncryption", &cli_params.sse);
    set_param(request_params, "SSEKMSKeyId", &cli_params.sse_kms_key_id);
}

// The key only travels with its algorithm.
fn set_sse_c_params(request_params: &mut RequestParams, cli_params: &CliParams) {
    if cli_params.sse_c.as_deref().is_some_and(|v| !v.is_empty()) {
        set_param(request_params, "SSECustomerAlgorithm", &cli_params.sse_c);
        set_param(request_params, "SSECustomerKey", &cli_params.sse_c_key);
    }
}

fn set_sse_c_copy_source_params(request_params: &mut RequestParams, cli_params: &CliParams) {
    if cli_params
        .sse_c_copy_source
        .as_deref()
        .is_some_and(|v| !v.is_empty())
    {
        set_param(
            request_params,
            "CopySourceSSECustomerAlgorithm",
            &cli_params.sse_c_copy_source,
        );
        set_param(
            request_params,
            "CopySourceSSECustomerKey",
            &cli_params.sse_c_copy_source_key,
        );
    }
}

fn set_request_payer(request_params: &mut RequestParams, cli_params: &CliParams) {
    set_param(request_params, "RequestPayer", &cli_params.request_payer);
}
