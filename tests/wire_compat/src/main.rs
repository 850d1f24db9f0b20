fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use bucketcp_listing::{BucketLister, ListObjectsPaginator, ListingError};
    use bucketcp_protocol::{ListObjectsPage, ListObjectsRequest, RequestParams};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn read_fixture(name: &str) -> String {
        let path = fixtures_dir().join(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        serde_json::from_str(&read_fixture(name))
            .unwrap_or_else(|e| panic!("failed to parse fixture {name}: {e}"))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values (order-independent comparison).
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  fixture: {fixture}\n  rust:    {reserialized}"
        );
        parsed
    }

    // --- Listing records ---

    #[test]
    fn fixture_list_objects_page() {
        let page = roundtrip_test::<ListObjectsPage>("list_objects_page.json");
        assert_eq!(page.contents.len(), 2);
        assert!(page.is_truncated);
        assert_eq!(page.common_prefixes[0].prefix, "photos/2017/");
        assert_eq!(page.contents[1].e_tag, None);
    }

    #[test]
    fn fixture_list_objects_last_page() {
        let page = roundtrip_test::<ListObjectsPage>("list_objects_last_page.json");
        assert!(!page.is_truncated);
        assert_eq!(page.next_continuation_token, None);
    }

    #[test]
    fn fixture_copy_source() {
        let source = roundtrip_test::<bucketcp_protocol::CopySource>("copy_source.json");
        assert_eq!(source.key, "dir/myfile.txt");
    }

    struct FixturePaginator(Vec<&'static str>);

    impl ListObjectsPaginator for FixturePaginator {
        type Pages = std::vec::IntoIter<Result<ListObjectsPage, ListingError>>;

        fn paginate(&self, _request: &ListObjectsRequest) -> Self::Pages {
            self.0
                .iter()
                .map(|name| {
                    serde_json::from_str(&read_fixture(name))
                        .map_err(|e| ListingError::Request(Box::new(e)))
                })
                .collect::<Vec<_>>()
                .into_iter()
        }
    }

    #[test]
    fn fixture_pages_list_in_order() {
        let lister = BucketLister::new(FixturePaginator(vec![
            "list_objects_page.json",
            "list_objects_last_page.json",
        ]));

        let listed: Vec<_> = lister
            .list_objects("mybucket", Some("photos/"), None, None)
            .collect::<Result<_, _>>()
            .unwrap();

        let paths: Vec<&str> = listed.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "mybucket/photos/2016/a.jpg",
                "mybucket/photos/2016/b.jpg",
                "mybucket/photos/2016/c.jpg",
            ]
        );
        assert_eq!(listed[0].1.last_modified.timestamp(), 1_453_100_400);
        assert_eq!(listed[2].1.storage_class.as_deref(), Some("GLACIER"));
    }

    // --- Parameters and results ---

    #[test]
    fn fixture_cli_params() {
        let params = roundtrip_test::<bucketcp_protocol::CliParams>("cli_params.json");

        let mut request = RequestParams::new();
        bucketcp_protocol::params::map_copy_object_params(&mut request, &params);
        assert_eq!(request["ServerSideEncryption"], "aws:kms");
        assert_eq!(request["CopySourceSSECustomerAlgorithm"], "AES256");
        assert_eq!(request["MetadataDirective"], "REPLACE");
        assert_eq!(request["RequestPayer"], "requester");
        assert!(!request.contains_key("SSECustomerAlgorithm"));
    }

    #[test]
    fn fixture_transfer_result() {
        let result = roundtrip_test::<bucketcp_protocol::TransferResult>("transfer_result.json");
        assert_eq!(
            result,
            bucketcp_protocol::create_warning("/tmp/foo", "File does not exist.", true)
        );
    }

    // --- Configuration ---

    #[test]
    fn fixture_transfer_config() {
        let config = bucketcp_transfer::TransferConfig::from_json(&read_fixture("transfer_config.json"))
            .unwrap();
        assert_eq!(config.multipart_threshold, 64 * 1024 * 1024);
        assert_eq!(config.multipart_chunksize, 16 * 1024 * 1024);
        assert_eq!(config.max_queue_size, 500);
        assert_eq!(config.max_priority, 20);
        assert_eq!(config.max_concurrent_requests, 4);
    }
}
