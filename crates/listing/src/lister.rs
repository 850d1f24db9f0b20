use bucketcp_protocol::{ListObjectsPage, ListObjectsRequest, ObjectRecord, RequestParams};
use chrono::{DateTime, Local};

use crate::ListingError;

/// The remote collaborator that issues the actual `ListObjectsV2` calls.
///
/// Each call to [`paginate`](Self::paginate) starts a fresh pagination and
/// yields pages in service order.
pub trait ListObjectsPaginator {
    type Pages: Iterator<Item = Result<ListObjectsPage, ListingError>>;

    fn paginate(&self, request: &ListObjectsRequest) -> Self::Pages;
}

/// Converts a raw `LastModified` value into local time.
pub trait DateParser {
    /// Returns `None` if `raw` is not a valid timestamp.
    fn parse(&self, raw: &str) -> Option<DateTime<Local>>;
}

impl<F> DateParser for F
where
    F: Fn(&str) -> Option<DateTime<Local>>,
{
    fn parse(&self, raw: &str) -> Option<DateTime<Local>> {
        self(raw)
    }
}

/// Parses the service's ISO-8601 timestamps (`2014-02-27T04:20:38.000Z`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Rfc3339Parser;

impl DateParser for Rfc3339Parser {
    fn parse(&self, raw: &str) -> Option<DateTime<Local>> {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|t| t.with_timezone(&Local))
    }
}

/// Lists the objects of a bucket through a paginator.
pub struct BucketLister<P, D = Rfc3339Parser> {
    paginator: P,
    date_parser: D,
}

impl<P: ListObjectsPaginator> BucketLister<P> {
    /// Creates a lister that parses timestamps as RFC 3339.
    pub fn new(paginator: P) -> Self {
        Self::with_date_parser(paginator, Rfc3339Parser)
    }
}

impl<P: ListObjectsPaginator, D: DateParser> BucketLister<P, D> {
    /// Creates a lister with a custom timestamp parser.
    pub fn with_date_parser(paginator: P, date_parser: D) -> Self {
        Self {
            paginator,
            date_parser,
        }
    }

    /// Lists `bucket`, optionally restricted to `prefix`.
    ///
    /// `page_size` bounds the keys per request; `extra_args` are merged into
    /// every request. Nothing is fetched until the listing is iterated.
    pub fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        page_size: Option<u32>,
        extra_args: Option<RequestParams>,
    ) -> ObjectListing<'_, P::Pages, D> {
        let mut request = ListObjectsRequest::new(bucket);
        request.prefix = prefix.map(str::to_string);
        request.page_size = page_size;
        request.extra_args = extra_args.unwrap_or_default();
        self.list(request)
    }

    /// Lists using a fully built request.
    pub fn list(&self, request: ListObjectsRequest) -> ObjectListing<'_, P::Pages, D> {
        tracing::debug!(
            bucket = %request.bucket,
            prefix = ?request.prefix,
            page_size = ?request.page_size,
            "listing objects"
        );
        ObjectListing {
            pages: self.paginator.paginate(&request),
            date_parser: &self.date_parser,
            bucket: request.bucket,
            current: Vec::new().into_iter(),
            done: false,
        }
    }
}

/// Lazy sequence of `(path, record)` pairs produced by [`BucketLister`].
///
/// `path` is `bucket/key` (`/key` for an empty bucket name). Page order and
/// within-page order are preserved exactly. The sequence ends after the
/// first error.
pub struct ObjectListing<'a, I, D> {
    pages: I,
    date_parser: &'a D,
    bucket: String,
    current: std::vec::IntoIter<ObjectRecord>,
    done: bool,
}

impl<I, D> ObjectListing<'_, I, D>
where
    I: Iterator<Item = Result<ListObjectsPage, ListingError>>,
    D: DateParser,
{
    // The whole page is normalized before any record of it is yielded.
    fn normalize_page(&self, page: ListObjectsPage) -> Result<Vec<ObjectRecord>, ListingError> {
        page.contents
            .into_iter()
            .map(|summary| match self.date_parser.parse(&summary.last_modified) {
                Some(last_modified) => Ok(ObjectRecord::from_summary(summary, last_modified)),
                None => Err(ListingError::Timestamp {
                    key: summary.key,
                    value: summary.last_modified,
                }),
            })
            .collect()
    }

    fn fail(&mut self, err: ListingError) -> Option<Result<(String, ObjectRecord), ListingError>> {
        tracing::warn!(bucket = %self.bucket, error = %err, "listing aborted");
        self.done = true;
        Some(Err(err))
    }
}

impl<I, D> Iterator for ObjectListing<'_, I, D>
where
    I: Iterator<Item = Result<ListObjectsPage, ListingError>>,
    D: DateParser,
{
    type Item = Result<(String, ObjectRecord), ListingError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.current.next() {
                let path = format!("{}/{}", self.bucket, record.key);
                return Some(Ok((path, record)));
            }
            if self.done {
                return None;
            }

            match self.pages.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => return self.fail(e),
                Some(Ok(page)) => match self.normalize_page(page) {
                    Ok(records) => {
                        tracing::trace!(bucket = %self.bucket, count = records.len(), "received page");
                        self.current = records.into_iter();
                    }
                    Err(e) => return self.fail(e),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bucketcp_protocol::ObjectSummary;
    use chrono::TimeZone;
    use std::cell::{Cell, RefCell};

    struct FakePaginator {
        pages: Vec<Result<ListObjectsPage, String>>,
        requests: RefCell<Vec<ListObjectsRequest>>,
    }

    impl FakePaginator {
        fn new(pages: Vec<ListObjectsPage>) -> Self {
            Self {
                pages: pages.into_iter().map(Ok).collect(),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl ListObjectsPaginator for FakePaginator {
        type Pages = std::vec::IntoIter<Result<ListObjectsPage, ListingError>>;

        fn paginate(&self, request: &ListObjectsRequest) -> Self::Pages {
            self.requests.borrow_mut().push(request.clone());
            self.pages
                .iter()
                .map(|p| p.clone().map_err(|e| ListingError::Request(e.into())))
                .collect::<Vec<_>>()
                .into_iter()
        }
    }

    fn summary(key: &str, size: u64) -> ObjectSummary {
        ObjectSummary {
            key: key.into(),
            last_modified: "2014-02-27T04:20:38.000Z".into(),
            size,
            e_tag: None,
            storage_class: None,
        }
    }

    fn page(contents: Vec<ObjectSummary>) -> ListObjectsPage {
        ListObjectsPage {
            contents,
            ..ListObjectsPage::default()
        }
    }

    fn fixed_now() -> DateTime<Local> {
        Local.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn lists_objects_across_pages_in_order() {
        let paginator = FakePaginator::new(vec![
            page(vec![summary("a", 1), summary("b", 2)]),
            page(vec![summary("c", 3)]),
        ]);
        let lister = BucketLister::with_date_parser(paginator, |_: &str| Some(fixed_now()));

        let objects: Vec<_> = lister
            .list_objects("foo", None, None, None)
            .collect::<Result<_, _>>()
            .unwrap();

        let paths: Vec<&str> = objects.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, vec!["foo/a", "foo/b", "foo/c"]);
        let sizes: Vec<u64> = objects.iter().map(|(_, r)| r.size).collect();
        assert_eq!(sizes, vec![1, 2, 3]);
        assert!(objects.iter().all(|(_, r)| r.last_modified == fixed_now()));
    }

    #[test]
    fn page_is_normalized_before_first_yield() {
        let paginator = FakePaginator::new(vec![
            page(vec![summary("a", 1), summary("b", 2)]),
            page(vec![summary("c", 3)]),
        ]);
        let calls = Cell::new(0);
        let parser = |_: &str| {
            calls.set(calls.get() + 1);
            Some(fixed_now())
        };
        let lister = BucketLister::with_date_parser(paginator, parser);

        let mut listing = lister.list_objects("foo", None, None, None);
        assert_eq!(calls.get(), 0);
        listing.next().unwrap().unwrap();
        assert_eq!(calls.get(), 2);
        listing.next().unwrap().unwrap();
        assert_eq!(calls.get(), 2);
        listing.next().unwrap().unwrap();
        assert_eq!(calls.get(), 3);
        assert!(listing.next().is_none());
    }

    #[test]
    fn empty_bucket_name_yields_rooted_keys() {
        let paginator = FakePaginator::new(vec![page(vec![summary("k", 1)])]);
        let lister = BucketLister::new(paginator);

        let (path, _) = lister.list_objects("", None, None, None).next().unwrap().unwrap();
        assert_eq!(path, "/k");
    }

    #[test]
    fn default_parser_reads_service_timestamps() {
        let paginator = FakePaginator::new(vec![page(vec![summary("k", 1)])]);
        let lister = BucketLister::new(paginator);

        let (_, record) = lister.list_objects("b", None, None, None).next().unwrap().unwrap();
        assert_eq!(record.last_modified.timestamp(), 1_393_474_838);
    }

    #[test]
    fn pages_without_contents_are_skipped() {
        let paginator = FakePaginator::new(vec![
            page(vec![]),
            page(vec![summary("x", 1)]),
            page(vec![]),
        ]);
        let lister = BucketLister::new(paginator);

        let keys: Vec<String> = lister
            .list_objects("b", None, None, None)
            .map(|r| r.unwrap().1.key)
            .collect();
        assert_eq!(keys, vec!["x"]);
    }

    #[test]
    fn duplicates_are_not_removed() {
        let paginator = FakePaginator::new(vec![
            page(vec![summary("dup", 1)]),
            page(vec![summary("dup", 1)]),
        ]);
        let lister = BucketLister::new(paginator);
        assert_eq!(lister.list_objects("b", None, None, None).count(), 2);
    }

    #[test]
    fn request_carries_prefix_page_size_and_extra_args() {
        let paginator = FakePaginator::new(vec![]);
        let lister = BucketLister::new(paginator);

        let mut extra = RequestParams::new();
        extra.insert("RequestPayer".into(), "requester".into());
        let _ = lister
            .list_objects("b", Some("photos/"), Some(100), Some(extra))
            .count();

        let requests = lister.paginator.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].bucket, "b");
        assert_eq!(requests[0].prefix.as_deref(), Some("photos/"));
        assert_eq!(requests[0].page_size, Some(100));
        assert_eq!(requests[0].extra_args["RequestPayer"], "requester");
    }

    #[test]
    fn each_listing_starts_a_fresh_pagination() {
        let paginator = FakePaginator::new(vec![page(vec![summary("a", 1)])]);
        let lister = BucketLister::new(paginator);

        assert_eq!(lister.list_objects("b", None, None, None).count(), 1);
        assert_eq!(lister.list_objects("b", None, None, None).count(), 1);
        assert_eq!(lister.paginator.requests.borrow().len(), 2);
    }

    #[test]
    fn bad_timestamp_ends_the_listing() {
        let mut bad = summary("broken", 1);
        bad.last_modified = "yesterday".into();
        let paginator = FakePaginator::new(vec![
            page(vec![summary("a", 1)]),
            page(vec![bad]),
            page(vec![summary("c", 1)]),
        ]);
        let lister = BucketLister::new(paginator);

        let results: Vec<_> = lister.list_objects("b", None, None, None).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(
            &results[1],
            Err(ListingError::Timestamp { key, .. }) if key == "broken"
        ));
    }

    #[test]
    fn request_failure_is_surfaced() {
        let paginator = FakePaginator {
            pages: vec![Ok(page(vec![summary("a", 1)])), Err("throttled".into())],
            requests: RefCell::new(Vec::new()),
        };
        let lister = BucketLister::new(paginator);

        let results: Vec<_> = lister.list_objects("b", None, None, None).collect();
        assert_eq!(results.len(), 2);
        let err = results[1].as_ref().unwrap_err();
        assert!(err.to_string().contains("throttled"));
    }
}
