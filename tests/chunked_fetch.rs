use wgetpipe::FetchError;
use wgetpipe::fetcher::{ChunkedFetcher, Fetcher};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_range(server: &MockServer, range: &str, content_range: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path("/big"))
        .and(header("range", range))
        .respond_with(
            ResponseTemplate::new(206)
                .insert_header("content-range", content_range)
                .set_body_bytes(body.to_vec()),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn reassembles_ranges_in_order() {
    let server = MockServer::start().await;
    mount_range(&server, "bytes=0-3", "bytes 0-3/10", b"0123").await;
    mount_range(&server, "bytes=4-7", "bytes 4-7/10", b"4567").await;
    mount_range(&server, "bytes=8-9", "bytes 8-9/10", b"89").await;

    let fetcher = ChunkedFetcher::new(reqwest::Client::new(), 4);
    let response = fetcher
        .fetch(&format!("{}/big", server.uri()), true)
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.content_length, Some(10));
    assert_eq!(response.bytes_read, 10);
    assert_eq!(response.body.as_deref(), Some(&b"0123456789"[..]));
}

#[tokio::test]
async fn counts_without_buffering_when_body_not_wanted() {
    let server = MockServer::start().await;
    mount_range(&server, "bytes=0-3", "bytes 0-3/6", b"0123").await;
    mount_range(&server, "bytes=4-5", "bytes 4-5/6", b"45").await;

    let fetcher = ChunkedFetcher::new(reqwest::Client::new(), 4);
    let response = fetcher
        .fetch(&format!("{}/big", server.uri()), false)
        .await
        .unwrap();

    assert_eq!(response.bytes_read, 6);
    assert!(response.body.is_none());
}

#[tokio::test]
async fn servers_without_range_support_get_a_plain_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/small"))
        .respond_with(ResponseTemplate::new(200).set_body_string("abc"))
        .mount(&server)
        .await;

    let fetcher = ChunkedFetcher::new(reqwest::Client::new(), 4);
    let response = fetcher
        .fetch(&format!("{}/small", server.uri()), true)
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body.as_deref(), Some(&b"abc"[..]));
}

#[tokio::test]
async fn partial_content_without_total_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/big"))
        .respond_with(ResponseTemplate::new(206).set_body_bytes(b"0123".to_vec()))
        .mount(&server)
        .await;

    let fetcher = ChunkedFetcher::new(reqwest::Client::new(), 4);
    let err = fetcher
        .fetch(&format!("{}/big", server.uri()), false)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Range(_)));
}

#[tokio::test]
async fn empty_resource_is_refetched_without_range() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .and(header_exists("range"))
        .respond_with(ResponseTemplate::new(416).insert_header("content-range", "bytes */0"))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200))
        .with_priority(2)
        .mount(&server)
        .await;

    let fetcher = ChunkedFetcher::new(reqwest::Client::new(), 4);
    let response = fetcher
        .fetch(&format!("{}/empty", server.uri()), true)
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.bytes_read, 0);
    assert_eq!(response.body.as_deref(), Some(&b""[..]));
}
