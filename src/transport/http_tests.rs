//! Tests for HTTP request/response types.

use std::sync::Arc;

use bytes::Bytes;

use super::{HttpClient, HttpError, HttpRequest, HttpResponse, ResponseBody};

mod http_request {
    use super::*;

    #[test]
    fn new_creates_request_with_method_and_url() {
        let url = url::Url::parse("https://example.com/api").unwrap();
        let req = HttpRequest::new(http::Method::PUT, url.clone());

        assert_eq!(req.method, http::Method::PUT);
        assert_eq!(req.url, url);
        assert_eq!(req.version, http::Version::HTTP_11);
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
    }

}

mod duplicate {
    use super::*;

    fn original() -> HttpRequest {
        let url = url::Url::parse("https://example.com/upload?x=1").unwrap();
        let mut req = HttpRequest::new(http::Method::POST, url);
        req.body = Some(Bytes::from_static(b"payload"));
        req.headers.append(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        req.headers.append(
            http::header::ACCEPT,
            http::HeaderValue::from_static("text/plain"),
        );
        req.headers.append(
            http::header::ACCEPT,
            http::HeaderValue::from_static("application/xml"),
        );
        req.version = http::Version::HTTP_2;
        req
    }

    #[test]
    fn copies_method_url_version_and_body() {
        let req = original();
        let copy = req.duplicate();

        assert_eq!(copy.method, req.method);
        assert_eq!(copy.url, req.url);
        assert_eq!(copy.version, http::Version::HTTP_2);
        assert_eq!(copy.body, Some(Bytes::from_static(b"payload")));
    }

    #[test]
    fn copies_all_header_values_including_content_headers() {
        let copy = original().duplicate();

        assert_eq!(copy.headers.get(http::header::CONTENT_TYPE).unwrap(), "application/json");
        let accepts: Vec<_> = copy.headers.get_all(http::header::ACCEPT).iter().collect();
        assert_eq!(accepts, vec!["text/plain", "application/xml"]);
    }

    #[test]
    fn body_survives_consuming_earlier_copies() {
        let req = original();

        for _ in 0..5 {
            let attempt = req.duplicate();
            let consumed = attempt.body.unwrap();
            assert_eq!(&consumed[..], b"payload");
        }

        assert_eq!(req.duplicate().body.unwrap(), Bytes::from_static(b"payload"));
    }

    #[test]
    fn copies_permissive_header_values_verbatim() {
        let url = url::Url::parse("https://example.com/").unwrap();
        let value = http::HeaderValue::from_bytes(b"Bearer abc\xfe+/=").unwrap();
        let mut req = HttpRequest::new(http::Method::GET, url);
        req.headers.insert(http::header::AUTHORIZATION, value.clone());

        assert_eq!(req.duplicate().headers.get(http::header::AUTHORIZATION), Some(&value));
    }
}

mod response_body {
    use super::*;

    #[tokio::test]
    async fn buffered_body_returns_bytes() {
        let body = ResponseBody::from("hello");
        assert_eq!(body.bytes().await.unwrap(), Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn streaming_body_is_concatenated() {
        let chunks = vec![
            Ok(Bytes::from_static(b"hel")),
            Ok(Bytes::from_static(b"lo")),
        ];
        let body = ResponseBody::from_stream(tokio_stream::iter(chunks));

        assert_eq!(body.bytes().await.unwrap(), Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn streaming_error_is_returned() {
        let chunks = vec![Ok(Bytes::from_static(b"par")), Err(HttpError::Timeout)];
        let body = ResponseBody::from_stream(tokio_stream::iter(chunks));

        assert!(matches!(body.bytes().await, Err(HttpError::Timeout)));
    }

    #[tokio::test]
    async fn buffered_body_converts_to_single_chunk_stream() {
        use tokio_stream::StreamExt;

        let mut stream = ResponseBody::from(vec![1u8, 2, 3]).into_stream();

        assert_eq!(stream.next().await.unwrap().unwrap(), Bytes::from_static(&[1, 2, 3]));
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn debug_format_hides_content() {
        assert_eq!(format!("{:?}", ResponseBody::from("abc")), "Buffered(3)");
        let streaming = ResponseBody::from_stream(tokio_stream::empty());
        assert_eq!(format!("{streaming:?}"), "Streaming");
    }
}

mod http_response {
    use super::*;

    #[test]
    fn is_success_for_2xx_only() {
        let ok = HttpResponse::new(http::StatusCode::NO_CONTENT, http::HeaderMap::new(), "");
        let err = HttpResponse::new(http::StatusCode::NOT_FOUND, http::HeaderMap::new(), "");

        assert!(ok.is_success());
        assert!(!err.is_success());
    }

    #[test]
    fn content_type_reads_header() {
        let mut headers = http::HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json; charset=utf-8"),
        );
        let resp = HttpResponse::new(http::StatusCode::OK, headers, "{}");

        assert_eq!(resp.content_type(), Some("application/json; charset=utf-8"));
    }

    #[test]
    fn content_type_absent() {
        let resp = HttpResponse::new(http::StatusCode::OK, http::HeaderMap::new(), "");
        assert!(resp.content_type().is_none());
    }

    #[tokio::test]
    async fn buffered_keeps_status_and_headers() {
        let mut headers = http::HeaderMap::new();
        headers.insert(http::header::ETAG, http::HeaderValue::from_static("\"v1\""));
        let chunks = vec![Ok(Bytes::from_static(b"a")), Ok(Bytes::from_static(b"b"))];
        let resp = HttpResponse::new(
            http::StatusCode::ACCEPTED,
            headers,
            ResponseBody::from_stream(tokio_stream::iter(chunks)),
        );

        let resp = resp.buffered().await.unwrap();

        assert_eq!(resp.status, http::StatusCode::ACCEPTED);
        assert_eq!(resp.headers[http::header::ETAG], "\"v1\"");
        assert!(matches!(&resp.body, ResponseBody::Buffered(bytes) if &bytes[..] == b"ab"));
    }
}

mod http_client_trait {
    use super::*;

    struct EchoClient;

    impl HttpClient for EchoClient {
        async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
            Ok(HttpResponse::new(
                http::StatusCode::OK,
                http::HeaderMap::new(),
                req.body.unwrap_or_default(),
            ))
        }
    }

    #[tokio::test]
    async fn arc_delegates_to_inner_client() {
        let client = Arc::new(EchoClient);
        let url = url::Url::parse("https://example.com/").unwrap();

        let mut req = HttpRequest::new(http::Method::POST, url);
        req.body = Some(Bytes::from_static(b"ping"));

        let response = client.request(req).await.unwrap();

        assert_eq!(response.body.bytes().await.unwrap(), Bytes::from_static(b"ping"));
    }
}
