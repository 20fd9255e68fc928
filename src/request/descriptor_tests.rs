//! Tests for the request descriptor and body helpers.

use std::io;

use bytes::Bytes;
use http::Method;
use serde::Serialize;
use url::Url;

use super::{BodyContent, FORM_MEDIA_TYPE, JSON_MEDIA_TYPE, Request, TEXT_MEDIA_TYPE, XML_MEDIA_TYPE};

fn url() -> Url {
    Url::parse("https://api.example.com/items").unwrap()
}

async fn body_bytes(request: Request) -> Bytes {
    let body = request.into_parts().body.expect("body should be attached");
    let (content, _) = body.into_parts();
    content.into_bytes().await.unwrap()
}

mod construction {
    use super::*;

    #[test]
    fn new_defaults_to_get_without_body() {
        let request = Request::new(url());

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.url(), &url());
        assert!(request.query().is_empty());
        assert!(request.headers().is_empty());
        assert!(request.body().is_none());
    }

    #[test]
    fn parse_rejects_relative_url() {
        assert!(Request::parse("/relative/path").is_err());
        assert!(Request::parse("https://example.com").is_ok());
    }

    #[test]
    fn post_and_with_method() {
        assert_eq!(Request::post(url()).method(), Method::POST);
        assert_eq!(
            Request::get(url()).with_method(Method::DELETE).method(),
            Method::DELETE
        );
    }
}

mod mappings {
    use super::*;

    #[test]
    fn query_set_twice_keeps_last_value() {
        let request = Request::new(url())
            .with_query("page", "1")
            .with_query("size", "10")
            .with_query("page", "2");

        assert_eq!(
            request.query(),
            [
                ("page".to_string(), "2".to_string()),
                ("size".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn header_names_replace_case_insensitively() {
        let request = Request::new(url())
            .with_header("authorization", "Bearer A")
            .with_header("Authorization", "Bearer B");

        assert_eq!(
            request.headers(),
            [("Authorization".to_string(), "Bearer B".to_string())]
        );
    }
}

mod bodies {
    use super::*;

    #[derive(Serialize)]
    struct Item {
        name: String,
        count: u32,
    }

    #[tokio::test]
    async fn json_serializes_value_with_media_type() {
        let request = Request::post(url())
            .json(&serde_json::json!({"name": "widget", "count": 2}))
            .unwrap();

        assert_eq!(request.body().unwrap().media_type(), Some(JSON_MEDIA_TYPE));
        let value: serde_json::Value = serde_json::from_slice(&body_bytes(request).await).unwrap();
        assert_eq!(value["name"], "widget");
        assert_eq!(value["count"], 2);
    }

    #[tokio::test]
    async fn xml_serializes_struct_fields_as_elements() {
        let item = Item {
            name: "widget".to_string(),
            count: 2,
        };
        let request = Request::post(url()).xml(&item).unwrap();

        assert_eq!(request.body().unwrap().media_type(), Some(XML_MEDIA_TYPE));
        let text = String::from_utf8(body_bytes(request).await.to_vec()).unwrap();
        assert!(text.starts_with("<Item>"), "unexpected xml: {text}");
        assert!(text.contains("<name>widget</name>"));
        assert!(text.contains("<count>2</count>"));
    }

    #[tokio::test]
    async fn form_encodes_pairs() {
        let request = Request::post(url()).form([("name", "John Doe"), ("q", "a&b")]);

        assert_eq!(request.body().unwrap().media_type(), Some(FORM_MEDIA_TYPE));
        assert_eq!(body_bytes(request).await, Bytes::from_static(b"name=John+Doe&q=a%26b"));
    }

    #[tokio::test]
    async fn text_sets_plain_media_type() {
        let request = Request::post(url()).with_text("hello");

        assert_eq!(request.body().unwrap().media_type(), Some(TEXT_MEDIA_TYPE));
        assert_eq!(body_bytes(request).await, Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn bytes_without_media_type() {
        let request = Request::post(url()).with_bytes(vec![0u8, 1, 2], None);

        assert!(request.body().unwrap().media_type().is_none());
        assert_eq!(body_bytes(request).await, Bytes::from_static(&[0, 1, 2]));
    }

    #[tokio::test]
    async fn stream_is_collected_in_order() {
        let chunks: Vec<io::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"ab")),
            Ok(Bytes::from_static(b"cd")),
        ];
        let request = Request::post(url())
            .with_stream(tokio_stream::iter(chunks), Some("application/octet-stream"));

        assert!(matches!(
            request.body().unwrap().content(),
            BodyContent::Stream(_)
        ));
        assert_eq!(body_bytes(request).await, Bytes::from_static(b"abcd"));
    }

    #[tokio::test]
    async fn failing_stream_surfaces_error() {
        let chunks: Vec<io::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"ab")),
            Err(io::Error::other("source closed")),
        ];
        let body = Request::post(url())
            .with_stream(tokio_stream::iter(chunks), None)
            .into_parts()
            .body
            .unwrap();

        let (content, _) = body.into_parts();
        let err = content.into_bytes().await.unwrap_err();
        assert_eq!(err.to_string(), "source closed");
    }
}
