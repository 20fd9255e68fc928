//! Tests for streaming downloads to disk.

use std::path::Path;

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, StatusCode};
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::{prepare_directory, save};
use crate::observe::NoopObserver;
use crate::outcome::{ErrorKind, Status};
use crate::test_fixtures::RecordingObserver;
use crate::transport::{HttpError, HttpResponse, ResponseBody};

fn report_url() -> Url {
    Url::parse("https://files.example.com/reports/report.pdf").unwrap()
}

fn response(body: &'static [u8]) -> HttpResponse {
    HttpResponse::new(StatusCode::OK, HeaderMap::new(), Bytes::from_static(body))
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

mod directories {
    use super::*;

    #[tokio::test]
    async fn empty_path_is_invalid() {
        let outcome = prepare_directory(Path::new("")).await;

        assert_eq!(outcome.kind(), Some(ErrorKind::InvalidRequest));
        assert_eq!(outcome.status_code(), 400);
    }

    #[tokio::test]
    async fn missing_directories_are_created() {
        let root = tempdir().unwrap();
        let nested = root.path().join("a").join("b");

        let outcome = prepare_directory(&nested).await;

        assert!(outcome.is_success());
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn file_in_the_way_is_an_io_failure() {
        let root = tempdir().unwrap();
        let blocker = root.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();

        let outcome = prepare_directory(&blocker.join("sub")).await;

        assert_eq!(outcome.kind(), Some(ErrorKind::Io));
        assert!(outcome.error().is_some());
    }
}

mod saving {
    use super::*;

    #[tokio::test]
    async fn body_is_written_under_url_name() {
        let dir = tempdir().unwrap();
        let observer = RecordingObserver::default();

        let outcome = save(
            response(b"%PDF-1.7"),
            &report_url(),
            dir.path(),
            &CancellationToken::new(),
            &observer,
        )
        .await;

        let path = outcome.into_payload().unwrap();
        assert_eq!(path, dir.path().join("report.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
        assert_eq!(entries(dir.path()), vec!["report.pdf"]);
        assert_eq!(observer.names(), vec!["DownloadStarted", "DownloadFinished"]);
        assert!(observer.events()[1].contains("bytes: 8"));
    }

    #[tokio::test]
    async fn content_disposition_name_is_preferred() {
        let dir = tempdir().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_DISPOSITION,
            HeaderValue::from_static("attachment; filename=\"summary.txt\""),
        );
        let response = HttpResponse::new(StatusCode::OK, headers, "hello");

        let path = save(
            response,
            &report_url(),
            dir.path(),
            &CancellationToken::new(),
            &NoopObserver,
        )
        .await
        .into_payload()
        .unwrap();

        assert_eq!(path.file_name().unwrap(), "summary.txt");
    }

    #[tokio::test]
    async fn collisions_get_numbered_names() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("report.pdf"), b"original").unwrap();

        for expected in ["report(1).pdf", "report(2).pdf"] {
            let path = save(
                response(b"new"),
                &report_url(),
                dir.path(),
                &CancellationToken::new(),
                &NoopObserver,
            )
            .await
            .into_payload()
            .unwrap();
            assert_eq!(path.file_name().unwrap(), expected);
        }

        assert_eq!(std::fs::read(dir.path().join("report.pdf")).unwrap(), b"original");
        assert_eq!(
            entries(dir.path()),
            vec!["report(1).pdf", "report(2).pdf", "report.pdf"]
        );
    }

    #[tokio::test]
    async fn multi_chunk_body_is_concatenated() {
        let dir = tempdir().unwrap();
        let chunks: Vec<Result<Bytes, HttpError>> = (0..4)
            .map(|i| Ok(Bytes::from(vec![b'a' + i; 1024])))
            .collect();
        let response = HttpResponse::new(
            StatusCode::OK,
            HeaderMap::new(),
            ResponseBody::from_stream(tokio_stream::iter(chunks)),
        );

        let path = save(
            response,
            &report_url(),
            dir.path(),
            &CancellationToken::new(),
            &NoopObserver,
        )
        .await
        .into_payload()
        .unwrap();

        let content = std::fs::read(path).unwrap();
        assert_eq!(content.len(), 4096);
        assert_eq!(content[0], b'a');
        assert_eq!(content[4095], b'd');
    }
}

mod cleanup {
    use super::*;

    #[tokio::test]
    async fn broken_stream_removes_temporary_file() {
        let dir = tempdir().unwrap();
        let chunks = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(HttpError::Body(Box::new(std::io::Error::other("reset")))),
        ];
        let response = HttpResponse::new(
            StatusCode::OK,
            HeaderMap::new(),
            ResponseBody::from_stream(tokio_stream::iter(chunks)),
        );

        let outcome = save(
            response,
            &report_url(),
            dir.path(),
            &CancellationToken::new(),
            &NoopObserver,
        )
        .await;

        assert_eq!(outcome.kind(), Some(ErrorKind::TransportError));
        assert!(entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn cancellation_removes_temporary_file() {
        let dir = tempdir().unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let observer = RecordingObserver::default();

        let outcome = save(
            response(b"data"),
            &report_url(),
            dir.path(),
            &cancel,
            &observer,
        )
        .await;

        assert_eq!(outcome.status(), Status::Cancelled);
        assert!(entries(dir.path()).is_empty());
        assert!(observer.names().contains(&"Cancelled".to_string()));
    }

    #[tokio::test]
    async fn missing_directory_is_an_io_failure() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");

        let outcome = save(
            response(b"data"),
            &report_url(),
            &missing,
            &CancellationToken::new(),
            &NoopObserver,
        )
        .await;

        assert_eq!(outcome.kind(), Some(ErrorKind::Io));
        assert!(!missing.exists());
    }
}
