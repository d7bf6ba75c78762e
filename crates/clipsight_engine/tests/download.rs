use std::sync::{Arc, Mutex};

use clipsight_engine::{
    DownloadOutcome, DownloadSettings, Downloader, FallbackOpener, RetrievalError,
};
use pretty_assertions::assert_eq;
use reqwest::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct RecordingOpener {
    allow: bool,
    opened: Arc<Mutex<Vec<String>>>,
}

impl RecordingOpener {
    fn new(allow: bool) -> Self {
        Self {
            allow,
            opened: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl FallbackOpener for RecordingOpener {
    fn open(&self, url: &Url) -> bool {
        self.opened.lock().unwrap().push(url.to_string());
        self.allow
    }
}

fn downloader(server: &MockServer, dir: &tempfile::TempDir) -> Downloader {
    Downloader::new(
        DownloadSettings::default(),
        Url::parse(&server.uri()).expect("server uri"),
        dir.path().to_path_buf(),
    )
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[tokio::test]
async fn saves_the_payload_under_the_header_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/42/download/"))
        .and(query_param("which", "voronoi"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "Content-Disposition",
                    "attachment; filename*=UTF-8''clip%20a.mp4; filename=\"ignored.mp4\"",
                )
                .set_body_bytes(b"payload".to_vec()),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let opener = RecordingOpener::new(true);
    let outcome = downloader(&server, &dir)
        .download(42, &keys(&["voronoi"]), "match_with_voronoi.avi", &opener)
        .await
        .expect("download");

    let DownloadOutcome::Saved(saved) = outcome else {
        panic!("expected a saved payload, got {outcome:?}");
    };
    // The extended form wins over the simple form.
    assert_eq!(saved.filename, "clip a.mp4");
    assert_eq!(saved.byte_len, 7);
    let content = std::fs::read(&saved.path).expect("saved file");
    assert_eq!(content, b"payload");
    assert!(opener.opened().is_empty());
}

#[tokio::test]
async fn a_traversal_header_name_cannot_escape_the_output_directory() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/42/download/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", "attachment; filename=\"../escaped.mp4\"")
                .set_body_bytes(b"payload".to_vec()),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let downloads = dir.path().join("downloads");
    let downloader = Downloader::new(
        DownloadSettings::default(),
        Url::parse(&server.uri()).expect("server uri"),
        downloads.clone(),
    );

    let opener = RecordingOpener::new(false);
    let outcome = downloader
        .download(42, &keys(&["voronoi"]), "v.avi", &opener)
        .await
        .expect("download");

    let DownloadOutcome::Saved(saved) = outcome else {
        panic!("expected a saved payload, got {outcome:?}");
    };
    assert_eq!(saved.filename, "escaped.mp4");
    assert_eq!(saved.path, downloads.join("escaped.mp4"));
    assert!(!dir.path().join("escaped.mp4").exists());
}

#[tokio::test]
async fn uses_the_fallback_name_without_a_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/42/download/"))
        .and(query_param("which", "detections,voronoi"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"zipzip".to_vec()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let opener = RecordingOpener::new(true);
    let outcome = downloader(&server, &dir)
        .download(
            42,
            &keys(&["detections", "voronoi"]),
            "job_42_assets.zip",
            &opener,
        )
        .await
        .expect("download");

    let DownloadOutcome::Saved(saved) = outcome else {
        panic!("expected a saved payload, got {outcome:?}");
    };
    assert_eq!(saved.filename, "job_42_assets.zip");
    assert!(saved.path.ends_with("job_42_assets.zip"));
}

#[tokio::test]
async fn a_transport_failure_fails_over_to_the_opener() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/42/download/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let opener = RecordingOpener::new(true);
    let outcome = downloader(&server, &dir)
        .download(42, &keys(&["voronoi"]), "v.avi", &opener)
        .await
        .expect("fallback open");

    let DownloadOutcome::OpenedExternally { url } = outcome else {
        panic!("expected an external open, got {outcome:?}");
    };
    assert!(url.contains("/api/jobs/42/download/?which=voronoi"));
    assert_eq!(opener.opened(), vec![url]);
}

#[tokio::test]
async fn a_blocked_fallback_is_the_terminal_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/42/download/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let opener = RecordingOpener::new(false);
    let err = downloader(&server, &dir)
        .download(42, &keys(&["voronoi"]), "v.avi", &opener)
        .await
        .unwrap_err();

    assert!(matches!(err, RetrievalError::FallbackBlocked { .. }));
    assert_eq!(opener.opened().len(), 1);
    // Nothing was persisted on the failure path.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn the_same_selection_builds_the_same_request() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let downloader = downloader(&server, &dir);

    let selection = keys(&["detections", "tactical_board"]);
    let first = downloader.download_url(42, &selection).expect("url");
    let second = downloader.download_url(42, &selection).expect("url");
    assert_eq!(first, second);
    assert_eq!(
        first.query(),
        Some("which=detections,tactical_board"),
    );
}
