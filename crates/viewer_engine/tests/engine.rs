use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tempfile::TempDir;
use viewer_engine::{
    EngineConfig, EngineEvent, EngineHandle, FailureKind, FetchError, FetchMetadata, FetchOutput,
    Fetcher, FrameProbe, Reachability, ResponseHead,
};

/// Answers every request from memory after a fixed delay.
struct StaticFetcher {
    delay: Duration,
    body: &'static str,
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        tokio::time::sleep(self.delay).await;
        Ok(FetchOutput {
            bytes: self.body.as_bytes().to_vec(),
            metadata: FetchMetadata {
                original_url: url.to_string(),
                final_url: url.to_string(),
                redirect_count: 0,
                content_type: Some("text/html".to_string()),
                byte_len: self.body.len() as u64,
            },
        })
    }

    async fn head(&self, url: &str) -> Result<u16, FetchError> {
        tokio::time::sleep(self.delay).await;
        if url.contains("down") {
            return Err(FetchError {
                kind: FailureKind::Network,
                message: "connection refused".to_string(),
            });
        }
        Ok(200)
    }

    async fn probe(&self, url: &str) -> Result<ResponseHead, FetchError> {
        tokio::time::sleep(self.delay).await;
        let x_frame_options = url.contains("locked").then(|| "DENY".to_string());
        Ok(ResponseHead {
            status: 200,
            x_frame_options,
            content_security_policy: None,
        })
    }
}

fn engine(temp: &TempDir, delay: Duration) -> EngineHandle {
    let mut config = EngineConfig::default_with_output(temp.path().to_path_buf());
    config.now_utc = Arc::new(|| Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    let fetcher = Arc::new(StaticFetcher {
        delay,
        body: "<html>saved</html>",
    });
    EngineHandle::with_fetcher(config, fetcher)
}

const WAIT: Duration = Duration::from_secs(2);

#[test]
fn newer_debounce_supersedes_older() {
    let temp = TempDir::new().unwrap();
    let handle = engine(&temp, Duration::ZERO);

    handle.schedule_validation(1, Duration::from_millis(300));
    handle.schedule_validation(2, Duration::from_millis(20));

    match handle.recv_timeout(WAIT) {
        Some(EngineEvent::DebounceElapsed { generation }) => assert_eq!(generation, 2),
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(handle.recv_timeout(Duration::from_millis(500)).is_none());
}

#[test]
fn newer_reachability_check_cancels_older() {
    let temp = TempDir::new().unwrap();
    let handle = engine(&temp, Duration::from_millis(100));

    handle.check_reachability(1, "https://down.example");
    handle.check_reachability(2, "https://up.example");

    match handle.recv_timeout(WAIT) {
        Some(EngineEvent::ReachabilityChecked {
            generation,
            outcome,
        }) => {
            assert_eq!(generation, 2);
            assert_eq!(outcome, Reachability::Reachable { status: 200 });
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(handle.recv_timeout(Duration::from_millis(300)).is_none());
}

#[test]
fn frame_probe_reports_nav_id() {
    let temp = TempDir::new().unwrap();
    let handle = engine(&temp, Duration::ZERO);

    handle.probe_frame(7, "https://locked.example");

    match handle.recv_timeout(WAIT) {
        Some(EngineEvent::FrameProbed { nav_id, outcome }) => {
            assert_eq!(nav_id, 7);
            assert!(matches!(outcome, FrameProbe::Refused { .. }));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn download_streams_progress_then_completion() {
    let temp = TempDir::new().unwrap();
    let handle = engine(&temp, Duration::ZERO);

    handle.download("https://www.example.com/page");

    let mut progress = Vec::new();
    let path = loop {
        match handle.recv_timeout(WAIT) {
            Some(EngineEvent::DownloadProgress(percent)) => progress.push(percent),
            Some(EngineEvent::DownloadCompleted(result)) => break result.expect("download ok"),
            other => panic!("unexpected event: {other:?}"),
        }
    };

    assert_eq!(progress, vec![10, 50, 80, 100]);
    assert_eq!(
        path,
        temp.path()
            .join("www.example.com-2024-05-01T12-00-00-000Z.html")
    );
    assert_eq!(std::fs::read_to_string(path).unwrap(), "<html>saved</html>");
}
