use std::path::PathBuf;
use std::sync::mpsc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use viewer_logging::{viewer_debug, viewer_error, viewer_info, viewer_warn};

use crate::decode::decode_html;
use crate::fetch::Fetcher;
use crate::filename::download_filename;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::{EngineEvent, FailureKind, FetchError};

/// Milestones reported by [`download_page`], in order.
pub const PROGRESS_STARTED: u8 = 10;
pub const PROGRESS_FETCHED: u8 = 50;
pub const PROGRESS_READ: u8 = 80;
pub const PROGRESS_DONE: u8 = 100;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("failed to fetch page: {status} {reason}")]
    HttpStatus { status: u16, reason: String },
    #[error("failed to fetch page: {0}")]
    Fetch(FetchError),
    #[error("failed to save page: {0}")]
    Persist(#[from] PersistError),
}

impl From<FetchError> for DownloadError {
    fn from(err: FetchError) -> Self {
        match err.kind {
            FailureKind::HttpStatus(status) => DownloadError::HttpStatus {
                status,
                reason: err.message,
            },
            _ => DownloadError::Fetch(err),
        }
    }
}

#[derive(Debug, Error)]
#[error("progress receiver is gone")]
pub struct ProgressClosed;

pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: u8) -> Result<(), ProgressClosed>;
}

/// Forwards progress to the engine's event channel.
pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn report(&self, percent: u8) -> Result<(), ProgressClosed> {
        self.tx
            .send(EngineEvent::DownloadProgress(percent))
            .map_err(|_| ProgressClosed)
    }
}

/// Drops every report.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _percent: u8) -> Result<(), ProgressClosed> {
        Ok(())
    }
}

fn report(sink: &dyn ProgressSink, percent: u8) {
    if let Err(err) = sink.report(percent) {
        viewer_debug!("Ignoring progress {}%: {}", percent, err);
    }
}

/// Fetches `url` and saves its raw markup as `{domain}-{timestamp}.html`.
///
/// Progress is reported as 10, 50, 80, 100. Errors are returned to the caller
/// unhandled; it decides how to present them.
pub async fn download_page(
    fetcher: &dyn Fetcher,
    url: &str,
    writer: &AtomicFileWriter,
    now: DateTime<Utc>,
    progress: &dyn ProgressSink,
) -> Result<PathBuf, DownloadError> {
    report(progress, PROGRESS_STARTED);

    let output = fetcher.fetch(url).await.map_err(|err| {
        viewer_error!("Error downloading page {}: {}", url, err);
        DownloadError::from(err)
    })?;
    report(progress, PROGRESS_FETCHED);

    let decoded = decode_html(&output.bytes, output.metadata.content_type.as_deref());
    if decoded.had_replacements {
        viewer_warn!(
            "Page {} had bytes invalid for {}; replaced",
            url,
            decoded.encoding_label
        );
    }
    report(progress, PROGRESS_READ);

    let filename = download_filename(url, now);
    let path = writer.write(&filename, decoded.html.as_bytes())?;
    viewer_info!(
        "Saved {} ({} bytes, {}) to {:?}",
        output.metadata.final_url,
        output.metadata.byte_len,
        decoded.encoding_label,
        path
    );
    report(progress, PROGRESS_DONE);

    Ok(path)
}
