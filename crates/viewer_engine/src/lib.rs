//! Viewer engine: network checks, page export and effect execution.
mod decode;
mod download;
mod engine;
mod fetch;
mod filename;
mod new_tab;
mod persist;
mod probe;
mod types;

pub use decode::{decode_html, DecodedHtml};
pub use download::{
    download_page, ChannelProgressSink, DownloadError, NoProgress, ProgressClosed, ProgressSink,
    PROGRESS_DONE, PROGRESS_FETCHED, PROGRESS_READ, PROGRESS_STARTED,
};
pub use engine::{Clock, EngineConfig, EngineHandle};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use filename::{download_filename, extract_domain, file_timestamp, UNKNOWN_DOMAIN};
pub use new_tab::{
    new_tab_document, open_in_new_tab, BlankContextOpener, BrowsingContext, FRAME_SANDBOX,
};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use probe::{check_reachability, classify_response, probe_frame};
pub use types::{
    EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput, FrameProbe, Generation,
    NavId, Reachability, ResponseHead,
};
