use tokio_util::sync::CancellationToken;
use viewer_logging::{viewer_debug, viewer_info};

use crate::fetch::Fetcher;
use crate::{FailureKind, FrameProbe, Reachability, ResponseHead};

/// HEAD check behind URL validation. Returns `None` when cancelled by a newer check.
pub async fn check_reachability(
    fetcher: &dyn Fetcher,
    url: &str,
    cancel: &CancellationToken,
) -> Option<Reachability> {
    let result = tokio::select! {
        _ = cancel.cancelled() => {
            viewer_debug!("Reachability check for {} superseded", url);
            return None;
        }
        result = fetcher.head(url) => result,
    };

    Some(match result {
        Ok(status) => Reachability::Reachable { status },
        Err(err) if err.kind == FailureKind::Timeout => Reachability::TimedOut,
        Err(err) => Reachability::Unreachable {
            detail: err.kind.to_string(),
        },
    })
}

/// Loads the frame target natively and reports what a browser frame would see.
pub async fn probe_frame(fetcher: &dyn Fetcher, url: &str) -> FrameProbe {
    match fetcher.probe(url).await {
        Ok(head) => classify_response(&head),
        Err(err) => {
            viewer_info!("Frame probe for {} failed: {}", url, err);
            match err.kind {
                FailureKind::Timeout => FrameProbe::TimedOut,
                _ => FrameProbe::Unreachable,
            }
        }
    }
}

/// Decides whether a response would render inside a cross-origin frame.
pub fn classify_response(head: &ResponseHead) -> FrameProbe {
    if let Some(xfo) = head.x_frame_options.as_deref() {
        let xfo = xfo.trim();
        if xfo.eq_ignore_ascii_case("deny") || xfo.eq_ignore_ascii_case("sameorigin") {
            return FrameProbe::Refused {
                reason: format!("X-Frame-Options: {xfo}"),
            };
        }
    }
    if let Some(ancestors) = head
        .content_security_policy
        .as_deref()
        .and_then(frame_ancestors)
    {
        if !ancestors.split_whitespace().any(|source| source == "*") {
            return FrameProbe::Refused {
                reason: format!("frame-ancestors {ancestors}"),
            };
        }
    }
    if (200..300).contains(&head.status) {
        FrameProbe::Loaded
    } else {
        FrameProbe::NoDetail {
            status: head.status,
        }
    }
}

fn frame_ancestors(policy: &str) -> Option<&str> {
    policy.split(';').find_map(|directive| {
        let directive = directive.trim();
        let (name, value) = directive
            .split_once(char::is_whitespace)
            .unwrap_or((directive, ""));
        name.eq_ignore_ascii_case("frame-ancestors")
            .then(|| value.trim())
    })
}
