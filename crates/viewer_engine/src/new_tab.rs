use viewer_logging::{viewer_info, viewer_warn};

/// Capability set granted to embedded content. Nothing else is allowed.
pub const FRAME_SANDBOX: &str = "allow-scripts allow-same-origin";

/// A freshly opened, empty browsing context.
pub trait BrowsingContext {
    fn write_document(&mut self, html: &str) -> std::io::Result<()>;
}

/// Opens blank browsing contexts. `None` means the host refused (popup blocked).
pub trait BlankContextOpener {
    fn open_blank(&self) -> Option<Box<dyn BrowsingContext>>;
}

/// Self-contained page with one full-viewport sandboxed frame pointing at `url`.
pub fn new_tab_document(url: &str) -> String {
    let src = escape_attribute(url);
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>&#x3164;</title>
    <style>
      body, html {{
        margin: 0;
        padding: 0;
        width: 100%;
        height: 100%;
        overflow: hidden;
      }}
      iframe {{
        width: 100%;
        height: 100%;
        border: none;
      }}
    </style>
  </head>
  <body>
    <iframe src="{src}" sandbox="{FRAME_SANDBOX}"></iframe>
  </body>
</html>
"#
    )
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Opens a blank context and writes the framing document into it.
/// Silently does nothing when no context can be opened.
pub fn open_in_new_tab(opener: &dyn BlankContextOpener, url: &str) {
    let Some(mut context) = opener.open_blank() else {
        viewer_info!("New tab for {} was blocked; nothing opened", url);
        return;
    };
    if let Err(err) = context.write_document(&new_tab_document(url)) {
        viewer_warn!("Failed to write new tab document for {}: {}", url, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_escaping_blocks_breakout() {
        let doc = new_tab_document("https://e.com/?q=\"><script>");
        assert!(doc.contains("src=\"https://e.com/?q=&quot;&gt;&lt;script&gt;\""));
        assert!(!doc.contains("<script>"));
    }
}
