use std::cell::RefCell;
use std::rc::Rc;

use viewer_engine::{
    new_tab_document, open_in_new_tab, BlankContextOpener, BrowsingContext, FRAME_SANDBOX,
};

#[test]
fn document_has_single_sandboxed_frame() {
    let doc = new_tab_document("https://example.com/page?a=1&b=2");

    assert!(doc.starts_with("<!DOCTYPE html>"));
    assert_eq!(doc.matches("<iframe").count(), 1);
    assert!(doc.contains(&format!("sandbox=\"{FRAME_SANDBOX}\"")));
    assert!(doc.contains("src=\"https://example.com/page?a=1&amp;b=2\""));
    assert!(doc.contains("overflow: hidden"));
    assert_eq!(FRAME_SANDBOX, "allow-scripts allow-same-origin");
}

#[derive(Clone, Default)]
struct RecordingContext {
    written: Rc<RefCell<Vec<String>>>,
}

impl BrowsingContext for RecordingContext {
    fn write_document(&mut self, html: &str) -> std::io::Result<()> {
        self.written.borrow_mut().push(html.to_string());
        Ok(())
    }
}

struct Opener {
    blocked: bool,
    context: RecordingContext,
}

impl BlankContextOpener for Opener {
    fn open_blank(&self) -> Option<Box<dyn BrowsingContext>> {
        if self.blocked {
            None
        } else {
            Some(Box::new(self.context.clone()))
        }
    }
}

#[test]
fn opener_writes_document_into_new_context() {
    let opener = Opener {
        blocked: false,
        context: RecordingContext::default(),
    };
    open_in_new_tab(&opener, "https://example.com");

    let written = opener.context.written.borrow();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0], new_tab_document("https://example.com"));
}

#[test]
fn blocked_popup_is_silent_noop() {
    let opener = Opener {
        blocked: true,
        context: RecordingContext::default(),
    };
    open_in_new_tab(&opener, "https://example.com");
    assert!(opener.context.written.borrow().is_empty());
}
