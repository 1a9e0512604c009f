//! Theme application and the OS color-scheme subscription.

use std::collections::BTreeSet;
use std::sync::{mpsc, Arc, Mutex};

use viewer_core::{Msg, ResolvedTheme, ThemePreference, ThemeSettings, DARK_CLASS};
use viewer_logging::{viewer_debug, viewer_info, viewer_warn};

use super::app::HostEvent;
use super::persistence::ThemeStore;

pub type SubscriptionId = u64;
pub type SchemeListener = Box<dyn Fn(bool) + Send>;

/// The OS "prefers dark" signal.
pub trait ColorSchemeSource: Send + Sync {
    fn prefers_dark(&self) -> bool;
    fn subscribe(&self, listener: SchemeListener) -> SubscriptionId;
    fn unsubscribe(&self, id: SubscriptionId);
}

/// A color-scheme signal driven by the host, for platforms without one.
#[derive(Clone, Default)]
pub struct ManualColorScheme {
    inner: Arc<Mutex<SchemeInner>>,
}

#[derive(Default)]
struct SchemeInner {
    dark: bool,
    next_id: SubscriptionId,
    listeners: Vec<(SubscriptionId, SchemeListener)>,
}

impl ManualColorScheme {
    pub fn new(dark: bool) -> Self {
        let scheme = Self::default();
        if let Ok(mut inner) = scheme.inner.lock() {
            inner.dark = dark;
        }
        scheme
    }

    /// Listeners only hear about actual changes.
    pub fn set_dark(&self, dark: bool) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        if inner.dark == dark {
            return;
        }
        inner.dark = dark;
        for (_, listener) in &inner.listeners {
            listener(dark);
        }
    }

    #[cfg(test)]
    pub fn listener_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.listeners.len()).unwrap_or(0)
    }
}

impl ColorSchemeSource for ManualColorScheme {
    fn prefers_dark(&self) -> bool {
        self.inner.lock().map(|inner| inner.dark).unwrap_or(false)
    }

    fn subscribe(&self, listener: SchemeListener) -> SubscriptionId {
        let Ok(mut inner) = self.inner.lock() else {
            return 0;
        };
        inner.next_id += 1;
        let id = inner.next_id;
        inner.listeners.push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.listeners.retain(|(existing, _)| *existing != id);
        }
    }
}

/// Class list of the top-level document element.
#[derive(Debug, Default)]
pub struct DocumentRoot {
    classes: BTreeSet<String>,
}

impl DocumentRoot {
    pub fn toggle_class(&mut self, class: &str, on: bool) {
        if on {
            self.classes.insert(class.to_string());
        } else {
            self.classes.remove(class);
        }
    }

    #[cfg(test)]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }
}

/// Owns the preference store, the OS subscription and the document root.
pub struct ThemeController {
    store: ThemeStore,
    source: Arc<dyn ColorSchemeSource>,
    subscription: Option<SubscriptionId>,
    root: DocumentRoot,
}

impl ThemeController {
    /// Reads the stored preference, queries the OS signal, subscribes to its
    /// changes and applies the resolved theme.
    pub fn init(
        store: ThemeStore,
        source: Arc<dyn ColorSchemeSource>,
        events: mpsc::Sender<HostEvent>,
    ) -> (Self, ThemeSettings) {
        let preference = store.load();
        let settings = ThemeSettings::new(preference, source.prefers_dark());

        let subscription = source.subscribe(Box::new(move |dark| {
            let _ = events.send(HostEvent::Dispatch(Msg::SystemThemeChanged { dark }));
        }));

        let mut controller = Self {
            store,
            source,
            subscription: Some(subscription),
            root: DocumentRoot::default(),
        };
        controller.apply(settings.resolved());
        viewer_info!(
            "Theme initialized: preference={} resolved={:?}",
            preference,
            settings.resolved()
        );
        (controller, settings)
    }

    pub fn apply(&mut self, resolved: ResolvedTheme) {
        viewer_debug!("Applying theme {:?}", resolved);
        self.root.toggle_class(DARK_CLASS, resolved.is_dark());
    }

    pub fn persist(&self, preference: ThemePreference) {
        self.store.save(preference);
    }

    #[cfg(test)]
    pub fn root(&self) -> &DocumentRoot {
        &self.root
    }

    pub fn teardown(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.source.unsubscribe(id);
        } else {
            viewer_warn!("Theme controller torn down twice");
        }
    }
}

impl Drop for ThemeController {
    fn drop(&mut self) {
        if self.subscription.is_some() {
            self.teardown();
        }
    }
}
