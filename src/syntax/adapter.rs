//! Host integration
//!
//! The only part of the overlay that knows how a host editor talks. A host
//! implements `OverlayHost`, owns a `Subscriptions` registry and emits
//! `HostEvent`s into it synchronously; the `OverlayAdapter` listens,
//! rebuilds decorations for the visible window and submits them back.

use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};

use super::decoration::{build_decorations, build_decorations_indexed};
use super::detector::DelimiterIndex;
use super::style::Style;
use super::theme::{StyleResolver, ThemeSnapshot};
use crate::buffer::TextSource;
use crate::error::Result;

/// A decoration ready for the host's renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationDescriptor {
    /// Byte range in the buffer
    pub range: Range<usize>,
    /// CSS-like class name of the category
    pub class: &'static str,
    /// Resolved style
    pub style: Style,
}

/// Notifications a host delivers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// The buffer was edited; `lines` is the affected range after the edit
    DocumentChanged { lines: Range<usize> },
    /// The host scrolled or resized; `lines` is the new visible window
    VisibleRangeChanged { lines: Range<usize> },
    /// The host's style tokens changed
    ThemeChanged,
}

/// The host side of the protocol
pub trait OverlayHost {
    /// The buffer, with any pending edit fully applied
    fn text(&self) -> &dyn TextSource;

    /// Current style tokens
    fn theme(&self) -> &ThemeSnapshot;

    /// Replace the overlay's decorations
    fn submit(&mut self, decorations: Vec<DecorationDescriptor>);
}

/// A registered event callback
pub type Listener = Box<dyn FnMut(&HostEvent, &mut dyn OverlayHost) -> Result<()>>;

/// Handle returned by `Subscriptions::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Synchronous callback registry for host events
#[derive(Default)]
pub struct Subscriptions {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl Subscriptions {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it is called for every later event
    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener, returning whether it was registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is registered
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver an event to every listener in subscription order
    ///
    /// All listeners run even if one fails; the first error is returned.
    pub fn emit(&mut self, event: &HostEvent, host: &mut dyn OverlayHost) -> Result<()> {
        let mut first_error = None;
        for (_, listener) in &mut self.listeners {
            if let Err(err) = listener(event, &mut *host) {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Keeps a host's decorations in step with its buffer, window and theme
///
/// Block pairing is cached between events and rescanned only on a document
/// change, so scrolling costs the size of the window. Hosts must report
/// every edit with `DocumentChanged`.
pub struct OverlayAdapter {
    resolver: StyleResolver,
    visible: Range<usize>,
    index: Option<DelimiterIndex>,
}

impl OverlayAdapter {
    /// Create an adapter for an initial theme and visible window
    pub fn new(theme: &ThemeSnapshot, visible: Range<usize>) -> Result<Self> {
        Ok(Self {
            resolver: StyleResolver::new(theme)?,
            visible,
            index: None,
        })
    }

    /// Current visible window
    pub fn visible(&self) -> Range<usize> {
        self.visible.clone()
    }

    /// Name of the theme currently applied
    pub fn theme(&self) -> &str {
        self.resolver.theme()
    }

    /// React to a host event
    ///
    /// Only a bad theme is reported back as an error; the previous styles
    /// stay in effect in that case.
    pub fn handle(&mut self, event: &HostEvent, host: &mut dyn OverlayHost) -> Result<()> {
        match event {
            HostEvent::VisibleRangeChanged { lines } => {
                self.visible = lines.clone();
            }
            HostEvent::DocumentChanged { lines } => {
                tracing::debug!(changed = ?lines, "document changed");
                self.index = None;
            }
            HostEvent::ThemeChanged => {
                self.resolver = StyleResolver::new(host.theme())?;
            }
        }
        self.reindex(host.text());
        self.refresh(host);
        Ok(())
    }

    /// Rescan block pairing unless the cached index still fits `source`
    fn reindex(&mut self, source: &dyn TextSource) {
        let current = self
            .index
            .as_ref()
            .is_some_and(|index| index.line_count() == source.line_count());
        if current {
            return;
        }
        self.index = panic::catch_unwind(AssertUnwindSafe(|| DelimiterIndex::scan(source))).ok();
        if self.index.is_none() {
            tracing::warn!("delimiter scan failed, falling back to windowed scans");
        }
    }

    /// Rebuild and submit decorations for the visible window
    ///
    /// If building panics the pass is skipped and nothing is submitted, so
    /// the host keeps whatever it was showing.
    pub fn refresh(&self, host: &mut dyn OverlayHost) {
        if let Some(descriptors) = self.decorate(host.text()) {
            host.submit(descriptors);
        }
    }

    /// Styled decorations for the visible window, or `None` if building
    /// them failed
    pub fn decorate(&self, source: &dyn TextSource) -> Option<Vec<DecorationDescriptor>> {
        let visible = self.visible.clone();
        let index = self
            .index
            .as_ref()
            .filter(|index| index.line_count() == source.line_count());
        let built = panic::catch_unwind(AssertUnwindSafe(|| match index {
            Some(index) => build_decorations_indexed(visible, source, index),
            None => build_decorations(visible, source),
        }));
        match built {
            Ok(decorations) => Some(
                decorations
                    .into_iter()
                    .map(|d| DecorationDescriptor {
                        style: self.resolver.resolve(d.category),
                        class: d.category.class(),
                        range: d.range,
                    })
                    .collect(),
            ),
            Err(_) => {
                tracing::warn!(window = ?self.visible, "decoration pass failed, keeping previous decorations");
                None
            }
        }
    }

    /// Turn the adapter into a subscription callback
    pub fn into_listener(mut self) -> Listener {
        Box::new(move |event: &HostEvent, host: &mut dyn OverlayHost| self.handle(event, host))
    }

    /// Subscribe the adapter to a host's events
    pub fn attach(self, subscriptions: &mut Subscriptions) -> SubscriptionId {
        subscriptions.subscribe(self.into_listener())
    }
}
