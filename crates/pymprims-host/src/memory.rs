//! In-memory documents with a manual clock.
//!
//! [`MemoryPage`] plays the embedding document and [`MemoryFrame`] the
//! embedded one. Both are cheap handles: clone one into an endpoint and keep
//! another to drive and inspect the document from a test.
//!
//! Nothing happens on its own. Timers fire only when [`MemoryPage::advance`] or
//! [`MemoryFrame::advance`] is called, and the due [`HostEvent::Timer`] events are
//! returned to the caller for delivery.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::{HostError, Result};
use crate::traits::{
    ChildHost, EventKind, FrameSpec, FrameState, Host, HostEvent, ListenerId, ParentHost, Rect,
    TimerId, Viewport,
};

/// Height browsers give a frame with no height attribute.
const DEFAULT_FRAME_HEIGHT: f64 = 150.0;

/// A message posted across the document boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posted {
    /// Container id for parent posts; `None` for posts to the parent window.
    pub target: Option<String>,
    /// The wire string.
    pub message: String,
}

#[derive(Debug, Clone, Copy)]
struct TimerEntry {
    due_ms: u64,
    period_ms: Option<u64>,
}

/// Listener, timer and clock bookkeeping shared by both document kinds.
#[derive(Debug, Default)]
struct EventLoop {
    now_ms: u64,
    next_id: u64,
    listeners: BTreeMap<ListenerId, EventKind>,
    timers: BTreeMap<TimerId, TimerEntry>,
    navigations: Vec<String>,
    custom_events: Vec<String>,
    posted: Vec<Posted>,
}

impl EventLoop {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn bind(&mut self, kind: EventKind) -> ListenerId {
        let id = ListenerId(self.next_id());
        self.listeners.insert(id, kind);
        id
    }

    fn schedule(&mut self, delay_ms: u64, period_ms: Option<u64>) -> TimerId {
        let id = TimerId(self.next_id());
        self.timers.insert(
            id,
            TimerEntry {
                due_ms: self.now_ms + delay_ms,
                period_ms,
            },
        );
        id
    }

    fn bound(&self, kind: EventKind) -> usize {
        self.listeners.values().filter(|k| **k == kind).count()
    }

    /// Fire the earliest due timer at or before `until`, moving the clock to it.
    fn fire_next(&mut self, until: u64) -> Option<TimerId> {
        let (id, entry) = self
            .timers
            .iter()
            .filter(|(_, entry)| entry.due_ms <= until)
            .min_by_key(|(id, entry)| (entry.due_ms, **id))
            .map(|(id, entry)| (*id, *entry))?;

        self.now_ms = self.now_ms.max(entry.due_ms);
        match entry.period_ms {
            Some(period) => {
                let next = TimerEntry {
                    due_ms: entry.due_ms + period.max(1),
                    period_ms: Some(period),
                };
                self.timers.insert(id, next);
            }
            None => {
                self.timers.remove(&id);
            }
        }
        Some(id)
    }

    fn next_due(&self) -> Option<u64> {
        self.timers.values().map(|entry| entry.due_ms).min()
    }

    fn set_clock(&mut self, ms: u64) {
        self.now_ms = self.now_ms.max(ms);
    }

    fn advance(&mut self, ms: u64) -> Vec<HostEvent> {
        let until = self.now_ms + ms;
        let mut fired = Vec::new();
        while let Some(id) = self.fire_next(until) {
            fired.push(HostEvent::Timer(id));
        }
        self.now_ms = until;
        fired
    }
}

#[derive(Debug, Clone)]
struct ElementState {
    top: f64,
    left: f64,
    width: f64,
    frame: Option<MountedFrame>,
}

#[derive(Debug, Clone)]
struct MountedFrame {
    spec: FrameSpec,
    live: bool,
}

#[derive(Debug)]
struct PageState {
    events: EventLoop,
    href: String,
    title: String,
    viewport: Viewport,
    scroll_y: f64,
    elements: BTreeMap<String, ElementState>,
    scrolls: Vec<(f64, f64)>,
}

/// An in-memory embedding document.
#[derive(Debug, Clone)]
pub struct MemoryPage {
    inner: Rc<RefCell<PageState>>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new("https://host.example/story.html", "Story")
    }
}

impl MemoryPage {
    /// Create an empty page with a 1024x768 viewport.
    pub fn new(href: &str, title: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PageState {
                events: EventLoop::default(),
                href: href.to_string(),
                title: title.to_string(),
                viewport: Viewport {
                    width: 1024.0,
                    height: 768.0,
                },
                scroll_y: 0.0,
                elements: BTreeMap::new(),
                scrolls: Vec::new(),
            })),
        }
    }

    /// Add an element at document offset (`top`, `left`) with the given width.
    pub fn add_element(&self, id: &str, top: f64, left: f64, width: f64) {
        self.inner.borrow_mut().elements.insert(
            id.to_string(),
            ElementState {
                top,
                left,
                width,
                frame: None,
            },
        );
    }

    /// Remove an element and anything mounted in it.
    pub fn remove_element(&self, id: &str) {
        self.inner.borrow_mut().elements.remove(id);
    }

    /// Change an element's rendered width.
    pub fn set_element_width(&self, id: &str, width: f64) {
        if let Some(element) = self.inner.borrow_mut().elements.get_mut(id) {
            element.width = width;
        }
    }

    /// Change the viewport size.
    pub fn set_viewport(&self, width: f64, height: f64) {
        self.inner.borrow_mut().viewport = Viewport { width, height };
    }

    /// Set the scroll offset without recording a scroll call.
    pub fn set_scroll_y(&self, y: f64) {
        self.inner.borrow_mut().scroll_y = y;
    }

    /// Remove a container's frame behind the endpoint's back.
    pub fn remove_frame_externally(&self, container_id: &str) {
        if let Some(element) = self.inner.borrow_mut().elements.get_mut(container_id) {
            element.frame = None;
        }
    }

    /// Keep the frame element but drop its content window.
    pub fn orphan_frame(&self, container_id: &str) {
        if let Some(frame) = self
            .inner
            .borrow_mut()
            .elements
            .get_mut(container_id)
            .and_then(|element| element.frame.as_mut())
        {
            frame.live = false;
        }
    }

    /// The frame currently mounted in a container.
    pub fn frame(&self, container_id: &str) -> Option<FrameSpec> {
        self.inner
            .borrow()
            .elements
            .get(container_id)
            .and_then(|element| element.frame.as_ref())
            .map(|frame| frame.spec.clone())
    }

    /// An attribute of the frame mounted in a container.
    pub fn frame_attribute(&self, container_id: &str, name: &str) -> Option<String> {
        self.frame(container_id)
            .and_then(|frame| frame.attribute(name).map(str::to_string))
    }

    /// Messages posted to frames so far.
    pub fn posted(&self) -> Vec<Posted> {
        self.inner.borrow().events.posted.clone()
    }

    /// Drain messages posted to frames.
    pub fn take_posted(&self) -> Vec<Posted> {
        std::mem::take(&mut self.inner.borrow_mut().events.posted)
    }

    /// URLs this page was navigated to.
    pub fn navigations(&self) -> Vec<String> {
        self.inner.borrow().events.navigations.clone()
    }

    /// Custom events dispatched on this page.
    pub fn custom_events(&self) -> Vec<String> {
        self.inner.borrow().events.custom_events.clone()
    }

    /// Calls to `scroll_to`, in order.
    pub fn scrolls(&self) -> Vec<(f64, f64)> {
        self.inner.borrow().scrolls.clone()
    }

    /// Current vertical scroll offset.
    pub fn scroll_y(&self) -> f64 {
        self.inner.borrow().scroll_y
    }

    /// Number of bound listeners of a kind.
    pub fn bound(&self, kind: EventKind) -> usize {
        self.inner.borrow().events.bound(kind)
    }

    /// Returns true if the listener is still bound.
    pub fn is_bound(&self, listener: ListenerId) -> bool {
        self.inner.borrow().events.listeners.contains_key(&listener)
    }

    /// Number of pending timers.
    pub fn pending_timers(&self) -> usize {
        self.inner.borrow().events.timers.len()
    }

    /// Move the clock forward, returning the timer events that came due.
    pub fn advance(&self, ms: u64) -> Vec<HostEvent> {
        self.inner.borrow_mut().events.advance(ms)
    }

    /// Due time of the earliest pending timer.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.inner.borrow().events.next_due()
    }

    /// Fire the earliest timer due at or before `deadline_ms`, moving the
    /// clock to its due time.
    pub fn fire_next(&self, deadline_ms: u64) -> Option<HostEvent> {
        self.inner
            .borrow_mut()
            .events
            .fire_next(deadline_ms)
            .map(HostEvent::Timer)
    }

    /// Move the clock forward to `ms`. Never moves it back.
    pub fn set_clock(&self, ms: u64) {
        self.inner.borrow_mut().events.set_clock(ms);
    }

    fn with_frame<T>(
        &self,
        container_id: &str,
        f: impl FnOnce(&mut MountedFrame, f64, f64, f64) -> T,
    ) -> Result<T> {
        let mut state = self.inner.borrow_mut();
        let scroll_y = state.scroll_y;
        let element = state
            .elements
            .get_mut(container_id)
            .ok_or_else(|| HostError::ElementNotFound(container_id.to_string()))?;
        let (top, left, width) = (element.top - scroll_y, element.left, element.width);
        let frame = element
            .frame
            .as_mut()
            .ok_or_else(|| HostError::NoFrame(container_id.to_string()))?;
        Ok(f(frame, top, left, width))
    }
}

impl Host for MemoryPage {
    fn bind(&self, kind: EventKind) -> ListenerId {
        self.inner.borrow_mut().events.bind(kind)
    }

    fn unbind(&self, listener: ListenerId) {
        self.inner.borrow_mut().events.listeners.remove(&listener);
    }

    fn now_ms(&self) -> u64 {
        self.inner.borrow().events.now_ms
    }

    fn set_timeout(&self, delay_ms: u64) -> TimerId {
        self.inner.borrow_mut().events.schedule(delay_ms, None)
    }

    fn set_interval(&self, period_ms: u64) -> TimerId {
        self.inner
            .borrow_mut()
            .events
            .schedule(period_ms, Some(period_ms))
    }

    fn clear_timer(&self, timer: TimerId) {
        self.inner.borrow_mut().events.timers.remove(&timer);
    }

    fn navigate(&self, url: &str) {
        self.inner
            .borrow_mut()
            .events
            .navigations
            .push(url.to_string());
    }

    fn page_y_offset(&self) -> f64 {
        self.inner.borrow().scroll_y
    }

    fn dispatch_custom_event(&self, name: &str) {
        self.inner
            .borrow_mut()
            .events
            .custom_events
            .push(name.to_string());
    }
}

impl ParentHost for MemoryPage {
    fn has_element(&self, id: &str) -> bool {
        let state = self.inner.borrow();
        state.elements.contains_key(id)
            || state.elements.values().any(|element| {
                element
                    .frame
                    .as_ref()
                    .is_some_and(|frame| frame.spec.attribute("id") == Some(id))
            })
    }

    fn location_href(&self) -> String {
        self.inner.borrow().href.clone()
    }

    fn document_title(&self) -> String {
        self.inner.borrow().title.clone()
    }

    fn offset_width(&self, id: &str) -> Result<i64> {
        self.inner
            .borrow()
            .elements
            .get(id)
            .map(|element| element.width.round() as i64)
            .ok_or_else(|| HostError::ElementNotFound(id.to_string()))
    }

    fn bounding_rect(&self, id: &str) -> Result<Rect> {
        let state = self.inner.borrow();
        let element = state
            .elements
            .get(id)
            .ok_or_else(|| HostError::ElementNotFound(id.to_string()))?;
        let top = element.top - state.scroll_y;
        let height = element
            .frame
            .as_ref()
            .map_or(0.0, |frame| frame_height(&frame.spec));
        Ok(Rect {
            top,
            left: element.left,
            bottom: top + height,
            right: element.left + element.width,
        })
    }

    fn viewport(&self) -> Viewport {
        self.inner.borrow().viewport
    }

    fn mount_frame(&self, container_id: &str, frame: &FrameSpec) -> Result<()> {
        let mut state = self.inner.borrow_mut();
        let element = state
            .elements
            .get_mut(container_id)
            .ok_or_else(|| HostError::ElementNotFound(container_id.to_string()))?;
        element.frame = Some(MountedFrame {
            spec: frame.clone(),
            live: true,
        });
        tracing::trace!(container = container_id, src = %frame.src, "mounted frame");
        Ok(())
    }

    fn frame_state(&self, container_id: &str) -> FrameState {
        match self
            .inner
            .borrow()
            .elements
            .get(container_id)
            .and_then(|element| element.frame.as_ref())
        {
            Some(frame) if frame.live => FrameState::Live,
            Some(_) => FrameState::Detached,
            None => FrameState::Missing,
        }
    }

    fn frame_rect(&self, container_id: &str) -> Result<Rect> {
        self.with_frame(container_id, |frame, top, left, width| Rect {
            top,
            left,
            bottom: top + frame_height(&frame.spec),
            right: left + width,
        })
    }

    fn set_frame_attribute(&self, container_id: &str, name: &str, value: &str) -> Result<()> {
        self.with_frame(container_id, |frame, _, _, _| {
            let attributes = &mut frame.spec.attributes;
            match attributes.iter_mut().find(|(key, _)| key == name) {
                Some((_, existing)) => *existing = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
        })
    }

    fn detach_frame(&self, container_id: &str) -> bool {
        self.inner
            .borrow_mut()
            .elements
            .get_mut(container_id)
            .and_then(|element| element.frame.take())
            .is_some()
    }

    fn post_to_frame(&self, container_id: &str, message: &str) -> Result<()> {
        let live = self.with_frame(container_id, |frame, _, _, _| frame.live)?;
        if !live {
            return Err(HostError::NoFrame(container_id.to_string()));
        }
        self.inner.borrow_mut().events.posted.push(Posted {
            target: Some(container_id.to_string()),
            message: message.to_string(),
        });
        Ok(())
    }

    fn scroll_to(&self, x: f64, y: f64) {
        let mut state = self.inner.borrow_mut();
        state.scrolls.push((x, y));
        // Browsers treat a NaN coordinate as 0.
        state.scroll_y = if y.is_nan() { 0.0 } else { y.max(0.0) };
    }
}

fn frame_height(frame: &FrameSpec) -> f64 {
    frame
        .attribute("height")
        .and_then(|value| value.trim_end_matches("px").parse::<f64>().ok())
        .filter(|height| height.is_finite())
        .unwrap_or(DEFAULT_FRAME_HEIGHT)
}

/// How [`ChildHost::is_top_level`] answers for a [`MemoryFrame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingMode {
    /// Loaded inside a frame; the top-window comparison succeeds.
    Embedded,
    /// Loaded as the top-level document.
    TopLevel,
    /// Loaded inside a cross-origin frame; the comparison throws.
    AccessDenied,
}

#[derive(Debug)]
struct DocumentState {
    events: EventLoop,
    search: String,
    body_height: i64,
    root_class: String,
    embedding: EmbeddingMode,
    scroll_y: f64,
    elements: BTreeMap<String, f64>,
}

/// An in-memory embedded document.
#[derive(Debug, Clone)]
pub struct MemoryFrame {
    inner: Rc<RefCell<DocumentState>>,
}

impl MemoryFrame {
    /// Create a document loaded with `search` as its query string.
    pub fn new(search: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(DocumentState {
                events: EventLoop::default(),
                search: search.to_string(),
                body_height: 0,
                root_class: String::new(),
                embedding: EmbeddingMode::Embedded,
                scroll_y: 0.0,
                elements: BTreeMap::new(),
            })),
        }
    }

    /// Create a document from the `src` a parent mounted.
    pub fn from_src(src: &str) -> Self {
        let without_fragment = src.split('#').next().unwrap_or_default();
        let search = without_fragment
            .find('?')
            .map_or("", |idx| &without_fragment[idx..]);
        Self::new(search)
    }

    /// Set the rendered body height.
    pub fn set_body_height(&self, height: i64) {
        self.inner.borrow_mut().body_height = height;
    }

    /// Choose how the embedding check answers.
    pub fn set_embedding(&self, mode: EmbeddingMode) {
        self.inner.borrow_mut().embedding = mode;
    }

    /// Set the root element's class attribute.
    pub fn set_root_class(&self, class_name: &str) {
        self.inner.borrow_mut().root_class = class_name.to_string();
    }

    /// The root element's class attribute.
    pub fn root_class(&self) -> String {
        self.inner.borrow().root_class.clone()
    }

    /// Add an element at a document offset.
    pub fn add_element(&self, id: &str, top: f64) {
        self.inner.borrow_mut().elements.insert(id.to_string(), top);
    }

    /// Set the scroll offset.
    pub fn set_scroll_y(&self, y: f64) {
        self.inner.borrow_mut().scroll_y = y;
    }

    /// Messages posted to the parent so far.
    pub fn posted(&self) -> Vec<Posted> {
        self.inner.borrow().events.posted.clone()
    }

    /// Drain messages posted to the parent.
    pub fn take_posted(&self) -> Vec<Posted> {
        std::mem::take(&mut self.inner.borrow_mut().events.posted)
    }

    /// URLs this document was navigated to.
    pub fn navigations(&self) -> Vec<String> {
        self.inner.borrow().events.navigations.clone()
    }

    /// Custom events dispatched on this document.
    pub fn custom_events(&self) -> Vec<String> {
        self.inner.borrow().events.custom_events.clone()
    }

    /// Number of bound listeners of a kind.
    pub fn bound(&self, kind: EventKind) -> usize {
        self.inner.borrow().events.bound(kind)
    }

    /// Number of pending timers.
    pub fn pending_timers(&self) -> usize {
        self.inner.borrow().events.timers.len()
    }

    /// Move the clock forward, returning the timer events that came due.
    pub fn advance(&self, ms: u64) -> Vec<HostEvent> {
        self.inner.borrow_mut().events.advance(ms)
    }

    /// Due time of the earliest pending timer.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.inner.borrow().events.next_due()
    }

    /// Fire the earliest timer due at or before `deadline_ms`, moving the
    /// clock to its due time.
    pub fn fire_next(&self, deadline_ms: u64) -> Option<HostEvent> {
        self.inner
            .borrow_mut()
            .events
            .fire_next(deadline_ms)
            .map(HostEvent::Timer)
    }

    /// Move the clock forward to `ms`. Never moves it back.
    pub fn set_clock(&self, ms: u64) {
        self.inner.borrow_mut().events.set_clock(ms);
    }
}

impl Host for MemoryFrame {
    fn bind(&self, kind: EventKind) -> ListenerId {
        self.inner.borrow_mut().events.bind(kind)
    }

    fn unbind(&self, listener: ListenerId) {
        self.inner.borrow_mut().events.listeners.remove(&listener);
    }

    fn now_ms(&self) -> u64 {
        self.inner.borrow().events.now_ms
    }

    fn set_timeout(&self, delay_ms: u64) -> TimerId {
        self.inner.borrow_mut().events.schedule(delay_ms, None)
    }

    fn set_interval(&self, period_ms: u64) -> TimerId {
        self.inner
            .borrow_mut()
            .events
            .schedule(period_ms, Some(period_ms))
    }

    fn clear_timer(&self, timer: TimerId) {
        self.inner.borrow_mut().events.timers.remove(&timer);
    }

    fn navigate(&self, url: &str) {
        self.inner
            .borrow_mut()
            .events
            .navigations
            .push(url.to_string());
    }

    fn page_y_offset(&self) -> f64 {
        self.inner.borrow().scroll_y
    }

    fn dispatch_custom_event(&self, name: &str) {
        self.inner
            .borrow_mut()
            .events
            .custom_events
            .push(name.to_string());
    }
}

impl ChildHost for MemoryFrame {
    fn location_search(&self) -> String {
        self.inner.borrow().search.clone()
    }

    fn body_offset_height(&self) -> i64 {
        self.inner.borrow().body_height
    }

    fn element_rect(&self, id: &str) -> Result<Rect> {
        let state = self.inner.borrow();
        let top = state
            .elements
            .get(id)
            .ok_or_else(|| HostError::ElementNotFound(id.to_string()))?;
        let top = top - state.scroll_y;
        Ok(Rect {
            top,
            left: 0.0,
            bottom: top,
            right: 0.0,
        })
    }

    fn post_to_parent(&self, message: &str) -> Result<()> {
        self.inner.borrow_mut().events.posted.push(Posted {
            target: None,
            message: message.to_string(),
        });
        Ok(())
    }

    fn is_top_level(&self) -> Result<bool> {
        match self.inner.borrow().embedding {
            EmbeddingMode::Embedded => Ok(false),
            EmbeddingMode::TopLevel => Ok(true),
            EmbeddingMode::AccessDenied => Err(HostError::AccessDenied(
                "reading window.top from a cross-origin frame".to_string(),
            )),
        }
    }

    fn root_class_name(&self) -> String {
        self.inner.borrow().root_class.clone()
    }

    fn set_root_class_name(&self, class_name: &str) {
        self.inner.borrow_mut().root_class = class_name.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timers_fire_in_due_order_and_intervals_repeat() {
        let page = MemoryPage::default();
        let interval = page.set_interval(30);
        let timeout = page.set_timeout(45);

        let fired = page.advance(100);
        assert_eq!(
            fired,
            vec![
                HostEvent::Timer(interval),
                HostEvent::Timer(timeout),
                HostEvent::Timer(interval),
                HostEvent::Timer(interval),
            ]
        );
        assert_eq!(page.now_ms(), 100);
        assert_eq!(page.pending_timers(), 1);

        page.clear_timer(interval);
        assert!(page.advance(1000).is_empty());
    }

    #[test]
    fn stepping_moves_clock_to_each_due_time() {
        let frame = MemoryFrame::new("");
        let interval = frame.set_interval(40);
        assert_eq!(frame.next_due_ms(), Some(40));

        assert_eq!(frame.fire_next(100), Some(HostEvent::Timer(interval)));
        assert_eq!(frame.now_ms(), 40);
        assert_eq!(frame.fire_next(100), Some(HostEvent::Timer(interval)));
        assert_eq!(frame.now_ms(), 80);
        assert_eq!(frame.fire_next(100), None);

        frame.set_clock(100);
        frame.set_clock(90);
        assert_eq!(frame.now_ms(), 100);
        assert_eq!(frame.next_due_ms(), Some(120));
    }

    #[test]
    fn listeners_unbind_by_id() {
        let page = MemoryPage::default();
        let first = page.bind(EventKind::Resize);
        let second = page.bind(EventKind::Resize);
        assert_eq!(page.bound(EventKind::Resize), 2);

        page.unbind(first);
        assert!(!page.is_bound(first));
        assert!(page.is_bound(second));
        assert_eq!(page.bound(EventKind::Resize), 1);
    }

    #[test]
    fn frame_lifecycle_and_state() {
        let page = MemoryPage::default();
        page.add_element("graphic", 150.0, 10.0, 800.0);
        assert_eq!(page.frame_state("graphic"), FrameState::Missing);
        assert_eq!(page.frame_state("nowhere"), FrameState::Missing);

        let spec = FrameSpec {
            src: "child.html".to_string(),
            attributes: vec![("id".to_string(), "graphic-frame".to_string())],
        };
        page.mount_frame("graphic", &spec).unwrap();
        assert_eq!(page.frame_state("graphic"), FrameState::Live);
        assert!(page.has_element("graphic-frame"));

        page.orphan_frame("graphic");
        assert_eq!(page.frame_state("graphic"), FrameState::Detached);
        assert!(page.post_to_frame("graphic", "x").is_err());

        assert!(page.detach_frame("graphic"));
        assert!(!page.detach_frame("graphic"));
        assert_eq!(page.frame_state("graphic"), FrameState::Missing);
    }

    #[test]
    fn geometry_follows_scroll_and_height_attribute() {
        let page = MemoryPage::default();
        page.add_element("graphic", 150.0, 10.0, 800.0);
        page.mount_frame("graphic", &FrameSpec::default()).unwrap();
        page.set_frame_attribute("graphic", "height", "400px").unwrap();
        page.set_scroll_y(50.0);

        let rect = page.frame_rect("graphic").unwrap();
        assert_eq!(
            rect,
            Rect {
                top: 100.0,
                left: 10.0,
                bottom: 500.0,
                right: 810.0
            }
        );
        assert_eq!(page.bounding_rect("graphic").unwrap().top, 100.0);
        assert_eq!(page.offset_width("graphic").unwrap(), 800);
    }

    #[test]
    fn nan_scroll_goes_to_top() {
        let page = MemoryPage::default();
        page.set_scroll_y(300.0);
        page.scroll_to(0.0, f64::NAN);
        assert_eq!(page.scroll_y(), 0.0);
        assert_eq!(page.scrolls().len(), 1);
    }

    #[test]
    fn frame_document_reads_search_from_src() {
        let frame = MemoryFrame::from_src("child.html?initialWidth=800&childId=g#top");
        assert_eq!(frame.location_search(), "?initialWidth=800&childId=g");
        assert_eq!(MemoryFrame::from_src("child.html").location_search(), "");
    }

    #[test]
    fn embedding_modes() {
        let frame = MemoryFrame::new("");
        assert_eq!(frame.is_top_level(), Ok(false));
        frame.set_embedding(EmbeddingMode::TopLevel);
        assert_eq!(frame.is_top_level(), Ok(true));
        frame.set_embedding(EmbeddingMode::AccessDenied);
        assert!(matches!(frame.is_top_level(), Err(HostError::AccessDenied(_))));
    }
}
