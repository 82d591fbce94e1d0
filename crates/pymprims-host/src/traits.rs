use crate::error::Result;

/// Identifies one bound event listener.
///
/// Unbinding by id is deterministic: the host keeps the callback that was bound
/// under this id and removes exactly that one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// Identifies one scheduled timeout or interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

/// Window events an endpoint can listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    /// Cross-document messages.
    Message,
    /// Viewport resizes.
    Resize,
    /// Window scrolls.
    Scroll,
}

/// The data carried by a cross-document message.
///
/// Browsers deliver whatever the sender posted. Only strings are protocol
/// messages; everything else is kept opaque so it can be ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageData {
    /// A string payload.
    Text(String),
    /// Any non-string payload (objects, arrays, numbers, transferables).
    Structured,
}

/// A cross-document message as delivered to a window listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// The sender's origin, e.g. `https://example.com`.
    pub origin: String,
    /// The posted data.
    pub data: MessageData,
}

impl InboundMessage {
    /// A string message from `origin`.
    pub fn text(origin: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            data: MessageData::Text(data.into()),
        }
    }

    /// A non-string message from `origin`.
    pub fn structured(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            data: MessageData::Structured,
        }
    }
}

/// An event delivered by the host to an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A cross-document message arrived.
    Message(InboundMessage),
    /// The viewport was resized.
    Resize,
    /// The window scrolled.
    Scroll,
    /// A timeout or interval fired.
    Timer(TimerId),
}

impl HostEvent {
    /// The listener kind that receives this event, if any.
    pub fn kind(&self) -> Option<EventKind> {
        match self {
            HostEvent::Message(_) => Some(EventKind::Message),
            HostEvent::Resize => Some(EventKind::Resize),
            HostEvent::Scroll => Some(EventKind::Scroll),
            HostEvent::Timer(_) => None,
        }
    }
}

/// An element's bounding rectangle relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

/// Viewport dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Whether a container's frame can currently receive messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// The container holds no frame element.
    Missing,
    /// A frame element exists but its content window is unreachable.
    Detached,
    /// The frame has a content window.
    Live,
}

/// A frame element to mount into a container.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameSpec {
    /// The frame `src`.
    pub src: String,
    /// Attributes in the order they are set.
    pub attributes: Vec<(String, String)>,
}

impl FrameSpec {
    /// Value of an attribute, if set.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Capabilities shared by parent and child documents.
///
/// Methods take `&self`: a host is a handle onto a shared, mutable document.
pub trait Host {
    /// Bind a window listener. Events of this kind are then routed to the endpoint.
    fn bind(&self, kind: EventKind) -> ListenerId;

    /// Unbind a listener previously returned by [`Host::bind`].
    fn unbind(&self, listener: ListenerId);

    /// Milliseconds on the host clock.
    fn now_ms(&self) -> u64;

    /// Schedule a one-shot [`HostEvent::Timer`].
    fn set_timeout(&self, delay_ms: u64) -> TimerId;

    /// Schedule a recurring [`HostEvent::Timer`].
    fn set_interval(&self, period_ms: u64) -> TimerId;

    /// Cancel a timeout or interval. Unknown ids are ignored.
    fn clear_timer(&self, timer: TimerId);

    /// Navigate this document to `url`.
    fn navigate(&self, url: &str);

    /// Vertical scroll offset of this document.
    fn page_y_offset(&self) -> f64;

    /// Dispatch a bubbling, cancelable custom event on the document.
    fn dispatch_custom_event(&self, name: &str);
}

/// Capabilities of the document that embeds frames.
pub trait ParentHost: Host {
    /// Returns true if an element with `id` exists.
    fn has_element(&self, id: &str) -> bool;

    /// The current document URL.
    fn location_href(&self) -> String;

    /// The current document title.
    fn document_title(&self) -> String;

    /// Rendered width of an element, rounded to whole pixels.
    fn offset_width(&self, id: &str) -> Result<i64>;

    /// Bounding rectangle of an element.
    fn bounding_rect(&self, id: &str) -> Result<Rect>;

    /// Current viewport size.
    fn viewport(&self) -> Viewport;

    /// Replace the container's content with a new frame element.
    fn mount_frame(&self, container_id: &str, frame: &FrameSpec) -> Result<()>;

    /// Reachability of the container's first frame, looked up fresh.
    fn frame_state(&self, container_id: &str) -> FrameState;

    /// Bounding rectangle of the container's first frame.
    fn frame_rect(&self, container_id: &str) -> Result<Rect>;

    /// Set an attribute on the container's first frame.
    fn set_frame_attribute(&self, container_id: &str, name: &str, value: &str) -> Result<()>;

    /// Remove the container's first frame. Returns false if there was none.
    fn detach_frame(&self, container_id: &str) -> bool;

    /// Post a string to the content window of the container's first frame.
    fn post_to_frame(&self, container_id: &str, message: &str) -> Result<()>;

    /// Scroll the window to document coordinates.
    fn scroll_to(&self, x: f64, y: f64);
}

/// Capabilities of the document loaded inside a frame.
pub trait ChildHost: Host {
    /// The `location.search` string, including the leading `?`.
    fn location_search(&self) -> String;

    /// Rendered height of the body, rounded to whole pixels.
    fn body_offset_height(&self) -> i64;

    /// Bounding rectangle of an element in this document.
    fn element_rect(&self, id: &str) -> Result<Rect>;

    /// Post a string to the parent window.
    fn post_to_parent(&self, message: &str) -> Result<()>;

    /// Whether this window is the top-level window.
    ///
    /// An error means the comparison itself was blocked.
    fn is_top_level(&self) -> Result<bool>;

    /// The root element's `class` attribute.
    fn root_class_name(&self) -> String;

    /// Replace the root element's `class` attribute.
    fn set_root_class_name(&self, class_name: &str);
}
