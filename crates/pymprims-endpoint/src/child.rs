use pymprims_host::{
    ChildHost, EventKind, HostEvent, InboundMessage, ListenerId, MessageData, TimerId,
};
use pymprims_wire::{
    decode, encode, format_js_number, is_safe_message, is_safe_url, message_type,
    parameter_by_name, parse_int, try_encode, validate_channel_id, OriginPattern, SizeValue,
    CHILD_ID_PARAM, INITIAL_WIDTH_PARAM, PARENT_TITLE_PARAM,
};

use crate::config::{ChildConfig, ChildSettings};
use crate::error::{EndpointError, Result};
use crate::handlers::{Dispatch, HandlerTable};

/// Root class applied when the document is framed.
pub const EMBEDDED_CLASS: &str = "embedded";

/// Root class applied when the document is the top-level window.
pub const NOT_EMBEDDED_CLASS: &str = "not-embedded";

/// Custom event dispatched after the embedding class is applied.
pub const MARKED_EMBEDDED_EVENT: &str = "pym:marked-embedded";

/// The embedded side of one channel.
///
/// Construction does the whole boot sequence: it reads the channel id and
/// parent metadata from the frame URL, reports the initial height, starts
/// polling if configured, and marks the root element as embedded or not.
#[derive(Debug)]
pub struct Child<H: ChildHost> {
    sender: ChildSender<H>,
    settings: ChildSettings,
    origin: OriginPattern,
    handlers: HandlerTable<Child<H>>,
    initial_width: SizeValue,
    parent_width: Option<SizeValue>,
    parent_url: Option<String>,
    parent_title: Option<String>,
    message_listener: Option<ListenerId>,
    polling_timer: Option<TimerId>,
    removed: bool,
}

impl<H: ChildHost + 'static> Child<H> {
    /// Boot a child in the document `host` represents.
    ///
    /// The channel id comes from the `childId` query parameter, falling back
    /// to the configured id. Fails if neither is usable.
    pub fn new(host: H, config: ChildConfig) -> Result<Self> {
        let settings = ChildSettings::from(config);
        let search = host.location_search();

        let id = parameter_by_name(&search, CHILD_ID_PARAM)
            .filter(|id| !id.is_empty())
            .or_else(|| settings.id.clone().filter(|id| !id.is_empty()))
            .ok_or(EndpointError::MissingChannelId)?;
        validate_channel_id(&id)?;
        let origin = OriginPattern::new(&settings.xdomain)?;

        let initial_width = parse_int(
            &parameter_by_name(&search, INITIAL_WIDTH_PARAM).unwrap_or_default(),
        );
        let parent_url = parameter_by_name(&search, &settings.parent_url_param);
        let parent_title = parameter_by_name(&search, PARENT_TITLE_PARAM);

        let mut child = Self {
            sender: ChildSender { host, id },
            settings,
            origin,
            handlers: HandlerTable::new(),
            initial_width,
            parent_width: None,
            parent_url,
            parent_title,
            message_listener: None,
            polling_timer: None,
            removed: false,
        };

        child.on_message(message_type::WIDTH, Self::on_width_message);
        child.on_message(message_type::NAVIGATE_TO, Self::on_navigate_to_message);
        child.message_listener = Some(child.sender.host.bind(EventKind::Message));

        if let Some(render) = child.settings.render_callback.clone() {
            render(initial_width);
        }
        child.sender.send_height();

        if child.settings.polling > 0 {
            child.polling_timer = Some(child.sender.host.set_interval(child.settings.polling));
        }

        child.mark_whether_embedded();

        tracing::debug!(id = %child.sender.id, %initial_width, "child endpoint ready");
        Ok(child)
    }

    /// Deliver a host event. Events for listeners or timers this child no
    /// longer holds are ignored.
    pub fn handle_event(&mut self, event: &HostEvent) {
        match event {
            HostEvent::Message(message) if self.message_listener.is_some() => {
                self.process_message(message);
            }
            HostEvent::Timer(timer) if self.polling_timer == Some(*timer) => {
                self.sender.send_height();
            }
            _ => {}
        }
    }

    /// Run an inbound message through the origin guard and the channel
    /// decoder, then dispatch it. Anything that fails either step is dropped.
    pub fn process_message(&mut self, message: &InboundMessage) {
        if !is_safe_message(&message.origin, &self.origin, &message.data) {
            return;
        }
        let MessageData::Text(data) = &message.data else {
            return;
        };
        let Some(decoded) = decode(data, &self.sender.id) else {
            tracing::trace!(id = %self.sender.id, "dropping message for another channel");
            return;
        };

        tracing::debug!(
            id = %self.sender.id,
            message_type = %decoded.message_type,
            "child received message"
        );
        self.dispatch(&decoded.message_type, &decoded.payload);
    }

    fn on_width_message(&mut self, payload: &str) {
        let width = parse_int(payload);
        let changed = self
            .parent_width
            .is_none_or(|current| width.differs_from(current));
        if !changed {
            return;
        }

        tracing::debug!(id = %self.sender.id, %width, "parent width changed");
        self.parent_width = Some(width);
        if let Some(render) = self.settings.render_callback.clone() {
            render(width);
        }
        self.send_height();
    }

    fn on_navigate_to_message(&mut self, url: &str) {
        if !is_safe_url(url) {
            tracing::warn!(id = %self.sender.id, url, "refusing unsafe navigation");
            return;
        }
        self.sender.host.navigate(url);
    }

    fn mark_whether_embedded(&mut self) {
        let class = match self.sender.host.is_top_level() {
            Ok(false) => EMBEDDED_CLASS,
            Ok(true) => NOT_EMBEDDED_CLASS,
            Err(err) => {
                tracing::debug!(error = %err, "top window unreadable, assuming embedded");
                EMBEDDED_CLASS
            }
        };

        let current = self.sender.host.root_class_name();
        if current.split_whitespace().any(|existing| existing == class) {
            return;
        }
        let updated = if current.is_empty() {
            class.to_string()
        } else {
            format!("{current} {class}")
        };
        self.sender.host.set_root_class_name(&updated);

        if let Some(status) = self.settings.on_marked_embedded_status.clone() {
            status(class);
        }
        self.sender.host.dispatch_custom_event(MARKED_EMBEDDED_EVENT);
    }
}

impl<H: ChildHost> Child<H> {
    /// Send a message to the parent.
    pub fn send_message(&self, message_type: &str, payload: &str) -> Result<()> {
        self.sender.send_message(message_type, payload)
    }

    /// Measure the body and send its height to the parent. Returns the height.
    pub fn send_height(&self) -> i64 {
        self.sender.send_height()
    }

    /// Ask the parent for viewport and frame geometry.
    ///
    /// The reply arrives as a `viewport-iframe-position` message.
    pub fn get_parent_position_info(&self) {
        self.sender.get_parent_position_info();
    }

    /// Ask the parent to jump to `#hash` in its own document.
    pub fn scroll_parent_to(&self, hash: &str) {
        self.sender.scroll_parent_to(hash);
    }

    /// Ask the parent to navigate to `url`. The parent validates it.
    pub fn navigate_parent_to(&self, url: &str) {
        self.sender.navigate_parent_to(url);
    }

    /// Ask the parent to scroll to an element of this document.
    pub fn scroll_parent_to_child_el(&self, element_id: &str) -> Result<()> {
        self.sender.scroll_parent_to_child_el(element_id)
    }

    /// Ask the parent to scroll to `offset` pixels below the top of the frame.
    pub fn scroll_parent_to_child_pos(&self, offset: f64) {
        self.sender.scroll_parent_to_child_pos(offset);
    }

    /// Tear down: unbind the message listener and stop polling.
    pub fn remove(&mut self) {
        if let Some(listener) = self.message_listener.take() {
            self.sender.host.unbind(listener);
        }
        if let Some(timer) = self.polling_timer.take() {
            self.sender.host.clear_timer(timer);
        }
        self.removed = true;
    }

    /// A handle that sends to the parent without borrowing this child.
    ///
    /// Useful from callbacks that run while the child is dispatching.
    pub fn sender(&self) -> ChildSender<H>
    where
        H: Clone,
    {
        self.sender.clone()
    }

    /// The channel id.
    pub fn id(&self) -> &str {
        &self.sender.id
    }

    /// Width the parent reported in the frame URL.
    pub fn initial_width(&self) -> SizeValue {
        self.initial_width
    }

    /// Last width received in a `width` message.
    pub fn parent_width(&self) -> Option<SizeValue> {
        self.parent_width
    }

    /// Parent URL from the frame URL.
    pub fn parent_url(&self) -> Option<&str> {
        self.parent_url.as_deref()
    }

    /// Parent title from the frame URL.
    pub fn parent_title(&self) -> Option<&str> {
        self.parent_title.as_deref()
    }

    /// Merged settings.
    pub fn settings(&self) -> &ChildSettings {
        &self.settings
    }

    /// The host this child runs in.
    pub fn host(&self) -> &H {
        &self.sender.host
    }

    /// Returns true once [`Child::remove`] has run.
    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

/// The sending half of a [`Child`]: its host and channel id.
#[derive(Debug, Clone)]
pub struct ChildSender<H> {
    host: H,
    id: String,
}

impl<H: ChildHost> ChildSender<H> {
    /// Send a message to the parent.
    pub fn send_message(&self, message_type: &str, payload: &str) -> Result<()> {
        let wire = try_encode(&self.id, message_type, payload)?;
        self.deliver(&wire);
        Ok(())
    }

    fn deliver(&self, wire: &str) {
        if let Err(err) = self.host.post_to_parent(wire) {
            tracing::warn!(id = %self.id, error = %err, "failed to post to parent");
        }
    }

    fn send_builtin(&self, message_type: &str, payload: &str) {
        self.deliver(&encode(&self.id, message_type, payload));
    }

    /// Measure the body and send its height to the parent. Returns the height.
    pub fn send_height(&self) -> i64 {
        let height = self.host.body_offset_height();
        self.send_builtin(message_type::HEIGHT, &height.to_string());
        height
    }

    /// Ask the parent for viewport and frame geometry.
    pub fn get_parent_position_info(&self) {
        self.send_builtin(message_type::PARENT_POSITION_INFO, "");
    }

    /// Ask the parent to jump to `#hash` in its own document.
    pub fn scroll_parent_to(&self, hash: &str) {
        self.send_builtin(message_type::NAVIGATE_TO, &format!("#{hash}"));
    }

    /// Ask the parent to navigate to `url`.
    pub fn navigate_parent_to(&self, url: &str) {
        self.send_builtin(message_type::NAVIGATE_TO, url);
    }

    /// Ask the parent to scroll to an element of this document.
    pub fn scroll_parent_to_child_el(&self, element_id: &str) -> Result<()> {
        let rect = self.host.element_rect(element_id)?;
        self.scroll_parent_to_child_pos(rect.top + self.host.page_y_offset());
        Ok(())
    }

    /// Ask the parent to scroll to `offset` pixels below the top of the frame.
    pub fn scroll_parent_to_child_pos(&self, offset: f64) {
        self.send_builtin(message_type::SCROLL_TO_CHILD_POS, &format_js_number(offset));
    }

    /// The channel id.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl<H: ChildHost> Dispatch for Child<H> {
    fn handlers(&self) -> &HandlerTable<Self> {
        &self.handlers
    }

    fn handlers_mut(&mut self) -> &mut HandlerTable<Self> {
        &mut self.handlers
    }
}
