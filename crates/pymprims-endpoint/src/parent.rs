use pymprims_host::{
    EventKind, FrameSpec, FrameState, HostEvent, InboundMessage, ListenerId, MessageData,
    ParentHost,
};
use pymprims_wire::{
    build_frame_src, decode, encode, format_js_number, is_safe_message, is_safe_url, message_type,
    parse_int, try_encode, validate_channel_id, FrameSrc, OriginPattern, ParentParams,
};

use crate::config::{ParentConfig, ParentSettings};
use crate::error::{EndpointError, Result};
use crate::handlers::{Dispatch, HandlerTable};
use crate::instances::RegistryHandle;
use crate::throttle::Throttle;

/// The embedding side of one channel.
///
/// A parent owns one container element, mounts one frame into it, and talks to
/// the child document loaded in that frame. The container id is the channel id.
///
/// A parent does nothing on its own: feed it the events its host delivers with
/// [`Parent::handle_event`].
#[derive(Debug)]
pub struct Parent<H: ParentHost> {
    host: H,
    id: String,
    url: String,
    settings: ParentSettings,
    origin: OriginPattern,
    handlers: HandlerTable<Parent<H>>,
    frame_src: String,
    message_listener: Option<ListenerId>,
    resize_listener: Option<ListenerId>,
    scroll_listener: Option<ListenerId>,
    scroll_throttle: Option<Throttle>,
    registry: Option<RegistryHandle<H>>,
    removed: bool,
}

impl<H: ParentHost + Clone + 'static> Parent<H> {
    /// Mount a frame loading `url` into the container `container_id`.
    ///
    /// Fails if the container does not exist, if its id cannot serve as a
    /// channel id, or if the origin pattern does not compile.
    pub fn new(host: H, container_id: &str, url: &str, config: ParentConfig) -> Result<Self> {
        if !host.has_element(container_id) {
            return Err(EndpointError::ContainerNotFound(container_id.to_string()));
        }
        validate_channel_id(container_id)?;

        let settings = ParentSettings::resolve(config, &host.location_href());
        let origin = OriginPattern::new(&settings.xdomain)?;

        let mut parent = Self {
            host,
            id: container_id.to_string(),
            url: url.to_string(),
            settings,
            origin,
            handlers: HandlerTable::new(),
            frame_src: String::new(),
            message_listener: None,
            resize_listener: None,
            scroll_listener: None,
            scroll_throttle: None,
            registry: None,
            removed: false,
        };

        parent.on_message(message_type::HEIGHT, Self::on_height_message);
        parent.on_message(message_type::NAVIGATE_TO, Self::on_navigate_to_message);
        parent.on_message(
            message_type::SCROLL_TO_CHILD_POS,
            Self::on_scroll_to_child_pos_message,
        );
        parent.on_message(
            message_type::PARENT_POSITION_INFO,
            Self::on_parent_position_info_message,
        );

        parent.construct_frame()?;
        parent.message_listener = Some(parent.host.bind(EventKind::Message));

        tracing::debug!(id = %parent.id, src = %parent.frame_src, "parent endpoint ready");
        Ok(parent)
    }

    fn construct_frame(&mut self) -> Result<()> {
        let width = self.host.offset_width(&self.id)?;

        let parent = self.settings.optional_params.then(|| ParentParams {
            title: self.host.document_title(),
            url_param: self.settings.parent_url_param.clone(),
            url_value: self.settings.parent_url_value.clone(),
        });
        self.frame_src = build_frame_src(&FrameSrc {
            base_url: self.url.clone(),
            initial_width: width,
            child_id: self.id.clone(),
            parent,
        });

        let mut attributes = vec![
            attr("width", "100%"),
            attr("scrolling", "no"),
            attr("marginheight", "0"),
            attr("frameborder", "0"),
        ];
        if let Some(title) = non_empty(&self.settings.title) {
            attributes.push(attr("title", title));
        }
        if self.settings.allowfullscreen {
            attributes.push(attr("allowfullscreen", ""));
        }
        if let Some(sandbox) = self.settings.sandbox.as_deref() {
            attributes.push(attr("sandbox", sandbox));
        }
        if let Some(id) = non_empty(&self.settings.id) {
            if self.host.has_element(id) {
                tracing::debug!(frame_id = id, "frame id already taken, leaving it unset");
            } else {
                attributes.push(attr("id", id));
            }
        }
        if let Some(name) = non_empty(&self.settings.name) {
            attributes.push(attr("name", name));
        }

        let frame = FrameSpec {
            src: self.frame_src.clone(),
            attributes,
        };
        self.host.mount_frame(&self.id, &frame)?;

        self.resize_listener = Some(self.host.bind(EventKind::Resize));
        if self.settings.track_scroll {
            self.scroll_listener = Some(self.host.bind(EventKind::Scroll));
            self.scroll_throttle = Some(Throttle::new(self.settings.scroll_wait));
        }
        Ok(())
    }

    /// Deliver a host event. Events for listeners this parent no longer holds
    /// are ignored.
    pub fn handle_event(&mut self, event: &HostEvent) {
        match event {
            HostEvent::Message(message) if self.message_listener.is_some() => {
                self.process_message(message);
            }
            HostEvent::Resize if self.resize_listener.is_some() => self.on_resize(),
            HostEvent::Scroll if self.scroll_listener.is_some() => {
                let fire = self
                    .scroll_throttle
                    .as_mut()
                    .is_some_and(|throttle| throttle.call(&self.host));
                if fire {
                    self.report_position();
                }
            }
            HostEvent::Timer(timer) => {
                let fire = self
                    .scroll_throttle
                    .as_mut()
                    .is_some_and(|throttle| throttle.on_timer(*timer, &self.host));
                if fire {
                    self.report_position();
                }
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
        let Some(decoded) = decode(data, &self.id) else {
            tracing::trace!(id = %self.id, "dropping message for another channel");
            return;
        };

        tracing::debug!(
            id = %self.id,
            message_type = %decoded.message_type,
            "parent received message"
        );
        self.dispatch(&decoded.message_type, &decoded.payload);
    }

    /// Send a message to the child.
    ///
    /// The frame is looked up fresh. If it is gone or has no content window the
    /// parent tears itself down and the message is dropped.
    pub fn send_message(&mut self, message_type: &str, payload: &str) -> Result<()> {
        let wire = try_encode(&self.id, message_type, payload)?;
        self.deliver(&wire);
        Ok(())
    }

    fn deliver(&mut self, wire: &str) {
        match self.host.frame_state(&self.id) {
            FrameState::Live => {
                if let Err(err) = self.host.post_to_frame(&self.id, wire) {
                    tracing::warn!(id = %self.id, error = %err, "failed to post to child");
                }
            }
            state => {
                tracing::warn!(id = %self.id, ?state, "child frame is orphaned, removing parent");
                self.remove();
            }
        }
    }

    /// Send the container's current width to the child.
    pub fn send_width(&mut self) -> Result<()> {
        let width = self.host.offset_width(&self.id)?;
        self.deliver(&encode(&self.id, message_type::WIDTH, &width.to_string()));
        Ok(())
    }

    /// Send `"vw vh top left bottom right"`: viewport size and the frame's
    /// bounding rectangle.
    pub fn send_viewport_and_iframe_position(&mut self) {
        let viewport = self.host.viewport();
        // A frame that is gone reports an empty rectangle; delivery then
        // handles the orphan.
        let rect = self.host.frame_rect(&self.id).unwrap_or_default();
        let payload = [
            viewport.width,
            viewport.height,
            rect.top,
            rect.left,
            rect.bottom,
            rect.right,
        ]
        .map(format_js_number)
        .join(" ");
        self.deliver(&encode(
            &self.id,
            message_type::VIEWPORT_IFRAME_POSITION,
            &payload,
        ));
    }

    /// Tear down: unbind listeners, cancel the scroll timer, detach the frame
    /// and sweep the instance registry this parent is tracked in.
    ///
    /// Calling it again is harmless.
    pub fn remove(&mut self) {
        for listener in [
            self.message_listener.take(),
            self.resize_listener.take(),
            self.scroll_listener.take(),
        ]
        .into_iter()
        .flatten()
        {
            self.host.unbind(listener);
        }
        if let Some(throttle) = self.scroll_throttle.as_mut() {
            throttle.cancel(&self.host);
        }
        if self.host.detach_frame(&self.id) {
            tracing::debug!(id = %self.id, "detached child frame");
        }
        self.removed = true;

        if let Some(registry) = self.registry.as_ref().and_then(RegistryHandle::upgrade) {
            registry.sweep();
        }
    }

    fn on_resize(&mut self) {
        if let Err(err) = self.send_width() {
            tracing::warn!(id = %self.id, error = %err, "could not measure container");
        }
        if self.settings.track_scroll {
            self.send_viewport_and_iframe_position();
        }
    }

    fn report_position(&mut self) {
        self.send_viewport_and_iframe_position();
    }

    fn on_height_message(&mut self, payload: &str) {
        let height = format!("{}px", parse_int(payload));
        if let Err(err) = self.host.set_frame_attribute(&self.id, "height", &height) {
            tracing::debug!(id = %self.id, error = %err, "no frame to resize");
            return;
        }
        tracing::debug!(id = %self.id, %height, "resized child frame");
    }

    fn on_navigate_to_message(&mut self, url: &str) {
        if !is_safe_url(url) {
            tracing::warn!(id = %self.id, url, "refusing unsafe navigation");
            return;
        }
        self.host.navigate(url);
    }

    fn on_scroll_to_child_pos_message(&mut self, payload: &str) {
        let container_top = match self.host.bounding_rect(&self.id) {
            Ok(rect) => rect.top + self.host.page_y_offset(),
            Err(err) => {
                tracing::debug!(id = %self.id, error = %err, "container is gone");
                return;
            }
        };
        self.host
            .scroll_to(0.0, container_top + parse_int(payload).as_f64());
    }

    fn on_parent_position_info_message(&mut self, _payload: &str) {
        self.send_viewport_and_iframe_position();
    }

    pub(crate) fn attach_registry(&mut self, registry: RegistryHandle<H>) {
        self.registry = Some(registry);
    }
}

impl<H: ParentHost> Parent<H> {
    /// The channel id, which is also the container id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The base URL the frame was built from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The `src` the frame was mounted with.
    pub fn frame_src(&self) -> &str {
        &self.frame_src
    }

    /// Merged settings.
    pub fn settings(&self) -> &ParentSettings {
        &self.settings
    }

    /// The host this parent runs against.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Returns true once [`Parent::remove`] has run.
    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

impl<H: ParentHost> Dispatch for Parent<H> {
    fn handlers(&self) -> &HandlerTable<Self> {
        &self.handlers
    }

    fn handlers_mut(&mut self) -> &mut HandlerTable<Self> {
        &mut self.handlers
    }
}

fn attr(name: &str, value: &str) -> (String, String) {
    (name.to_string(), value.to_string())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}
