//! Host traits over the live browser window.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use pymprims_host::{
    ChildHost, EventKind, FrameSpec, FrameState, Host, HostError, HostEvent, InboundMessage,
    ListenerId, MessageData, ParentHost, Rect, Result, TimerId, Viewport,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    CustomEvent, CustomEventInit, Document, DomRect, Element, Event, HtmlElement,
    HtmlIFrameElement, MessageEvent, Window,
};

type Sink = Rc<dyn Fn(&HostEvent)>;

struct BoundListener {
    kind: EventKind,
    callback: Closure<dyn FnMut(Event)>,
}

struct ScheduledTimer {
    handle: i32,
    repeating: bool,
    fired: Rc<Cell<bool>>,
    callback: Closure<dyn FnMut()>,
}

struct Inner {
    window: Window,
    document: Document,
    sink: RefCell<Option<Sink>>,
    next_id: Cell<u64>,
    listeners: RefCell<BTreeMap<ListenerId, BoundListener>>,
    timers: RefCell<BTreeMap<TimerId, ScheduledTimer>>,
    // Callbacks unbound while they may still be on the JS stack. Released
    // when no event is being emitted.
    emitting: Cell<u32>,
    retired_listeners: RefCell<Vec<Closure<dyn FnMut(Event)>>>,
    retired_timers: RefCell<Vec<Closure<dyn FnMut()>>>,
}

impl Inner {
    fn next_id(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn emit(&self, event: &HostEvent) {
        self.release_retired();
        let sink = self.sink.borrow().clone();
        self.emitting.set(self.emitting.get() + 1);
        match sink {
            Some(sink) => sink(event),
            None => tracing::trace!(?event, "no endpoint attached, dropping event"),
        }
        self.emitting.set(self.emitting.get() - 1);
    }

    /// Drop retired callbacks unless one of them may still be running.
    fn release_retired(&self) {
        if self.emitting.get() > 0 {
            return;
        }
        let listeners = std::mem::take(&mut *self.retired_listeners.borrow_mut());
        let timers = std::mem::take(&mut *self.retired_timers.borrow_mut());
        if !listeners.is_empty() || !timers.is_empty() {
            tracing::trace!(
                listeners = listeners.len(),
                timers = timers.len(),
                "released retired callbacks"
            );
        }
    }

    fn prune_fired_timers(&self) {
        self.timers
            .borrow_mut()
            .retain(|_, timer| timer.repeating || !timer.fired.get());
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        for (_, listener) in std::mem::take(self.listeners.get_mut()) {
            let _ = self.window.remove_event_listener_with_callback(
                event_name(listener.kind),
                listener.callback.as_ref().unchecked_ref(),
            );
        }
        for (_, timer) in std::mem::take(self.timers.get_mut()) {
            clear_handle(&self.window, timer.handle, timer.repeating);
        }
    }
}

/// The current browser window and document.
///
/// Every endpoint gets its own `WebHost`: the host routes the events it
/// produces to the single sink attached with [`WebHost::set_event_sink`].
#[derive(Clone)]
pub struct WebHost {
    inner: Rc<Inner>,
}

impl WebHost {
    /// Bind to the global window.
    pub fn new() -> Result<Self> {
        let window =
            web_sys::window().ok_or_else(|| HostError::Unavailable("window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| HostError::Unavailable("document".to_string()))?;
        Ok(Self {
            inner: Rc::new(Inner {
                window,
                document,
                sink: RefCell::new(None),
                next_id: Cell::new(0),
                listeners: RefCell::new(BTreeMap::new()),
                timers: RefCell::new(BTreeMap::new()),
                emitting: Cell::new(0),
                retired_listeners: RefCell::new(Vec::new()),
                retired_timers: RefCell::new(Vec::new()),
            }),
        })
    }

    /// Route listener and timer events to `sink`, replacing any previous sink.
    pub fn set_event_sink(&self, sink: impl Fn(&HostEvent) + 'static) {
        *self.inner.sink.borrow_mut() = Some(Rc::new(sink));
    }

    fn element(&self, id: &str) -> Result<Element> {
        self.inner
            .document
            .get_element_by_id(id)
            .ok_or_else(|| HostError::ElementNotFound(id.to_string()))
    }

    fn first_frame(&self, container_id: &str) -> Option<Element> {
        self.element(container_id)
            .ok()?
            .get_elements_by_tag_name("iframe")
            .item(0)
    }

    fn frame_window(&self, container_id: &str) -> Result<Window> {
        let frame = self
            .first_frame(container_id)
            .ok_or_else(|| HostError::NoFrame(container_id.to_string()))?;
        frame
            .dyn_into::<HtmlIFrameElement>()
            .ok()
            .and_then(|frame| frame.content_window())
            .ok_or_else(|| HostError::NoFrame(container_id.to_string()))
    }

    fn schedule(&self, delay_ms: u64, repeating: bool) -> TimerId {
        self.inner.release_retired();
        self.inner.prune_fired_timers();

        let id = TimerId(self.inner.next_id());
        let fired = Rc::new(Cell::new(false));
        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        let done = Rc::clone(&fired);
        let callback = Closure::<dyn FnMut()>::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.emit(&HostEvent::Timer(id));
            }
            done.set(true);
        });

        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        let function: &js_sys::Function = callback.as_ref().unchecked_ref();
        let scheduled = if repeating {
            self.inner
                .window
                .set_interval_with_callback_and_timeout_and_arguments_0(function, delay)
        } else {
            self.inner
                .window
                .set_timeout_with_callback_and_timeout_and_arguments_0(function, delay)
        };
        match scheduled {
            Ok(handle) => {
                self.inner.timers.borrow_mut().insert(
                    id,
                    ScheduledTimer {
                        handle,
                        repeating,
                        fired,
                        callback,
                    },
                );
            }
            Err(err) => tracing::warn!(error = ?err, delay_ms, "could not schedule timer"),
        }
        id
    }
}

impl Host for WebHost {
    fn bind(&self, kind: EventKind) -> ListenerId {
        self.inner.release_retired();
        let id = ListenerId(self.inner.next_id());
        let weak = Rc::downgrade(&self.inner);
        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if let Some(event) = translate(kind, event) {
                inner.emit(&event);
            }
        });

        if let Err(err) = self
            .inner
            .window
            .add_event_listener_with_callback(event_name(kind), callback.as_ref().unchecked_ref())
        {
            tracing::warn!(?kind, error = ?err, "could not bind listener");
        }
        self.inner
            .listeners
            .borrow_mut()
            .insert(id, BoundListener { kind, callback });
        id
    }

    fn unbind(&self, listener: ListenerId) {
        let Some(bound) = self.inner.listeners.borrow_mut().remove(&listener) else {
            return;
        };
        let _ = self.inner.window.remove_event_listener_with_callback(
            event_name(bound.kind),
            bound.callback.as_ref().unchecked_ref(),
        );
        self.inner.retired_listeners.borrow_mut().push(bound.callback);
    }

    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    fn set_timeout(&self, delay_ms: u64) -> TimerId {
        self.schedule(delay_ms, false)
    }

    fn set_interval(&self, period_ms: u64) -> TimerId {
        self.schedule(period_ms, true)
    }

    fn clear_timer(&self, timer: TimerId) {
        let Some(scheduled) = self.inner.timers.borrow_mut().remove(&timer) else {
            return;
        };
        clear_handle(&self.inner.window, scheduled.handle, scheduled.repeating);
        self.inner.retired_timers.borrow_mut().push(scheduled.callback);
    }

    fn navigate(&self, url: &str) {
        if let Err(err) = self.inner.window.location().set_href(url) {
            tracing::warn!(url, error = ?err, "navigation failed");
        }
    }

    fn page_y_offset(&self) -> f64 {
        self.inner.window.page_y_offset().unwrap_or(0.0)
    }

    fn dispatch_custom_event(&self, name: &str) {
        let init = CustomEventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        let dispatched = CustomEvent::new_with_event_init_dict(name, &init)
            .and_then(|event| self.inner.document.dispatch_event(&event));
        if let Err(err) = dispatched {
            tracing::warn!(name, error = ?err, "custom event dispatch failed");
        }
    }
}

impl ParentHost for WebHost {
    fn has_element(&self, id: &str) -> bool {
        self.inner.document.get_element_by_id(id).is_some()
    }

    fn location_href(&self) -> String {
        self.inner.window.location().href().unwrap_or_default()
    }

    fn document_title(&self) -> String {
        self.inner.document.title()
    }

    fn offset_width(&self, id: &str) -> Result<i64> {
        let element = self.element(id)?;
        let element = element
            .dyn_into::<HtmlElement>()
            .map_err(|_| HostError::Call(format!("{id} is not an HTML element")))?;
        Ok(i64::from(element.offset_width()))
    }

    fn bounding_rect(&self, id: &str) -> Result<Rect> {
        Ok(to_rect(&self.element(id)?.get_bounding_client_rect()))
    }

    fn viewport(&self) -> Viewport {
        let root = self.inner.document.document_element();
        let fallback = |client: fn(&Element) -> i32| {
            root.as_ref().map_or(0.0, |root| f64::from(client(root)))
        };
        let width = dimension(self.inner.window.inner_width())
            .unwrap_or_else(|| fallback(Element::client_width));
        let height = dimension(self.inner.window.inner_height())
            .unwrap_or_else(|| fallback(Element::client_height));
        Viewport { width, height }
    }

    fn mount_frame(&self, container_id: &str, frame: &FrameSpec) -> Result<()> {
        let container = self.element(container_id)?;
        let iframe = self
            .inner
            .document
            .create_element("iframe")
            .map_err(|err| call_error("create iframe", err))?;
        iframe
            .set_attribute("src", &frame.src)
            .map_err(|err| call_error("set src", err))?;
        for (name, value) in &frame.attributes {
            iframe
                .set_attribute(name, value)
                .map_err(|err| call_error("set frame attribute", err))?;
        }

        while let Some(child) = container.first_child() {
            container
                .remove_child(&child)
                .map_err(|err| call_error("clear container", err))?;
        }
        container
            .append_child(&iframe)
            .map_err(|err| call_error("append frame", err))?;
        Ok(())
    }

    fn frame_state(&self, container_id: &str) -> FrameState {
        match self.first_frame(container_id) {
            None => FrameState::Missing,
            Some(frame) => match frame.dyn_into::<HtmlIFrameElement>() {
                Ok(frame) if frame.content_window().is_some() => FrameState::Live,
                _ => FrameState::Detached,
            },
        }
    }

    fn frame_rect(&self, container_id: &str) -> Result<Rect> {
        let frame = self
            .first_frame(container_id)
            .ok_or_else(|| HostError::NoFrame(container_id.to_string()))?;
        Ok(to_rect(&frame.get_bounding_client_rect()))
    }

    fn set_frame_attribute(&self, container_id: &str, name: &str, value: &str) -> Result<()> {
        let frame = self
            .first_frame(container_id)
            .ok_or_else(|| HostError::NoFrame(container_id.to_string()))?;
        frame
            .set_attribute(name, value)
            .map_err(|err| call_error("set frame attribute", err))
    }

    fn detach_frame(&self, container_id: &str) -> bool {
        match self.first_frame(container_id) {
            Some(frame) => {
                frame.remove();
                true
            }
            None => false,
        }
    }

    fn post_to_frame(&self, container_id: &str, message: &str) -> Result<()> {
        self.frame_window(container_id)?
            .post_message(&JsValue::from_str(message), "*")
            .map_err(|err| call_error("post to frame", err))
    }

    fn scroll_to(&self, x: f64, y: f64) {
        self.inner.window.scroll_to_with_x_and_y(x, y);
    }
}

impl ChildHost for WebHost {
    fn location_search(&self) -> String {
        self.inner.window.location().search().unwrap_or_default()
    }

    fn body_offset_height(&self) -> i64 {
        self.inner
            .document
            .body()
            .map_or(0, |body| i64::from(body.offset_height()))
    }

    fn element_rect(&self, id: &str) -> Result<Rect> {
        self.bounding_rect(id)
    }

    fn post_to_parent(&self, message: &str) -> Result<()> {
        let parent = self
            .inner
            .window
            .parent()
            .map_err(|err| call_error("read parent window", err))?
            .ok_or_else(|| HostError::Unavailable("parent window".to_string()))?;
        parent
            .post_message(&JsValue::from_str(message), "*")
            .map_err(|err| call_error("post to parent", err))
    }

    fn is_top_level(&self) -> Result<bool> {
        let top = self
            .inner
            .window
            .top()
            .map_err(|err| HostError::AccessDenied(format!("window.top: {err:?}")))?;
        Ok(match top {
            Some(top) => js_sys::Object::is(top.as_ref(), self.inner.window.as_ref()),
            None => true,
        })
    }

    fn root_class_name(&self) -> String {
        self.inner
            .document
            .document_element()
            .map(|root| root.class_name())
            .unwrap_or_default()
    }

    fn set_root_class_name(&self, class_name: &str) {
        if let Some(root) = self.inner.document.document_element() {
            root.set_class_name(class_name);
        }
    }
}

impl fmt::Debug for WebHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebHost")
            .field("listeners", &self.inner.listeners.borrow().len())
            .field("timers", &self.inner.timers.borrow().len())
            .finish()
    }
}

fn translate(kind: EventKind, event: Event) -> Option<HostEvent> {
    match kind {
        EventKind::Message => {
            let event = event.dyn_into::<MessageEvent>().ok()?;
            let data = match event.data().as_string() {
                Some(text) => MessageData::Text(text),
                None => MessageData::Structured,
            };
            Some(HostEvent::Message(InboundMessage {
                origin: event.origin(),
                data,
            }))
        }
        EventKind::Resize => Some(HostEvent::Resize),
        EventKind::Scroll => Some(HostEvent::Scroll),
    }
}

fn event_name(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Message => "message",
        EventKind::Resize => "resize",
        EventKind::Scroll => "scroll",
    }
}

fn clear_handle(window: &Window, handle: i32, repeating: bool) {
    if repeating {
        window.clear_interval_with_handle(handle);
    } else {
        window.clear_timeout_with_handle(handle);
    }
}

fn to_rect(rect: &DomRect) -> Rect {
    Rect {
        top: rect.top(),
        left: rect.left(),
        bottom: rect.bottom(),
        right: rect.right(),
    }
}

// `innerWidth` and `innerHeight` can read as 0 in some embedded contexts.
fn dimension(value: std::result::Result<JsValue, JsValue>) -> Option<f64> {
    value
        .ok()
        .and_then(|value| value.as_f64())
        .filter(|value| *value != 0.0)
}

fn call_error(context: &str, err: JsValue) -> HostError {
    HostError::Call(format!("{context}: {err:?}"))
}
