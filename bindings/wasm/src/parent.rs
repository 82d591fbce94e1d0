use std::cell::{RefCell, RefMut};
use std::rc::{Rc, Weak};

use js_sys::Function;
use pymprims_endpoint::{Dispatch, Parent, ParentConfig, SharedParent};
use pymprims_wire::try_encode;
use wasm_bindgen::prelude::*;

use crate::error::{invalid_state, to_js_error};
use crate::host::WebHost;

/// A call made from a callback while the parent was dispatching.
#[derive(Debug)]
enum Deferred {
    Message(String, String),
    Width,
    Position,
    Remove,
}

type Outbox = Rc<RefCell<Vec<Deferred>>>;

/// The embedding side of one channel, bound to the live document.
///
/// Calls made from a callback while the parent is dispatching are queued and
/// run, in order, once the dispatch returns.
#[wasm_bindgen(js_name = Parent)]
pub struct PymParent {
    inner: SharedParent<WebHost>,
    outbox: Outbox,
    id: String,
    url: String,
    frame_src: String,
}

impl PymParent {
    /// Wrap a parent and route its host's events to it.
    pub(crate) fn attach(shared: SharedParent<WebHost>) -> Self {
        let outbox: Outbox = Rc::new(RefCell::new(Vec::new()));
        let weak = Rc::downgrade(&shared);
        let queued = Rc::clone(&outbox);
        shared.borrow().host().set_event_sink(move |event| {
            let Some(parent) = weak.upgrade() else {
                return;
            };
            let Ok(mut parent) = parent.try_borrow_mut() else {
                tracing::debug!(?event, "parent busy, dropping re-entrant event");
                return;
            };
            parent.handle_event(event);
            flush(&mut parent, &queued);
        });
        let (id, url, frame_src) = {
            let parent = shared.borrow();
            (
                parent.id().to_string(),
                parent.url().to_string(),
                parent.frame_src().to_string(),
            )
        };
        Self {
            inner: shared,
            outbox,
            id,
            url,
            frame_src,
        }
    }

    fn parent_mut(&self) -> Result<RefMut<'_, Parent<WebHost>>, JsError> {
        self.inner
            .try_borrow_mut()
            .map_err(|_| invalid_state("parent is busy"))
    }

    /// Run `call` now, or queue `deferred` if the parent is dispatching.
    fn now_or_later(
        &self,
        deferred: Deferred,
        call: impl FnOnce(&mut Parent<WebHost>) -> Result<(), JsError>,
    ) -> Result<(), JsError> {
        match self.inner.try_borrow_mut() {
            Ok(mut parent) => call(&mut parent),
            Err(_) => {
                self.outbox.borrow_mut().push(deferred);
                Ok(())
            }
        }
    }

    /// Weak view used as `this` for message callbacks.
    fn context(&self) -> ParentContext {
        ParentContext {
            inner: Rc::downgrade(&self.inner),
            outbox: Rc::clone(&self.outbox),
            id: self.id.clone(),
            url: self.url.clone(),
            frame_src: self.frame_src.clone(),
        }
    }
}

struct ParentContext {
    inner: Weak<RefCell<Parent<WebHost>>>,
    outbox: Outbox,
    id: String,
    url: String,
    frame_src: String,
}

impl ParentContext {
    fn to_js(&self) -> JsValue {
        match self.inner.upgrade() {
            Some(inner) => JsValue::from(PymParent {
                inner,
                outbox: Rc::clone(&self.outbox),
                id: self.id.clone(),
                url: self.url.clone(),
                frame_src: self.frame_src.clone(),
            }),
            None => JsValue::NULL,
        }
    }
}

#[wasm_bindgen(js_class = Parent)]
impl PymParent {
    /// Mount a frame loading `url` into the element with id `containerId`.
    ///
    /// `config` is an optional JSON object with the parent settings.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container_id: &str,
        url: &str,
        config: Option<String>,
    ) -> Result<PymParent, JsError> {
        #[cfg(feature = "console-panic")]
        console_error_panic_hook::set_once();

        let config = parent_config(config.as_deref())?;
        let host = WebHost::new().map_err(|err| to_js_error("host unavailable", err))?;
        let parent = Parent::new(host, container_id, url, config)
            .map_err(|err| to_js_error("parent construction failed", err))?;
        Ok(Self::attach(Rc::new(RefCell::new(parent))))
    }

    /// Register `callback` for messages of `messageType`. It receives the
    /// payload, with the parent as `this`.
    #[wasm_bindgen(js_name = onMessage)]
    pub fn on_message(&self, message_type: &str, callback: Function) -> Result<(), JsError> {
        let context = self.context();
        self.parent_mut()?
            .on_message(message_type, move |_, payload| {
                let this = context.to_js();
                if let Err(err) = callback.call1(&this, &JsValue::from_str(payload)) {
                    tracing::warn!(error = ?err, "message callback threw");
                }
            });
        Ok(())
    }

    #[wasm_bindgen(js_name = sendMessage)]
    pub fn send_message(&self, message_type: &str, payload: &str) -> Result<(), JsError> {
        try_encode(&self.id, message_type, payload)
            .map_err(|err| to_js_error("sendMessage failed", err))?;
        let deferred = Deferred::Message(message_type.to_string(), payload.to_string());
        self.now_or_later(deferred, |parent| {
            parent
                .send_message(message_type, payload)
                .map_err(|err| to_js_error("sendMessage failed", err))
        })
    }

    #[wasm_bindgen(js_name = sendWidth)]
    pub fn send_width(&self) -> Result<(), JsError> {
        self.now_or_later(Deferred::Width, |parent| {
            parent
                .send_width()
                .map_err(|err| to_js_error("sendWidth failed", err))
        })
    }

    #[wasm_bindgen(js_name = sendViewportAndIFramePosition)]
    pub fn send_viewport_and_iframe_position(&self) -> Result<(), JsError> {
        self.now_or_later(Deferred::Position, |parent| {
            parent.send_viewport_and_iframe_position();
            Ok(())
        })
    }

    /// Unbind every listener and detach the frame.
    pub fn remove(&self) -> Result<(), JsError> {
        self.now_or_later(Deferred::Remove, |parent| {
            parent.remove();
            Ok(())
        })
    }

    #[wasm_bindgen(getter)]
    pub fn id(&self) -> String {
        self.id.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn url(&self) -> String {
        self.url.clone()
    }

    #[wasm_bindgen(getter, js_name = frameSrc)]
    pub fn frame_src(&self) -> String {
        self.frame_src.clone()
    }

    /// True once removed. A removal queued by a running callback counts.
    #[wasm_bindgen(getter, js_name = isRemoved)]
    pub fn is_removed(&self) -> bool {
        match self.inner.try_borrow() {
            Ok(parent) => parent.is_removed(),
            Err(_) => self
                .outbox
                .borrow()
                .iter()
                .any(|deferred| matches!(deferred, Deferred::Remove)),
        }
    }
}

fn flush(parent: &mut Parent<WebHost>, outbox: &Outbox) {
    loop {
        let queued = std::mem::take(&mut *outbox.borrow_mut());
        if queued.is_empty() {
            return;
        }
        for deferred in queued {
            match deferred {
                Deferred::Message(message_type, payload) => {
                    if let Err(err) = parent.send_message(&message_type, &payload) {
                        tracing::warn!(error = %err, "queued message dropped");
                    }
                }
                Deferred::Width => {
                    if let Err(err) = parent.send_width() {
                        tracing::warn!(error = %err, "queued width dropped");
                    }
                }
                Deferred::Position => parent.send_viewport_and_iframe_position(),
                Deferred::Remove => parent.remove(),
            }
        }
    }
}

pub(crate) fn parent_config(json: Option<&str>) -> Result<ParentConfig, JsError> {
    match json {
        Some(json) => {
            ParentConfig::from_json(json).map_err(|err| to_js_error("invalid parent config", err))
        }
        None => Ok(ParentConfig::default()),
    }
}
