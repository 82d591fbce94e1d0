use std::cell::{Cell, RefCell, RefMut};
use std::rc::{Rc, Weak};

use js_sys::Function;
use pymprims_endpoint::{Child, ChildConfig, ChildSender, Dispatch};
use wasm_bindgen::prelude::*;

use crate::error::{invalid_state, to_js_error};
use crate::host::WebHost;

/// The framed side of one channel, bound to the live document.
///
/// Sending goes through a [`ChildSender`], so callbacks running inside the
/// child's own dispatch can still talk to the parent. A `remove()` from such a
/// callback runs once the dispatch returns.
#[wasm_bindgen(js_name = Child)]
pub struct PymChild {
    inner: Rc<RefCell<Child<WebHost>>>,
    sender: ChildSender<WebHost>,
    remove_queued: Rc<Cell<bool>>,
    parent_url: Option<String>,
    parent_title: Option<String>,
    initial_width: f64,
}

impl PymChild {
    fn child_mut(&self) -> Result<RefMut<'_, Child<WebHost>>, JsError> {
        self.inner
            .try_borrow_mut()
            .map_err(|_| invalid_state("child is busy"))
    }

    /// Weak view used as `this` for message callbacks.
    fn context(&self) -> ChildContext {
        ChildContext {
            inner: Rc::downgrade(&self.inner),
            sender: self.sender.clone(),
            remove_queued: Rc::clone(&self.remove_queued),
            parent_url: self.parent_url.clone(),
            parent_title: self.parent_title.clone(),
            initial_width: self.initial_width,
        }
    }
}

struct ChildContext {
    inner: Weak<RefCell<Child<WebHost>>>,
    sender: ChildSender<WebHost>,
    remove_queued: Rc<Cell<bool>>,
    parent_url: Option<String>,
    parent_title: Option<String>,
    initial_width: f64,
}

impl ChildContext {
    fn to_js(&self) -> JsValue {
        match self.inner.upgrade() {
            Some(inner) => JsValue::from(PymChild {
                inner,
                sender: self.sender.clone(),
                remove_queued: Rc::clone(&self.remove_queued),
                parent_url: self.parent_url.clone(),
                parent_title: self.parent_title.clone(),
                initial_width: self.initial_width,
            }),
            None => JsValue::NULL,
        }
    }
}

#[wasm_bindgen(js_class = Child)]
impl PymChild {
    /// Boot the child endpoint for this document.
    ///
    /// `config` is an optional JSON object with the child settings.
    /// `renderCallback` receives the width the parent reports.
    /// `onMarkedEmbeddedStatus` receives the class applied to the root element.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config: Option<String>,
        render_callback: Option<Function>,
        on_marked_embedded_status: Option<Function>,
    ) -> Result<PymChild, JsError> {
        #[cfg(feature = "console-panic")]
        console_error_panic_hook::set_once();

        let mut config = match config.as_deref() {
            Some(json) => {
                ChildConfig::from_json(json).map_err(|err| to_js_error("invalid child config", err))?
            }
            None => ChildConfig::default(),
        };
        if let Some(callback) = render_callback {
            config = config.with_render_callback(move |width| {
                let width = JsValue::from_f64(width.as_f64());
                if let Err(err) = callback.call1(&JsValue::NULL, &width) {
                    tracing::warn!(error = ?err, "render callback threw");
                }
            });
        }
        if let Some(callback) = on_marked_embedded_status {
            config = config.with_embedded_status_callback(move |class_name| {
                let class_name = JsValue::from_str(class_name);
                if let Err(err) = callback.call1(&JsValue::NULL, &class_name) {
                    tracing::warn!(error = ?err, "embedded status callback threw");
                }
            });
        }

        let host = WebHost::new().map_err(|err| to_js_error("host unavailable", err))?;
        let child = Child::new(host.clone(), config)
            .map_err(|err| to_js_error("child construction failed", err))?;
        let sender = child.sender();
        let parent_url = child.parent_url().map(str::to_string);
        let parent_title = child.parent_title().map(str::to_string);
        let initial_width = child.initial_width().as_f64();
        let inner = Rc::new(RefCell::new(child));
        let remove_queued = Rc::new(Cell::new(false));

        let weak = Rc::downgrade(&inner);
        let queued = Rc::clone(&remove_queued);
        host.set_event_sink(move |event| {
            let Some(child) = weak.upgrade() else {
                return;
            };
            let Ok(mut child) = child.try_borrow_mut() else {
                tracing::debug!(?event, "child busy, dropping re-entrant event");
                return;
            };
            child.handle_event(event);
            if queued.take() {
                child.remove();
            }
        });
        Ok(Self {
            inner,
            sender,
            remove_queued,
            parent_url,
            parent_title,
            initial_width,
        })
    }

    /// Register `callback` for messages of `messageType`. It receives the
    /// payload, with the child as `this`.
    #[wasm_bindgen(js_name = onMessage)]
    pub fn on_message(&self, message_type: &str, callback: Function) -> Result<(), JsError> {
        let context = self.context();
        self.child_mut()?
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
        self.sender
            .send_message(message_type, payload)
            .map_err(|err| to_js_error("sendMessage failed", err))
    }

    /// Report the body height to the parent and return it.
    #[wasm_bindgen(js_name = sendHeight)]
    pub fn send_height(&self) -> f64 {
        self.sender.send_height() as f64
    }

    #[wasm_bindgen(js_name = getParentPositionInfo)]
    pub fn get_parent_position_info(&self) {
        self.sender.get_parent_position_info();
    }

    /// Ask the parent to navigate to `#hash`.
    #[wasm_bindgen(js_name = scrollParentTo)]
    pub fn scroll_parent_to(&self, hash: &str) {
        self.sender.scroll_parent_to(hash);
    }

    #[wasm_bindgen(js_name = navigateParentTo)]
    pub fn navigate_parent_to(&self, url: &str) {
        self.sender.navigate_parent_to(url);
    }

    #[wasm_bindgen(js_name = scrollParentToChildEl)]
    pub fn scroll_parent_to_child_el(&self, element_id: &str) -> Result<(), JsError> {
        self.sender
            .scroll_parent_to_child_el(element_id)
            .map_err(|err| to_js_error("scrollParentToChildEl failed", err))
    }

    #[wasm_bindgen(js_name = scrollParentToChildPos)]
    pub fn scroll_parent_to_child_pos(&self, offset: f64) {
        self.sender.scroll_parent_to_child_pos(offset);
    }

    /// Unbind the message listener and stop polling.
    pub fn remove(&self) {
        match self.inner.try_borrow_mut() {
            Ok(mut child) => child.remove(),
            Err(_) => self.remove_queued.set(true),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn id(&self) -> String {
        self.sender.id().to_string()
    }

    #[wasm_bindgen(getter, js_name = parentUrl)]
    pub fn parent_url(&self) -> Option<String> {
        self.parent_url.clone()
    }

    #[wasm_bindgen(getter, js_name = parentTitle)]
    pub fn parent_title(&self) -> Option<String> {
        self.parent_title.clone()
    }

    /// Last width received from the parent. Unset while the child is
    /// dispatching; the render callback receives the width directly.
    #[wasm_bindgen(getter, js_name = parentWidth)]
    pub fn parent_width(&self) -> Option<f64> {
        let child = self.inner.try_borrow().ok()?;
        child.parent_width().map(|width| width.as_f64())
    }

    #[wasm_bindgen(getter, js_name = initialWidth)]
    pub fn initial_width(&self) -> f64 {
        self.initial_width
    }
}
