use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A message handler. Receives the endpoint it is registered on and the payload.
pub type Handler<E> = Rc<dyn Fn(&mut E, &str)>;

/// Message type to ordered handler list.
///
/// Handlers run in registration order. Registering the same handler twice
/// runs it twice.
pub struct HandlerTable<E> {
    handlers: HashMap<String, Vec<Handler<E>>>,
}

impl<E> HandlerTable<E> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Append a handler for `message_type`.
    pub fn on(&mut self, message_type: &str, handler: Handler<E>) {
        self.handlers
            .entry(message_type.to_string())
            .or_default()
            .push(handler);
    }

    /// Handlers registered for `message_type`, in order.
    ///
    /// Returns owned handles so the caller can invoke them while mutating the
    /// endpoint that owns this table.
    pub fn snapshot(&self, message_type: &str) -> Vec<Handler<E>> {
        self.handlers
            .get(message_type)
            .map(|handlers| handlers.to_vec())
            .unwrap_or_default()
    }

    /// Number of handlers registered for `message_type`.
    pub fn count(&self, message_type: &str) -> usize {
        self.handlers.get(message_type).map_or(0, Vec::len)
    }

    /// Message types with at least one handler, sorted.
    pub fn message_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl<E> Default for HandlerTable<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for HandlerTable<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for message_type in self.message_types() {
            map.entry(&message_type, &self.count(message_type));
        }
        map.finish()
    }
}

/// Endpoints that route decoded messages through a [`HandlerTable`].
pub trait Dispatch: Sized {
    /// The endpoint's handler table.
    fn handlers(&self) -> &HandlerTable<Self>;

    /// Mutable access to the endpoint's handler table.
    fn handlers_mut(&mut self) -> &mut HandlerTable<Self>;

    /// Register an additional handler for `message_type`.
    fn on_message(&mut self, message_type: &str, handler: impl Fn(&mut Self, &str) + 'static) {
        self.handlers_mut().on(message_type, Rc::new(handler));
    }

    /// Run every handler for `message_type`. Unknown types are ignored.
    ///
    /// Returns the number of handlers invoked.
    fn dispatch(&mut self, message_type: &str, payload: &str) -> usize {
        let handlers = self.handlers().snapshot(message_type);
        for handler in &handlers {
            handler(&mut *self, payload);
        }
        handlers.len()
    }
}
