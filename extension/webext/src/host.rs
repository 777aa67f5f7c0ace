//! The boundary to the browser's callback-style extension APIs.
//!
//! Every host operation receives a [`Completion`] and reports its outcome through it as a
//! `Result`, so nothing downstream has to inspect an ambient error slot. An `Err` returned from
//! the operation itself is a synchronous throw.

use serde_json::Value;
use std::rc::Rc;

use crate::{
    message::MessageSender,
    pages::{Location, Manifest},
};

pub type TabId = i32;

/// A value thrown by the host before it scheduled any completion.
pub type Thrown = Value;

pub type Dispatch = Result<(), Thrown>;

/// Called by the host exactly once with the outcome of an operation.
pub type Completion<T> = Box<dyn FnOnce(Result<T, String>)>;

/// Sends a reply back through the channel an event arrived on.
///
/// Replying after the channel closed is a no-op.
pub type Responder = Box<dyn FnOnce(Value)>;

/// Listeners are removed by identity, so the same `Rc` must be passed to `remove_listener`.
pub type Listener<E, O = ()> = Rc<dyn Fn(E) -> O>;

pub trait EventSource<E, O = ()> {
    /// An `Err` means the host refused the listener and will never call it.
    fn add_listener(&self, listener: &Listener<E, O>) -> Dispatch;

    /// Removing a listener that is not registered does nothing.
    fn remove_listener(&self, listener: &Listener<E, O>);
}

/// One firing of `runtime.onMessage`.
pub struct IncomingMessage {
    pub message: Value,
    pub sender: MessageSender,
    pub responder: Responder,
}

impl IncomingMessage {
    pub fn respond(self, reply: Value) {
        (self.responder)(reply)
    }
}

impl std::fmt::Debug for IncomingMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncomingMessage")
            .field("message", &self.message)
            .field("sender", &self.sender)
            .finish()
    }
}

pub trait RuntimeApi {
    type BackgroundPage: 'static;

    fn send_message(&self, message: Value, callback: Completion<Value>) -> Dispatch;

    fn open_options_page(&self, callback: Completion<()>) -> Dispatch;

    fn get_background_page(&self, callback: Completion<Self::BackgroundPage>) -> Dispatch;

    /// The listener's return value tells the host whether a reply will be sent asynchronously.
    fn on_message(&self) -> Rc<dyn EventSource<IncomingMessage, bool>>;
}

pub trait TabsApi {
    fn create(&self, properties: Value, callback: Completion<Value>) -> Dispatch;

    fn get(&self, tab_id: TabId, callback: Completion<Value>) -> Dispatch;

    fn query(&self, info: Value, callback: Completion<Value>) -> Dispatch;

    fn update(&self, tab_id: TabId, properties: Value, callback: Completion<Value>) -> Dispatch;

    fn remove(&self, tab_id: TabId, callback: Completion<()>) -> Dispatch;

    /// `None` targets the active tab of the current window.
    fn execute_script(
        &self,
        tab_id: Option<TabId>,
        details: Value,
        callback: Completion<Value>,
    ) -> Dispatch;

    fn send_message(&self, tab_id: TabId, message: Value, callback: Completion<Value>)
        -> Dispatch;
}

pub trait StorageArea {
    /// `None` fetches every item in the area.
    fn get(&self, keys: Option<Vec<String>>, callback: Completion<Value>) -> Dispatch;

    fn set(&self, items: Value, callback: Completion<()>) -> Dispatch;

    fn remove(&self, keys: Vec<String>, callback: Completion<()>) -> Dispatch;

    fn clear(&self, callback: Completion<()>) -> Dispatch;
}

pub trait NotificationsApi {
    /// Completes with the id of the created notification.
    fn create(&self, id: Option<String>, options: Value, callback: Completion<String>)
        -> Dispatch;
}

pub trait ContextMenusApi {
    fn create(&self, properties: Value, callback: Completion<()>) -> Dispatch;
}

pub trait BrowserActionApi {
    fn set_badge_text(&self, details: Value, callback: Completion<()>) -> Dispatch;

    fn set_badge_background_color(&self, details: Value, callback: Completion<()>) -> Dispatch;

    fn set_title(&self, details: Value, callback: Completion<()>) -> Dispatch;

    fn set_icon(&self, details: Value, callback: Completion<()>) -> Dispatch;
}

/// `proxy.settings`
pub trait ProxySettingsApi {
    fn get(&self, details: Value, callback: Completion<Value>) -> Dispatch;

    fn set(&self, details: Value, callback: Completion<()>) -> Dispatch;

    fn clear(&self, details: Value, callback: Completion<()>) -> Dispatch;
}

pub trait WebRequestApi {
    /// The listener's return value is the blocking response handed back to the browser.
    fn on_auth_required(
        &self,
        filter: Value,
        extra_info_spec: Vec<String>,
    ) -> Rc<dyn EventSource<Value, Value>>;
}

/// Ambient data describing the document the code runs in.
pub trait PageContext {
    fn location(&self) -> Location;

    fn manifest(&self) -> Manifest;
}
