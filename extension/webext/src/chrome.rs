//! The host traits implemented over the real `chrome` namespace.
//!
//! This is the only place that reads `chrome.runtime.lastError`. It is read inside the completion
//! callback, before control returns to the browser, and turned into the callback's `Err`.

use futures::task::{LocalFutureObj, LocalSpawn, SpawnError};
use js_sys::Function;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{cell::RefCell, rc::Rc};
use wasm_bindgen::{prelude::*, JsCast};
use wasm_bindgen_extension::{chrome, Event};
use web_sys::Window;

use crate::{
    host::*,
    message::MessageSender,
    pages::{Location, Manifest},
    storage::Storage,
};

/// The extension APIs of the browser the code is running in.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeHost;

/// Runs message handlers on the browser's microtask queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct WasmSpawner;

impl LocalSpawn for WasmSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        wasm_bindgen_futures::spawn_local(future);

        Ok(())
    }
}

pub struct ChromeStorageArea(wasm_bindgen_extension::StorageArea);

impl Storage<ChromeStorageArea> {
    /// `chrome.storage.local`
    pub fn local() -> Self {
        Storage::from(ChromeStorageArea(chrome.storage().local()))
    }

    /// `chrome.storage.sync`
    pub fn sync() -> Self {
        Storage::from(ChromeStorageArea(chrome.storage().sync()))
    }
}

/// Wraps `callback` in a one-shot JS function that checks `lastError` before reading the value.
fn completion<T, F>(callback: Completion<T>, read: F) -> Function
where
    T: 'static,
    F: FnOnce(JsValue) -> Result<T, String> + 'static,
{
    Closure::once_into_js(move |value: JsValue| {
        let outcome = match chrome.runtime().last_error() {
            Some(error) => Err(error
                .message()
                .unwrap_or_else(|| "unknown error".to_owned())),
            None => read(value),
        };

        callback(outcome)
    })
    .unchecked_into()
}

fn typed<T>(callback: Completion<T>) -> Function
where
    T: DeserializeOwned + 'static,
{
    completion(callback, |value| {
        value
            .into_serde()
            .map_err(|e| format!("unexpected value from host: {}", e))
    })
}

fn unit(callback: Completion<()>) -> Function {
    completion(callback, |_| Ok(()))
}

fn to_js(value: &Value) -> Result<JsValue, Thrown> {
    JsValue::from_serde(value).map_err(|e| Value::String(e.to_string()))
}

/// Keeps strings and `Error` messages readable; anything else goes through JSON.
fn thrown(error: JsValue) -> Thrown {
    if let Some(message) = error.as_string() {
        return Value::String(message);
    }

    match error.dyn_into::<js_sys::Error>() {
        Ok(error) => Value::String(error.message().into()),
        Err(error) => error.into_serde().unwrap_or(Value::Null),
    }
}

impl RuntimeApi for ChromeHost {
    type BackgroundPage = Window;

    fn send_message(&self, message: Value, callback: Completion<Value>) -> Dispatch {
        chrome
            .runtime()
            .send_message(&to_js(&message)?, &typed(callback))
            .map_err(thrown)
    }

    fn open_options_page(&self, callback: Completion<()>) -> Dispatch {
        chrome
            .runtime()
            .open_options_page(&unit(callback))
            .map_err(thrown)
    }

    fn get_background_page(&self, callback: Completion<Window>) -> Dispatch {
        let callback = completion(callback, |page| Ok(page.unchecked_into()));

        chrome
            .runtime()
            .get_background_page(&callback)
            .map_err(thrown)
    }

    fn on_message(&self) -> Rc<dyn EventSource<IncomingMessage, bool>> {
        Rc::new(ChromeEvent::new(
            chrome.runtime().on_message(),
            None,
            on_message_listener,
        ))
    }
}

impl TabsApi for ChromeHost {
    fn create(&self, properties: Value, callback: Completion<Value>) -> Dispatch {
        chrome
            .tabs()
            .create(&to_js(&properties)?, &typed(callback))
            .map_err(thrown)
    }

    fn get(&self, tab_id: TabId, callback: Completion<Value>) -> Dispatch {
        chrome.tabs().get(tab_id, &typed(callback)).map_err(thrown)
    }

    fn query(&self, info: Value, callback: Completion<Value>) -> Dispatch {
        chrome
            .tabs()
            .query(&to_js(&info)?, &typed(callback))
            .map_err(thrown)
    }

    fn update(&self, tab_id: TabId, properties: Value, callback: Completion<Value>) -> Dispatch {
        chrome
            .tabs()
            .update(tab_id, &to_js(&properties)?, &typed(callback))
            .map_err(thrown)
    }

    fn remove(&self, tab_id: TabId, callback: Completion<()>) -> Dispatch {
        chrome.tabs().remove(tab_id, &unit(callback)).map_err(thrown)
    }

    fn execute_script(
        &self,
        tab_id: Option<TabId>,
        details: Value,
        callback: Completion<Value>,
    ) -> Dispatch {
        chrome
            .tabs()
            .execute_script(tab_id, &to_js(&details)?, &typed(callback))
            .map_err(thrown)
    }

    fn send_message(&self, tab_id: TabId, message: Value, callback: Completion<Value>) -> Dispatch {
        chrome
            .tabs()
            .send_message(tab_id, &to_js(&message)?, &typed(callback))
            .map_err(thrown)
    }
}

impl StorageArea for ChromeStorageArea {
    fn get(&self, keys: Option<Vec<String>>, callback: Completion<Value>) -> Dispatch {
        let keys = match keys {
            Some(keys) => to_js(&Value::from(keys))?,
            None => JsValue::NULL,
        };

        self.0.get(&keys, &typed(callback)).map_err(thrown)
    }

    fn set(&self, items: Value, callback: Completion<()>) -> Dispatch {
        self.0
            .set(&to_js(&items)?, &unit(callback))
            .map_err(thrown)
    }

    fn remove(&self, keys: Vec<String>, callback: Completion<()>) -> Dispatch {
        self.0
            .remove(&to_js(&Value::from(keys))?, &unit(callback))
            .map_err(thrown)
    }

    fn clear(&self, callback: Completion<()>) -> Dispatch {
        self.0.clear(&unit(callback)).map_err(thrown)
    }
}

impl NotificationsApi for ChromeHost {
    fn create(
        &self,
        id: Option<String>,
        options: Value,
        callback: Completion<String>,
    ) -> Dispatch {
        chrome
            .notifications()
            .create(id.as_deref(), &to_js(&options)?, &typed(callback))
            .map_err(thrown)
    }
}

impl ContextMenusApi for ChromeHost {
    fn create(&self, properties: Value, callback: Completion<()>) -> Dispatch {
        chrome
            .context_menus()
            .create(&to_js(&properties)?, &unit(callback))
            .map(drop)
            .map_err(thrown)
    }
}

impl BrowserActionApi for ChromeHost {
    fn set_badge_text(&self, details: Value, callback: Completion<()>) -> Dispatch {
        chrome
            .browser_action()
            .set_badge_text(&to_js(&details)?, &unit(callback))
            .map_err(thrown)
    }

    fn set_badge_background_color(&self, details: Value, callback: Completion<()>) -> Dispatch {
        chrome
            .browser_action()
            .set_badge_background_color(&to_js(&details)?, &unit(callback))
            .map_err(thrown)
    }

    fn set_title(&self, details: Value, callback: Completion<()>) -> Dispatch {
        chrome
            .browser_action()
            .set_title(&to_js(&details)?, &unit(callback))
            .map_err(thrown)
    }

    fn set_icon(&self, details: Value, callback: Completion<()>) -> Dispatch {
        chrome
            .browser_action()
            .set_icon(&to_js(&details)?, &unit(callback))
            .map_err(thrown)
    }
}

impl ProxySettingsApi for ChromeHost {
    fn get(&self, details: Value, callback: Completion<Value>) -> Dispatch {
        chrome
            .proxy()
            .settings()
            .get(&to_js(&details)?, &typed(callback))
            .map_err(thrown)
    }

    fn set(&self, details: Value, callback: Completion<()>) -> Dispatch {
        chrome
            .proxy()
            .settings()
            .set(&to_js(&details)?, &unit(callback))
            .map_err(thrown)
    }

    fn clear(&self, details: Value, callback: Completion<()>) -> Dispatch {
        chrome
            .proxy()
            .settings()
            .clear(&to_js(&details)?, &unit(callback))
            .map_err(thrown)
    }
}

impl WebRequestApi for ChromeHost {
    fn on_auth_required(
        &self,
        filter: Value,
        extra_info_spec: Vec<String>,
    ) -> Rc<dyn EventSource<Value, Value>> {
        let filter = (
            JsValue::from_serde(&filter).unwrap_or(JsValue::NULL),
            JsValue::from_serde(&extra_info_spec).unwrap_or(JsValue::NULL),
        );

        Rc::new(ChromeEvent::new(
            chrome.web_request().on_auth_required(),
            Some(filter),
            auth_required_listener,
        ))
    }
}

impl PageContext for ChromeHost {
    fn location(&self) -> Location {
        let location = match web_sys::window() {
            Some(window) => window.location(),
            None => return Location::default(),
        };

        Location {
            protocol: location.protocol().unwrap_or_default(),
            pathname: location.pathname().unwrap_or_default(),
        }
    }

    fn manifest(&self) -> Manifest {
        chrome
            .runtime()
            .get_manifest()
            .into_serde()
            .unwrap_or_else(|e| {
                log::warn!("failed to read the manifest: {}", e);
                Manifest::default()
            })
    }
}

type JsListener = Closure<dyn Fn(JsValue, JsValue, JsValue) -> JsValue>;

/// A `chrome.events.Event` that remembers which closure it handed to the browser for each
/// listener, so the same closure can be removed again.
struct ChromeEvent<E, O> {
    event: Event,
    filter: Option<(JsValue, JsValue)>,
    wrap: fn(Listener<E, O>) -> JsListener,
    registered: RefCell<Vec<(Listener<E, O>, JsListener)>>,
}

impl<E, O> ChromeEvent<E, O> {
    fn new(
        event: Event,
        filter: Option<(JsValue, JsValue)>,
        wrap: fn(Listener<E, O>) -> JsListener,
    ) -> Self {
        Self {
            event,
            filter,
            wrap,
            registered: RefCell::default(),
        }
    }
}

impl<E, O> EventSource<E, O> for ChromeEvent<E, O> {
    fn add_listener(&self, listener: &Listener<E, O>) -> Dispatch {
        let closure = (self.wrap)(listener.clone());
        let function: &Function = closure.as_ref().unchecked_ref();

        match &self.filter {
            Some((filter, extra_info_spec)) => self
                .event
                .add_listener_with_filter(function, filter, extra_info_spec)
                .map_err(thrown)?,
            None => self.event.add_listener(function).map_err(thrown)?,
        }

        self.registered
            .borrow_mut()
            .push((listener.clone(), closure));

        Ok(())
    }

    fn remove_listener(&self, listener: &Listener<E, O>) {
        let mut registered = self.registered.borrow_mut();

        if let Some(index) = registered
            .iter()
            .position(|(registered, _)| Rc::ptr_eq(registered, listener))
        {
            let (_, closure) = registered.remove(index);
            self.event.remove_listener(closure.as_ref().unchecked_ref());
        }
    }
}

fn on_message_listener(listener: Listener<IncomingMessage, bool>) -> JsListener {
    Closure::wrap(Box::new(
        move |message: JsValue, sender: JsValue, send_response: JsValue| {
            let message = message.into_serde().unwrap_or_else(|e| {
                log::warn!("message is not JSON: {}", e);
                Value::Null
            });
            let sender = sender.into_serde::<MessageSender>().unwrap_or_default();
            let send_response: Function = send_response.unchecked_into();

            let responder: Responder = Box::new(move |reply: Value| {
                let reply = JsValue::from_serde(&reply).unwrap_or(JsValue::NULL);

                if let Err(e) = send_response.call1(&JsValue::NULL, &reply) {
                    log::debug!("reply dropped, channel already closed: {:?}", thrown(e));
                }
            });

            JsValue::from_bool(listener(IncomingMessage {
                message,
                sender,
                responder,
            }))
        },
    ) as Box<dyn Fn(JsValue, JsValue, JsValue) -> JsValue>)
}

fn auth_required_listener(listener: Listener<Value, Value>) -> JsListener {
    Closure::wrap(Box::new(move |details: JsValue, _: JsValue, _: JsValue| {
        let details = details.into_serde().unwrap_or(Value::Null);

        JsValue::from_serde(&listener(details)).unwrap_or(JsValue::UNDEFINED)
    }) as Box<dyn Fn(JsValue, JsValue, JsValue) -> JsValue>)
}
