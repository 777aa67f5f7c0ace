//! In-memory stand-ins for the browser, shared by the unit tests.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use crate::{
    host::*,
    pages::{Location, Manifest},
};

/// An event source that keeps listeners the way the browser does.
pub struct FakeEvent<E, O = ()> {
    listeners: RefCell<Vec<Listener<E, O>>>,
    refusal: RefCell<Option<Value>>,
    pub added: Cell<usize>,
    pub removed: Cell<usize>,
}

impl<E, O> Default for FakeEvent<E, O> {
    fn default() -> Self {
        Self {
            listeners: RefCell::default(),
            refusal: RefCell::default(),
            added: Cell::new(0),
            removed: Cell::new(0),
        }
    }
}

impl<E: Clone, O> FakeEvent<E, O> {
    pub fn fire(&self, event: E) -> Vec<O> {
        self.fire_with(|| event.clone())
    }
}

impl<E, O> FakeEvent<E, O> {
    /// Makes every later `add_listener` throw `thrown`.
    pub fn refuse(&self, thrown: Value) {
        *self.refusal.borrow_mut() = Some(thrown);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Hands every listener its own event, for events that cannot be cloned.
    pub fn fire_with(&self, event: impl Fn() -> E) -> Vec<O> {
        let listeners = self.listeners.borrow().clone();

        listeners.iter().map(|listener| listener(event())).collect()
    }
}

impl<E, O> EventSource<E, O> for FakeEvent<E, O> {
    fn add_listener(&self, listener: &Listener<E, O>) -> Dispatch {
        if let Some(thrown) = self.refusal.borrow().clone() {
            return Err(thrown);
        }

        self.added.set(self.added.get() + 1);
        self.listeners.borrow_mut().push(listener.clone());

        Ok(())
    }

    fn remove_listener(&self, listener: &Listener<E, O>) {
        self.removed.set(self.removed.get() + 1);
        self.listeners
            .borrow_mut()
            .retain(|registered| !Rc::ptr_eq(registered, listener));
    }
}

/// How the fake host answers one operation.
#[derive(Debug, Clone)]
pub enum Answer {
    Value(Value),
    HostError(String),
    Throw(Value),
}

/// Records every call and answers from a table; unanswered operations complete with `null`.
#[derive(Default)]
pub struct FakeHost {
    pub calls: RefCell<Vec<(&'static str, Value)>>,
    answers: RefCell<HashMap<&'static str, Answer>>,
    pub on_message: Rc<FakeEvent<IncomingMessage, bool>>,
    pub on_auth_required: Rc<FakeEvent<Value, Value>>,
    pub auth_registrations: RefCell<Vec<(Value, Vec<String>)>>,
    pub location: Location,
    pub manifest: Manifest,
}

impl FakeHost {
    pub fn in_background() -> Self {
        Self::at("chrome-extension:", "/_generated_background_page.html")
    }

    pub fn in_content_script() -> Self {
        Self::at("https:", "/index.html")
    }

    fn at(protocol: &str, pathname: &str) -> Self {
        Self {
            location: Location {
                protocol: protocol.to_owned(),
                pathname: pathname.to_owned(),
            },
            ..Self::default()
        }
    }

    pub fn answer(&self, operation: &'static str, answer: Answer) {
        self.answers.borrow_mut().insert(operation, answer);
    }

    pub fn calls_to(&self, operation: &str) -> Vec<Value> {
        self.calls
            .borrow()
            .iter()
            .filter(|(name, _)| *name == operation)
            .map(|(_, args)| args.clone())
            .collect()
    }

    fn complete<T>(&self, operation: &'static str, args: Value, callback: Completion<T>) -> Dispatch
    where
        T: DeserializeOwned,
    {
        self.calls.borrow_mut().push((operation, args));

        let answer = self
            .answers
            .borrow()
            .get(operation)
            .cloned()
            .unwrap_or(Answer::Value(Value::Null));

        match answer {
            Answer::Value(value) => {
                callback(serde_json::from_value(value).map_err(|e| e.to_string()));
                Ok(())
            }
            Answer::HostError(message) => {
                callback(Err(message));
                Ok(())
            }
            Answer::Throw(thrown) => Err(thrown),
        }
    }
}

impl RuntimeApi for FakeHost {
    type BackgroundPage = Value;

    fn send_message(&self, message: Value, callback: Completion<Value>) -> Dispatch {
        self.complete("runtime.sendMessage", message, callback)
    }

    fn open_options_page(&self, callback: Completion<()>) -> Dispatch {
        self.complete("runtime.openOptionsPage", Value::Null, callback)
    }

    fn get_background_page(&self, callback: Completion<Value>) -> Dispatch {
        self.complete("runtime.getBackgroundPage", Value::Null, callback)
    }

    fn on_message(&self) -> Rc<dyn EventSource<IncomingMessage, bool>> {
        self.on_message.clone()
    }
}

impl TabsApi for FakeHost {
    fn create(&self, properties: Value, callback: Completion<Value>) -> Dispatch {
        self.complete("tabs.create", properties, callback)
    }

    fn get(&self, tab_id: TabId, callback: Completion<Value>) -> Dispatch {
        self.complete("tabs.get", json!(tab_id), callback)
    }

    fn query(&self, info: Value, callback: Completion<Value>) -> Dispatch {
        self.complete("tabs.query", info, callback)
    }

    fn update(&self, tab_id: TabId, properties: Value, callback: Completion<Value>) -> Dispatch {
        self.complete(
            "tabs.update",
            json!({ "tabId": tab_id, "properties": properties }),
            callback,
        )
    }

    fn remove(&self, tab_id: TabId, callback: Completion<()>) -> Dispatch {
        self.complete("tabs.remove", json!(tab_id), callback)
    }

    fn execute_script(
        &self,
        tab_id: Option<TabId>,
        details: Value,
        callback: Completion<Value>,
    ) -> Dispatch {
        self.complete(
            "tabs.executeScript",
            json!({ "tabId": tab_id, "details": details }),
            callback,
        )
    }

    fn send_message(&self, tab_id: TabId, message: Value, callback: Completion<Value>) -> Dispatch {
        self.complete(
            "tabs.sendMessage",
            json!({ "tabId": tab_id, "message": message }),
            callback,
        )
    }
}

impl StorageArea for FakeHost {
    fn get(&self, keys: Option<Vec<String>>, callback: Completion<Value>) -> Dispatch {
        self.complete("storage.get", json!(keys), callback)
    }

    fn set(&self, items: Value, callback: Completion<()>) -> Dispatch {
        self.complete("storage.set", items, callback)
    }

    fn remove(&self, keys: Vec<String>, callback: Completion<()>) -> Dispatch {
        self.complete("storage.remove", json!(keys), callback)
    }

    fn clear(&self, callback: Completion<()>) -> Dispatch {
        self.complete("storage.clear", Value::Null, callback)
    }
}

impl NotificationsApi for FakeHost {
    fn create(
        &self,
        id: Option<String>,
        options: Value,
        callback: Completion<String>,
    ) -> Dispatch {
        self.complete(
            "notifications.create",
            json!({ "id": id, "options": options }),
            callback,
        )
    }
}

impl ContextMenusApi for FakeHost {
    fn create(&self, properties: Value, callback: Completion<()>) -> Dispatch {
        self.complete("contextMenus.create", properties, callback)
    }
}

impl BrowserActionApi for FakeHost {
    fn set_badge_text(&self, details: Value, callback: Completion<()>) -> Dispatch {
        self.complete("browserAction.setBadgeText", details, callback)
    }

    fn set_badge_background_color(&self, details: Value, callback: Completion<()>) -> Dispatch {
        self.complete("browserAction.setBadgeBackgroundColor", details, callback)
    }

    fn set_title(&self, details: Value, callback: Completion<()>) -> Dispatch {
        self.complete("browserAction.setTitle", details, callback)
    }

    fn set_icon(&self, details: Value, callback: Completion<()>) -> Dispatch {
        self.complete("browserAction.setIcon", details, callback)
    }
}

impl ProxySettingsApi for FakeHost {
    fn get(&self, details: Value, callback: Completion<Value>) -> Dispatch {
        self.complete("proxy.settings.get", details, callback)
    }

    fn set(&self, details: Value, callback: Completion<()>) -> Dispatch {
        self.complete("proxy.settings.set", details, callback)
    }

    fn clear(&self, details: Value, callback: Completion<()>) -> Dispatch {
        self.complete("proxy.settings.clear", details, callback)
    }
}

impl WebRequestApi for FakeHost {
    fn on_auth_required(
        &self,
        filter: Value,
        extra_info_spec: Vec<String>,
    ) -> Rc<dyn EventSource<Value, Value>> {
        self.auth_registrations
            .borrow_mut()
            .push((filter, extra_info_spec));

        self.on_auth_required.clone()
    }
}

impl PageContext for FakeHost {
    fn location(&self) -> Location {
        self.location.clone()
    }

    fn manifest(&self) -> Manifest {
        self.manifest.clone()
    }
}
