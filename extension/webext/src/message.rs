//! Messages between extension documents: the background page, content scripts and other pages.
//!
//! Every reply travelling back through a listener is an envelope: it always carries `success`,
//! and it carries the `greeting` of the message it answers unless the handler chose its own.

use futures::{
    future::{self, LocalBoxFuture},
    task::{LocalSpawn, LocalSpawnExt},
    FutureExt,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt, future::Future, rc::Rc};

use crate::{
    callback::{acknowledged, call_with, deserialized, PendingCall},
    host::{IncomingMessage, PageContext, RuntimeApi, TabId, TabsApi},
    observable::{listen_to, EventStream, Observable, Subscription},
    pages::ExecutionContext,
    tabs::Tab,
    Error, Result,
};

/// An application message, classified by its `greeting`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub greeting: String,
    /// Where to deliver the message when sending from the background page. Never sent along.
    #[serde(rename = "tabId", default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<TabId>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Message {
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            greeting: greeting.into(),
            tab_id: None,
            data: Map::new(),
        }
    }

    pub fn to_tab(mut self, tab_id: TabId) -> Self {
        self.tab_id = Some(tab_id);
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Interprets the message as one of the kinds in `K`, typically an enum tagged with
    /// `#[serde(tag = "greeting")]`. Anything `K` does not understand is `Kind::Unknown`.
    pub fn classify<K>(&self) -> Kind<K>
    where
        K: DeserializeOwned,
    {
        let untargeted = Message {
            tab_id: None,
            ..self.clone()
        };

        match serde_json::to_value(&untargeted).and_then(serde_json::from_value) {
            Ok(known) => Kind::Known(known),
            Err(e) => {
                log::trace!("'{}' is not a known message kind: {}", self.greeting, e);
                Kind::Unknown(self.clone())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Kind<K> {
    Known(K),
    Unknown(Message),
}

/// What the other side answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

/// Who sent an incoming message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSender {
    #[serde(default)]
    pub tab: Option<Tab>,
    #[serde(default)]
    pub frame_id: Option<i32>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Why a message handler failed. Sent back as `reason` and `stack`.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub reason: Value,
    pub stack: Option<String>,
}

impl Failure {
    pub fn new(reason: impl Into<Value>) -> Self {
        Self {
            reason: reason.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Value::String(reason) => f.write_str(reason),
            reason => write!(f, "{}", reason),
        }
    }
}

impl From<anyhow::Error> for Failure {
    fn from(e: anyhow::Error) -> Self {
        Failure::new(format!("{:#}", e))
    }
}

impl From<Error> for Failure {
    fn from(e: Error) -> Self {
        Failure::new(e.to_string())
    }
}

impl From<serde_json::Error> for Failure {
    fn from(e: serde_json::Error) -> Self {
        Failure::new(e.to_string())
    }
}

impl From<&str> for Failure {
    fn from(reason: &str) -> Self {
        Failure::new(reason)
    }
}

impl From<String> for Failure {
    fn from(reason: String) -> Self {
        Failure::new(reason)
    }
}

impl From<Value> for Failure {
    fn from(reason: Value) -> Self {
        Failure::new(reason)
    }
}

/// Sends to the background page when called from a tab, or to `message.tab_id` when called
/// from the background page.
pub fn send<H>(host: &H, message: Message) -> impl Future<Output = Result<Reply>>
where
    H: RuntimeApi + TabsApi + PageContext + ?Sized,
{
    match ExecutionContext::current(host) {
        ExecutionContext::Background => send_to_tab(host, message).left_future(),
        _ => send_from_tab(host, message).right_future(),
    }
}

/// Sends a message to the background page.
pub fn send_from_tab<R>(runtime: &R, message: Message) -> impl Future<Output = Result<Reply>>
where
    R: RuntimeApi + ?Sized,
{
    let pending = call_with("runtime.sendMessage", &message, |message, done| {
        runtime.send_message(message, done)
    });

    into_reply(pending)
}

/// Sends a message from the background page to the tab in `message.tab_id`.
pub fn send_to_tab<T>(tabs: &T, mut message: Message) -> impl Future<Output = Result<Reply>>
where
    T: TabsApi + ?Sized,
{
    let pending = match message.tab_id.take() {
        Some(tab_id) => call_with("tabs.sendMessage", &message, |message, done| {
            tabs.send_message(tab_id, message, done)
        }),
        None => PendingCall::rejected("tabs.sendMessage", Error::validation("Tab not specified")),
    };

    into_reply(pending)
}

fn into_reply(pending: PendingCall<Value>) -> impl Future<Output = Result<Reply>> {
    deserialized(acknowledged(pending))
}

/// Listens for messages from other documents.
///
/// Handlers are spawned on `spawner`. With `send_response` set, each handler's outcome is sent
/// back as the reply envelope.
pub fn listen_for_message<R, S>(runtime: &R, spawner: S, send_response: bool) -> MessageListener
where
    R: RuntimeApi + ?Sized,
    S: LocalSpawn + 'static,
{
    MessageListener {
        events: listen_to(runtime.on_message(), move |_| send_response),
        spawner: Rc::new(spawner),
        send_response,
    }
}

pub struct MessageListener {
    events: Observable<IncomingMessage>,
    spawner: Rc<dyn LocalSpawn>,
    send_response: bool,
}

impl MessageListener {
    /// Registers `handler` with the browser; it runs once per message, in arrival order.
    ///
    /// Handlers already dispatched run to completion and reply even after unsubscribing.
    pub fn for_each<H, Fut, T>(&self, handler: H) -> Result<Subscription>
    where
        H: Fn(Message, MessageSender) -> Fut + 'static,
        Fut: Future<Output = std::result::Result<T, Failure>> + 'static,
        T: Serialize + 'static,
    {
        let spawner = self.spawner.clone();
        let send_response = self.send_response;

        self.events.subscribe(move |incoming: IncomingMessage| {
            let IncomingMessage {
                message,
                sender,
                responder,
            } = incoming;
            let greeting = message.get("greeting").cloned();

            let outcome: LocalBoxFuture<'static, std::result::Result<Value, Failure>> =
                match serde_json::from_value::<Message>(message) {
                    Ok(message) => {
                        log::debug!("Received message '{}'", message.greeting);

                        let handled = handler(message, sender);
                        async move {
                            let result = handled.await?;
                            serde_json::to_value(result).map_err(Failure::from)
                        }
                        .boxed_local()
                    }
                    Err(e) => {
                        log::warn!("Received malformed message: {}", e);
                        future::ready(Err(Failure::new(format!("malformed message: {}", e))))
                            .boxed_local()
                    }
                };

            let reply = async move {
                let envelope = envelope(greeting, outcome.await);

                if send_response {
                    responder(envelope);
                }
            };

            if let Err(e) = spawner.spawn_local(reply) {
                log::error!("Failed to spawn message handler: {:?}", e);
            }
        })
    }

    /// The raw incoming messages; whoever consumes them is responsible for replying.
    pub fn into_stream(self) -> EventStream<IncomingMessage> {
        self.events.into_stream()
    }
}

fn envelope(greeting: Option<Value>, outcome: std::result::Result<Value, Failure>) -> Value {
    let mut reply = Map::new();

    match outcome {
        Ok(result) => {
            reply.insert("success".to_owned(), Value::Bool(true));
            if let Value::Object(fields) = result {
                reply.extend(fields);
            }
        }
        Err(Failure { reason, stack }) => {
            reply.insert("success".to_owned(), Value::Bool(false));
            reply.insert("reason".to_owned(), reason);
            if let Some(stack) = stack {
                reply.insert("stack".to_owned(), Value::String(stack));
            }
        }
    }

    if let Some(greeting) = greeting {
        reply.entry("greeting").or_insert(greeting);
    }

    Value::Object(reply)
}
