//! Turns one callback-style host call into a future.

use futures::{
    channel::oneshot,
    future::Map,
    task::{Context, Poll},
    FutureExt,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{future::Future, pin::Pin};

use crate::{
    host::{Completion, Dispatch},
    Error, Result,
};

/// One in-flight host invocation, settled exactly once.
#[must_use = "the host call has been made, but its outcome is only observed by polling"]
pub struct PendingCall<T> {
    name: &'static str,
    state: State<T>,
}

enum State<T> {
    Waiting(oneshot::Receiver<std::result::Result<T, String>>),
    Settled(Option<Result<T>>),
}

/// A [`PendingCall`] whose reply must also carry `success: true`.
pub type Acknowledged = Map<PendingCall<Value>, fn(Result<Value>) -> Result<Value>>;

/// Invokes the host right away and returns a future for the outcome.
///
/// The first outcome wins: a completion fired before a synchronous throw still resolves the
/// call, and a completion fired after one is ignored.
pub fn call<T, F>(name: &'static str, invoke: F) -> PendingCall<T>
where
    T: 'static,
    F: FnOnce(Completion<T>) -> Dispatch,
{
    let (sender, mut receiver) = oneshot::channel();
    let completion: Completion<T> = Box::new(move |result| {
        // the receiver is gone if the call already settled
        let _ = sender.send(result);
    });

    log::debug!("Invoking {}", name);

    let state = match invoke(completion) {
        Ok(()) => State::Waiting(receiver),
        Err(thrown) => State::Settled(Some(match receiver.try_recv() {
            Ok(Some(result)) => settle(name, result),
            _ => {
                log::debug!("{} threw: {}", name, thrown);
                Err(Error::Thrown(thrown))
            }
        })),
    };

    PendingCall { name, state }
}

/// Serializes `args` before invoking the host; if that fails the host is never called.
pub fn call_with<A, T, F>(name: &'static str, args: &A, invoke: F) -> PendingCall<T>
where
    A: Serialize + ?Sized,
    T: 'static,
    F: FnOnce(Value, Completion<T>) -> Dispatch,
{
    match serde_json::to_value(args) {
        Ok(args) => call(name, |done| invoke(args, done)),
        Err(e) => PendingCall::rejected(name, Error::from(e)),
    }
}

pub fn call_acknowledged<F>(name: &'static str, invoke: F) -> Acknowledged
where
    F: FnOnce(Completion<Value>) -> Dispatch,
{
    acknowledged(call(name, invoke))
}

pub fn acknowledged(pending: PendingCall<Value>) -> Acknowledged {
    pending.map(check_acknowledged as fn(_) -> _)
}

impl<T> PendingCall<T> {
    /// A call that failed before the host was reached.
    pub(crate) fn rejected(name: &'static str, error: Error) -> Self {
        log::debug!("{} rejected before dispatch: {}", name, error);

        Self {
            name,
            state: State::Settled(Some(Err(error))),
        }
    }
}

// `T` is only ever moved out, never pinned
impl<T> Unpin for PendingCall<T> {}

impl<T> Future for PendingCall<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let name = this.name;

        match &mut this.state {
            State::Settled(result) => {
                Poll::Ready(result.take().expect("PendingCall polled after completion"))
            }
            State::Waiting(receiver) => match futures::ready!(receiver.poll_unpin(cx)) {
                Ok(result) => Poll::Ready(settle(name, result)),
                Err(oneshot::Canceled) => {
                    log::warn!("{} dropped its completion without calling it", name);
                    Poll::Ready(Err(Error::CallbackDropped))
                }
            },
        }
    }
}

impl<T> std::fmt::Debug for PendingCall<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state {
            State::Waiting(_) => "waiting",
            State::Settled(_) => "settled",
        };

        f.debug_struct("PendingCall")
            .field("name", &self.name)
            .field("state", &state)
            .finish()
    }
}

/// Deserializes whatever the host resolved with into `R`.
pub fn deserialized<F, R>(pending: F) -> impl Future<Output = Result<R>>
where
    F: Future<Output = Result<Value>>,
    R: DeserializeOwned,
{
    async move {
        let value = pending.await?;

        Ok::<_, Error>(serde_json::from_value(value)?)
    }
}

fn settle<T>(name: &'static str, result: std::result::Result<T, String>) -> Result<T> {
    match result {
        Ok(value) => {
            log::debug!("Successfully invoked {}", name);
            Ok(value)
        }
        Err(message) => {
            log::debug!("{} failed: {}", name, message);
            Err(Error::Host(message))
        }
    }
}

fn check_acknowledged(result: Result<Value>) -> Result<Value> {
    let reply = result?;

    match reply.get("success") {
        Some(Value::Bool(true)) => Ok(reply),
        _ => Err(Error::Nack(reply)),
    }
}
