//! A minimal cold event stream over host event sources.
//!
//! An [`Observable`] does nothing until it is subscribed to. Every subscription runs the setup
//! again, so the same observable can be started, stopped and restarted.

use futures::{
    channel::mpsc,
    stream::Stream,
    task::{Context, Poll},
    StreamExt,
};
use std::{
    cell::{Cell, RefCell},
    pin::Pin,
    rc::Rc,
};

use crate::{
    host::{EventSource, Listener},
    Error, Result,
};

pub type Deliver<T> = Rc<dyn Fn(T)>;
pub type Teardown = Box<dyn FnOnce()>;

pub struct Observable<T> {
    setup: Rc<dyn Fn(Deliver<T>) -> Result<Teardown>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            setup: self.setup.clone(),
        }
    }
}

impl<T: 'static> Observable<T> {
    /// `setup` registers whatever produces values and returns how to stop it.
    pub fn new<S>(setup: S) -> Self
    where
        S: Fn(Deliver<T>) -> Result<Teardown> + 'static,
    {
        Self {
            setup: Rc::new(setup),
        }
    }

    /// Fails if the source refused to start; nothing is delivered in that case.
    pub fn subscribe<F>(&self, next: F) -> Result<Subscription>
    where
        F: Fn(T) + 'static,
    {
        let active = Rc::new(Cell::new(true));
        let deliver: Deliver<T> = {
            let active = active.clone();
            Rc::new(move |value| {
                if active.get() {
                    next(value)
                }
            })
        };

        let teardown = match (self.setup)(deliver) {
            Ok(teardown) => teardown,
            Err(e) => {
                active.set(false);
                return Err(e);
            }
        };

        Ok(Subscription {
            active,
            teardown: RefCell::new(Some(teardown)),
        })
    }

    pub fn map<U, F>(self, f: F) -> Observable<U>
    where
        U: 'static,
        F: Fn(T) -> U + 'static,
    {
        let f = Rc::new(f);

        Observable::new(move |deliver: Deliver<U>| {
            let f = f.clone();
            let subscription = self.subscribe(move |value| deliver(f(value)))?;

            Ok(Box::new(move || subscription.unsubscribe()) as Teardown)
        })
    }

    /// Subscribes on first poll and unsubscribes when the stream is dropped.
    pub fn into_stream(self) -> EventStream<T> {
        EventStream {
            observable: self,
            state: StreamState::Idle,
        }
    }
}

/// Delivers every firing of `source` and answers the host with `respond`.
///
/// `respond` sees the event before subscribers do, since the host needs its answer synchronously.
pub fn listen_to<S, E, O, F>(source: Rc<S>, respond: F) -> Observable<E>
where
    S: EventSource<E, O> + ?Sized + 'static,
    E: 'static,
    O: 'static,
    F: Fn(&E) -> O + 'static,
{
    let respond = Rc::new(respond);

    Observable::new(move |deliver: Deliver<E>| {
        let respond = respond.clone();
        let listener: Listener<E, O> = Rc::new(move |event: E| {
            let output = respond(&event);
            deliver(event);
            output
        });

        source.add_listener(&listener).map_err(Error::Thrown)?;

        let source = source.clone();
        Ok(Box::new(move || source.remove_listener(&listener)) as Teardown)
    })
}

/// A handle to a running subscription.
///
/// Dropping the handle does not unsubscribe; whoever subscribed must call
/// [`Subscription::unsubscribe`].
pub struct Subscription {
    active: Rc<Cell<bool>>,
    teardown: RefCell<Option<Teardown>>,
}

impl Subscription {
    /// Stops delivery and removes the listener from its source. Calling it again does nothing.
    pub fn unsubscribe(&self) {
        self.active.set(false);

        let teardown = self.teardown.borrow_mut().take();
        if let Some(teardown) = teardown {
            teardown();
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.active.get())
            .finish()
    }
}

/// Yields an `Err` once, then ends, if the source refused to start.
pub struct EventStream<T> {
    observable: Observable<T>,
    state: StreamState<T>,
}

enum StreamState<T> {
    Idle,
    Running(Subscription, mpsc::UnboundedReceiver<T>),
    Failed,
}

impl<T: 'static> Stream for EventStream<T> {
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<T>>> {
        let this = self.get_mut();

        if let StreamState::Idle = this.state {
            let (sender, receiver) = mpsc::unbounded();
            let subscribed = this.observable.subscribe(move |value| {
                let _ = sender.unbounded_send(value);
            });

            match subscribed {
                Ok(subscription) => this.state = StreamState::Running(subscription, receiver),
                Err(e) => {
                    this.state = StreamState::Failed;
                    return Poll::Ready(Some(Err(e)));
                }
            }
        }

        match &mut this.state {
            StreamState::Running(_, receiver) => receiver.poll_next_unpin(cx).map(|next| next.map(Ok)),
            _ => Poll::Ready(None),
        }
    }
}

impl<T> Drop for EventStream<T> {
    fn drop(&mut self) {
        if let StreamState::Running(subscription, _) = &self.state {
            subscription.unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeEvent;
    use serde_json::json;
    use futures::{executor::block_on, FutureExt, StreamExt};

    fn counting() -> (Rc<RefCell<Vec<u32>>>, impl Fn(u32) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();

        (seen, move |value| sink.borrow_mut().push(value))
    }

    #[test]
    fn does_not_register_before_subscribe() {
        let event = Rc::new(FakeEvent::<u32>::default());
        let _observable = listen_to(event.clone(), |_| ());

        assert_eq!(event.listener_count(), 0);
    }

    #[test]
    fn delivers_every_firing_in_order() {
        let event = Rc::new(FakeEvent::<u32>::default());
        let (seen, next) = counting();

        let _subscription = listen_to(event.clone(), |_| ()).subscribe(next).unwrap();
        for n in 1..=3 {
            event.fire(n);
        }

        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let event = Rc::new(FakeEvent::<u32>::default());
        let (seen, next) = counting();

        let subscription = listen_to(event.clone(), |_| ()).subscribe(next).unwrap();
        event.fire(1);
        event.fire(2);
        subscription.unsubscribe();
        event.fire(3);

        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(event.listener_count(), 0);
        assert!(!subscription.is_active());
    }

    #[test]
    fn unsubscribing_twice_is_a_no_op() {
        let event = Rc::new(FakeEvent::<u32>::default());

        let subscription = listen_to(event.clone(), |_| ()).subscribe(|_| ()).unwrap();
        subscription.unsubscribe();
        subscription.unsubscribe();

        assert_eq!(event.removed.get(), 1);
    }

    #[test]
    fn can_be_restarted_after_unsubscribing() {
        let event = Rc::new(FakeEvent::<u32>::default());
        let observable = listen_to(event.clone(), |_| ());
        let (seen, next) = counting();
        let next = Rc::new(next);

        let first = {
            let next = next.clone();
            observable.subscribe(move |value| next(value)).unwrap()
        };
        event.fire(1);
        first.unsubscribe();
        event.fire(2);
        let _second = observable.subscribe(move |value| next(value)).unwrap();
        event.fire(3);

        assert_eq!(*seen.borrow(), vec![1, 3]);
        assert_eq!(event.added.get(), 2);
    }

    #[test]
    fn listener_answers_the_host() {
        let event = Rc::new(FakeEvent::<u32, u32>::default());

        let _subscription = listen_to(event.clone(), |n| n * 10).subscribe(|_| ()).unwrap();

        assert_eq!(event.fire(4), vec![40]);
    }

    #[test]
    fn map_transforms_values_and_tears_down_upstream() {
        let event = Rc::new(FakeEvent::<u32>::default());
        let (seen, next) = counting();

        let subscription = listen_to(event.clone(), |_| ())
            .map(|n| n + 100)
            .subscribe(next).unwrap();
        event.fire(1);
        subscription.unsubscribe();

        assert_eq!(*seen.borrow(), vec![101]);
        assert_eq!(event.listener_count(), 0);
    }

    #[test]
    fn stream_starts_lazily_and_stops_on_drop() {
        let event = Rc::new(FakeEvent::<u32>::default());
        let mut stream = listen_to(event.clone(), |_| ()).into_stream();

        assert_eq!(event.listener_count(), 0);
        assert!(stream.next().now_or_never().is_none());
        assert_eq!(event.listener_count(), 1);

        event.fire(5);
        event.fire(6);
        assert_eq!(block_on(stream.next()).unwrap().unwrap(), 5);
        assert_eq!(block_on(stream.next()).unwrap().unwrap(), 6);

        drop(stream);
        assert_eq!(event.listener_count(), 0);
    }

    #[test]
    fn refused_listener_fails_the_subscription() {
        let event = Rc::new(FakeEvent::<u32>::default());
        event.refuse(json!("'webRequestBlocking' requires manifest version of 2 or lower."));
        let (seen, next) = counting();

        let error = listen_to(event.clone(), |_| ()).subscribe(next).unwrap_err();
        event.fire(1);

        assert!(matches!(error, Error::Thrown(_)));
        assert_eq!(event.listener_count(), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn refusal_propagates_through_map() {
        let event = Rc::new(FakeEvent::<u32>::default());
        event.refuse(json!("boo!"));

        let result = listen_to(event.clone(), |_| ()).map(|n| n + 1).subscribe(|_| ());

        assert!(result.is_err());
    }

    #[test]
    fn refused_stream_yields_the_error_then_ends() {
        let event = Rc::new(FakeEvent::<u32>::default());
        event.refuse(json!("boo!"));
        let mut stream = listen_to(event.clone(), |_| ()).into_stream();

        let first = block_on(stream.next()).unwrap();

        assert_eq!(first.unwrap_err().to_string(), "host call threw: \"boo!\"");
        assert!(block_on(stream.next()).is_none());
    }
}
