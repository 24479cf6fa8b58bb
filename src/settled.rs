//! Awaiting a promise from async code.
use crate::{Error, Promise, Settlement};
use std::{
    fmt::{self, Debug, Formatter},
    future::{Future, IntoFuture},
    pin::Pin,
    task::{Context, Poll},
};

/// Resolves once the promise settles. Returned by [`Promise::settled`].
///
/// Any number of `Settled` futures, on any executors, can wait on the same
/// promise; each one is woken by the single settlement.
///
/// Dropping a `Settled` does not unregister its waker. Until the promise
/// settles or is abandoned, every task that ever polled it stays in the
/// promise's waker list.
///
/// # Examples
///
/// ```
/// use promise_out::{Promise, Settlement};
/// use futures::executor::block_on;
///
/// let (resolver, promise) = Promise::<String>::deferred();
/// let waiter = promise.clone();
/// let task = std::thread::spawn(move || {
///     block_on(async { waiter.settled().await.map(Settlement::clone) })
/// });
/// resolver.resolve("Hi".into());
/// let settlement = task.join().expect("The task thread has panicked.");
/// assert_eq!(settlement.unwrap(), Settlement::Fulfilled(String::from("Hi")));
/// ```
pub struct Settled<'a, T, E = T> {
    promise: &'a Promise<T, E>,
}

impl<'a, T, E> Settled<'a, T, E> {
    pub(crate) fn new(promise: &'a Promise<T, E>) -> Self {
        Self { promise }
    }
}

impl<'a, T, E> Future for Settled<'a, T, E> {
    type Output = Result<&'a Settlement<T, E>, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let promise = self.promise;
        promise.start();
        promise.shared().poll(cx)
    }
}

impl<'a, T, E> IntoFuture for &'a Promise<T, E> {
    type Output = Result<&'a Settlement<T, E>, Error>;
    type IntoFuture = Settled<'a, T, E>;

    fn into_future(self) -> Self::IntoFuture {
        self.settled()
    }
}

impl<T, E> Debug for Settled<'_, T, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settled").field("promise", self.promise).finish()
    }
}
