use crate::{shared::Shared, Settlement};
use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

/// The success callback handed to an executor.
pub type Resolve<T> = Box<dyn FnOnce(T) + Send>;
/// The failure callback handed to an executor.
pub type Reject<E> = Box<dyn FnOnce(E) + Send>;

/// The settling side of a promise.
///
/// Clones race to settle the same promise; the first `resolve` or `reject`
/// wins and every later call is ignored. Once the last clone is dropped
/// without settling, the promise is abandoned and its observers are released.
///
/// # Examples
///
/// ```
/// use promise_out::Promise;
/// use std::thread;
///
/// let (resolver, promise) = Promise::<String>::deferred();
/// let task = thread::spawn(move || resolver.resolve("🍓".into()));
/// promise.then(Some(&mut |value: &String| println!("Received {value}")), None);
/// assert!(task.join().expect("The task thread has panicked"));
/// ```
pub struct Resolver<T, E = T> {
    guard: Arc<Guard<T, E>>,
}

struct Guard<T, E>(Arc<Shared<T, E>>);

impl<T, E> Drop for Guard<T, E> {
    fn drop(&mut self) {
        self.0.abandon();
    }
}

impl<T, E> Resolver<T, E> {
    pub(crate) fn new(shared: Arc<Shared<T, E>>) -> Self {
        Self {
            guard: Arc::new(Guard(shared)),
        }
    }

    /// Fulfills the promise. Returns `false` if it had already settled.
    pub fn resolve(self, value: T) -> bool {
        self.guard.0.settle(Settlement::Fulfilled(value))
    }

    /// Rejects the promise. Returns `false` if it had already settled.
    pub fn reject(self, reason: E) -> bool {
        self.guard.0.settle(Settlement::Rejected(reason))
    }

    pub fn is_settled(&self) -> bool {
        self.guard.0.get().is_some()
    }
}

impl<T, E> Resolver<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Splits into the `resolve`/`reject` pair an executor receives.
    pub fn into_callbacks(self) -> (Resolve<T>, Reject<E>) {
        let rejecter = self.clone();
        let resolve: Resolve<T> = Box::new(move |value| {
            self.resolve(value);
        });
        let reject: Reject<E> = Box::new(move |reason| {
            rejecter.reject(reason);
        });
        (resolve, reject)
    }
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Self {
            guard: self.guard.clone(),
        }
    }
}

impl<T, E> Debug for Resolver<T, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver").field("shared", &self.guard.0).finish()
    }
}
