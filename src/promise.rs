use crate::{
    resolver::{Reject, Resolve, Resolver},
    settled::Settled,
    shared::Shared,
    Builder, Error, Settlement, State,
};
use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
    time::{Duration, Instant},
};

/// A value that an executor settles exactly once, either fulfilled with a `T`
/// or rejected with an `E`.
///
/// The executor runs once. Its settlement is cached and every observation
/// (`then`, `catch`, `finally`, `wait`, or awaiting [`Promise::settled`])
/// sees the same one, no matter when or from which thread it is attached.
/// Observations block the calling thread until the promise settles, run the
/// matching callback there with a borrow of the value, and return the same
/// promise so further observations can be chained.
///
/// Nothing reports a rejection that no observation looks at.
///
/// # Examples
///
/// ```
/// use promise_out::Promise;
/// use std::{thread, time::Duration};
///
/// let promise: Promise<i32> = Promise::new(|resolve, _reject| {
///     thread::sleep(Duration::from_millis(20));
///     resolve(32);
/// });
/// promise
///     .then(Some(&mut |value: &i32| println!("resolved {value}")), None)
///     .catch(Some(&mut |reason: &i32| println!("rejected {reason}")))
///     .finally(Some(&mut |value: &i32| assert_eq!(*value, 32)));
/// ```
pub struct Promise<T, E = T> {
    shared: Arc<Shared<T, E>>,
}

impl<T, E> Promise<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Starts `executor` on a new thread and returns the pending promise.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to create a thread, like [`std::thread::spawn`].
    /// Use [`Builder::spawn`] to handle that case.
    pub fn new<F>(executor: F) -> Self
    where
        F: FnOnce(Resolve<T>, Reject<E>) + Send + 'static,
    {
        Builder::new()
            .spawn(executor)
            .expect("failed to spawn executor thread")
    }
}

impl<T, E> Promise<T, E> {
    pub(crate) fn from_shared(shared: Arc<Shared<T, E>>) -> Self {
        Self { shared }
    }

    /// An already fulfilled promise.
    pub fn resolved(value: T) -> Self {
        Self::from_shared(Arc::new(Shared::settled(Settlement::Fulfilled(value))))
    }

    /// An already rejected promise.
    pub fn rejected(reason: E) -> Self {
        Self::from_shared(Arc::new(Shared::settled(Settlement::Rejected(reason))))
    }

    /// A pending promise settled through the returned [`Resolver`] instead of
    /// an executor.
    pub fn deferred() -> (Resolver<T, E>, Self) {
        let shared = Arc::new(Shared::pending());
        (Resolver::new(shared.clone()), Self::from_shared(shared))
    }

    pub fn state(&self) -> State {
        self.shared
            .get()
            .map_or(State::Pending, Settlement::state)
    }

    pub fn is_settled(&self) -> bool {
        self.shared.get().is_some()
    }

    /// The settlement, if there is one yet. Never blocks and never starts a
    /// lazy executor.
    pub fn try_settlement(&self) -> Option<&Settlement<T, E>> {
        self.shared.get()
    }

    /// Runs a lazy executor if it has not been started yet.
    pub(crate) fn start(&self) {
        if let Some(starter) = self.shared.take_starter() {
            starter(self.shared.clone());
        }
    }

    pub(crate) fn shared(&self) -> &Shared<T, E> {
        &self.shared
    }

    /// Blocks until the promise settles.
    ///
    /// Fails with [`Error::Abandoned`] if the executor dropped both callbacks
    /// (or panicked) without settling.
    pub fn wait(&self) -> Result<&Settlement<T, E>, Error> {
        self.start();
        self.shared.wait(None)
    }

    /// Like [`Promise::wait`], but gives up with [`Error::Timeout`] once
    /// `timeout` has elapsed. The promise itself is left untouched.
    ///
    /// A timeout too large to represent as a deadline waits without one.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<&Settlement<T, E>, Error> {
        self.start();
        self.shared.wait(Instant::now().checked_add(timeout))
    }

    /// A future resolving to the settlement, for use from async code.
    pub fn settled(&self) -> Settled<'_, T, E> {
        Settled::new(self)
    }

    /// Waits for settlement, then calls `on_fulfilled` or `on_rejected`.
    ///
    /// Absent callbacks are skipped. An abandoned promise calls neither.
    pub fn then(
        &self,
        on_fulfilled: Option<&mut dyn FnMut(&T)>,
        on_rejected: Option<&mut dyn FnMut(&E)>,
    ) -> &Self {
        if let Ok(settlement) = self.wait() {
            dispatch(settlement, on_fulfilled, on_rejected);
        }
        self
    }

    /// Waits for settlement, then calls `on_rejected` if the promise was
    /// rejected.
    pub fn catch(&self, on_rejected: Option<&mut dyn FnMut(&E)>) -> &Self {
        self.then(None, on_rejected)
    }

    /// Waits for settlement, then hands the whole settlement to `on_settled`.
    pub fn on_settled(&self, on_settled: Option<&mut dyn FnMut(&Settlement<T, E>)>) -> &Self {
        if let (Ok(settlement), Some(on_settled)) = (self.wait(), on_settled) {
            on_settled(settlement);
        }
        self
    }

    pub fn then_timeout(
        &self,
        timeout: Duration,
        on_fulfilled: Option<&mut dyn FnMut(&T)>,
        on_rejected: Option<&mut dyn FnMut(&E)>,
    ) -> Result<&Self, Error> {
        let settlement = self.wait_timeout(timeout)?;
        dispatch(settlement, on_fulfilled, on_rejected);
        Ok(self)
    }

    pub fn catch_timeout(
        &self,
        timeout: Duration,
        on_rejected: Option<&mut dyn FnMut(&E)>,
    ) -> Result<&Self, Error> {
        self.then_timeout(timeout, None, on_rejected)
    }
}

impl<T> Promise<T, T> {
    /// Waits for settlement, then calls `on_settled` with the value whether
    /// the promise was fulfilled or rejected.
    pub fn finally(&self, on_settled: Option<&mut dyn FnMut(&T)>) -> &Self {
        if let (Ok(settlement), Some(on_settled)) = (self.wait(), on_settled) {
            on_settled(settlement.value());
        }
        self
    }

    pub fn finally_timeout(
        &self,
        timeout: Duration,
        on_settled: Option<&mut dyn FnMut(&T)>,
    ) -> Result<&Self, Error> {
        let settlement = self.wait_timeout(timeout)?;
        if let Some(on_settled) = on_settled {
            on_settled(settlement.value());
        }
        Ok(self)
    }
}

fn dispatch<T, E>(
    settlement: &Settlement<T, E>,
    on_fulfilled: Option<&mut dyn FnMut(&T)>,
    on_rejected: Option<&mut dyn FnMut(&E)>,
) {
    match (settlement, on_fulfilled, on_rejected) {
        (Settlement::Fulfilled(value), Some(on_fulfilled), _) => on_fulfilled(value),
        (Settlement::Rejected(reason), _, Some(on_rejected)) => on_rejected(reason),
        _ => {}
    }
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T, E> Debug for Promise<T, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise").field("shared", &self.shared).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Promise;
    use crate::{Error, Settlement, State};
    use std::{
        cell::Cell,
        sync::{
            atomic::{AtomicUsize, Ordering::SeqCst},
            Arc,
        },
        thread,
        time::{Duration, Instant},
    };

    #[test]
    fn test_then_dispatches_fulfilled() {
        let promise: Promise<i32> = Promise::new(|resolve, _reject| resolve(32));
        let mut fulfilled = vec![];
        let mut rejected = vec![];
        promise.then(
            Some(&mut |value: &i32| fulfilled.push(*value)),
            Some(&mut |reason: &i32| rejected.push(*reason)),
        );
        assert_eq!(fulfilled, [32]);
        assert!(rejected.is_empty());
    }

    #[test]
    fn test_catch_dispatch() {
        let rejected: Promise<i32> = Promise::new(|_resolve, reject| reject(31));
        let fulfilled: Promise<i32> = Promise::new(|resolve, _reject| resolve(32));
        let mut caught = vec![];
        rejected.catch(Some(&mut |reason: &i32| caught.push(*reason)));
        fulfilled.catch(Some(&mut |reason: &i32| caught.push(*reason)));
        assert_eq!(caught, [31]);
    }

    #[test]
    fn test_finally_sees_either_value() {
        let mut seen = vec![];
        let fulfilled: Promise<i32> = Promise::new(|resolve, _reject| resolve(32));
        let rejected: Promise<i32> = Promise::new(|_resolve, reject| reject(31));
        fulfilled.finally(Some(&mut |value: &i32| seen.push(*value)));
        rejected.finally(Some(&mut |value: &i32| seen.push(*value)));
        assert_eq!(seen, [32, 31]);
    }

    #[test]
    fn test_absent_callbacks() {
        let promise: Promise<i32> = Promise::new(|resolve, _reject| resolve(32));
        promise.then(None, None).catch(None).finally(None).on_settled(None);
        assert_eq!(promise.state(), State::Fulfilled);
    }

    #[test]
    fn test_then_blocks_until_settled() {
        let start = Instant::now();
        let promise: Promise<i32> = Promise::new(|_resolve, reject| {
            thread::sleep(Duration::from_millis(50));
            reject(31);
        });
        let mut elapsed = None;
        promise.then(None, Some(&mut |_: &i32| elapsed = Some(start.elapsed())));
        assert!(elapsed.expect("rejection callback was not called") >= Duration::from_millis(50));
    }

    #[test]
    fn test_executor_runs_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let promise: Promise<i32> = Promise::new(move |resolve, _reject| {
            counter.fetch_add(1, SeqCst);
            resolve(32);
        });
        promise.then(None, None).catch(None).finally(None);
        promise.wait().unwrap();
        assert_eq!(runs.load(SeqCst), 1);
    }

    #[test]
    fn test_resolve_and_reject_race() {
        let promise: Promise<i32> = Promise::new(|resolve, reject| {
            let rejecter = thread::spawn(move || reject(31));
            resolve(32);
            rejecter.join().expect("The rejecter thread has panicked");
        });
        let outcomes = Cell::new(0);
        promise
            .then(
                Some(&mut |_: &i32| outcomes.set(outcomes.get() + 1)),
                Some(&mut |_: &i32| outcomes.set(outcomes.get() + 1)),
            )
            .then(None, None);
        assert_eq!(outcomes.get(), 1);
        let first = *promise.wait().unwrap();
        assert_eq!(promise.try_settlement(), Some(&first));
    }

    #[test]
    fn test_wait_timeout_leaves_promise_pending() {
        let promise: Promise<i32> = Promise::new(|resolve, _reject| {
            thread::sleep(Duration::from_millis(200));
            resolve(32);
        });
        assert!(matches!(promise.wait_timeout(Duration::from_millis(20)), Err(Error::Timeout)));
        assert!(matches!(
            promise.then_timeout(Duration::from_millis(1), None, None),
            Err(Error::Timeout)
        ));
        assert_eq!(promise.state(), State::Pending);
        assert_eq!(promise.wait().unwrap(), &Settlement::Fulfilled(32));
    }

    #[test]
    fn test_unbounded_timeout() {
        let settled: Promise<i32> = Promise::resolved(32);
        assert_eq!(settled.wait_timeout(Duration::MAX).unwrap(), &Settlement::Fulfilled(32));
        let mut value = 0;
        settled
            .then_timeout(Duration::MAX, Some(&mut |v: &i32| value = *v), None)
            .expect("settled promise timed out");
        assert_eq!(value, 32);

        let pending: Promise<i32> = Promise::new(|_resolve, reject| {
            thread::sleep(Duration::from_millis(30));
            reject(31);
        });
        let mut reason = 0;
        pending
            .then_timeout(Duration::MAX, None, Some(&mut |r: &i32| reason = *r))
            .expect("pending promise timed out");
        assert_eq!(reason, 31);
        assert_eq!(pending.wait_timeout(Duration::MAX).unwrap(), &Settlement::Rejected(31));
    }

    #[test]
    fn test_timeout_variants_dispatch_when_settled() {
        let promise: Promise<i32> = Promise::rejected(31);
        let mut caught = 0;
        let mut finally = 0;
        promise
            .catch_timeout(Duration::from_millis(10), Some(&mut |reason: &i32| caught = *reason))
            .and_then(|promise| promise.finally_timeout(Duration::ZERO, Some(&mut |value: &i32| finally = *value)))
            .expect("settled promise timed out");
        assert_eq!((caught, finally), (31, 31));
    }

    #[test]
    fn test_executor_panic_abandons() {
        let promise: Promise<i32> = Promise::new(|_resolve, _reject| panic!("executor failed"));
        assert!(matches!(promise.wait(), Err(Error::Abandoned)));
        let called = Cell::new(false);
        promise.then(Some(&mut |_: &i32| called.set(true)), Some(&mut |_: &i32| called.set(true)));
        assert!(!called.get());
    }

    #[test]
    fn test_heterogeneous_on_settled() {
        let promise: Promise<u8, String> = Promise::rejected("💥".into());
        let mut seen = None;
        promise.on_settled(Some(&mut |settlement: &Settlement<u8, String>| seen = Some(settlement.clone())));
        assert_eq!(seen, Some(Settlement::Rejected(String::from("💥"))));
        assert_eq!(promise.state(), State::Rejected);
    }

    #[test]
    fn test_observers_on_many_threads() {
        let promise: Promise<String> = Promise::new(|resolve, _reject| {
            thread::sleep(Duration::from_millis(30));
            resolve(String::from("🍓"));
        });
        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let promise = promise.clone();
                thread::spawn(move || {
                    let mut value = String::new();
                    promise.then(Some(&mut |v: &String| value = v.clone()), None);
                    value
                })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.join().expect("The task thread has panicked"), "🍓");
        }
        // Attached after settlement.
        let mut late = String::new();
        promise.finally(Some(&mut |v: &String| late = v.clone()));
        assert_eq!(late, "🍓");
    }
}
