//! The state every handle of one promise points at: a write-once result cell
//! and the signaling that tells blocked threads and parked tasks it was
//! written.
use crate::{Error, Settlement};
use std::{
    fmt::{self, Debug, Formatter},
    sync::{Arc, Condvar, Mutex, MutexGuard, OnceLock, PoisonError},
    task::{Context, Poll, Waker},
    time::Instant,
};

/// Deferred start of an executor, run by the first observation.
pub(crate) type Starter<T, E> = Box<dyn FnOnce(Arc<Shared<T, E>>) + Send>;

pub(crate) struct Shared<T, E> {
    value: OnceLock<Settlement<T, E>>,
    inner: Mutex<Inner<T, E>>,
    signal: Condvar,
}

struct Inner<T, E> {
    abandoned: bool,
    wakers: Vec<Waker>,
    starter: Option<Starter<T, E>>,
}

impl<T, E> Shared<T, E> {
    pub(crate) fn pending() -> Self {
        Self::build(OnceLock::new(), None)
    }

    pub(crate) fn lazy(starter: Starter<T, E>) -> Self {
        Self::build(OnceLock::new(), Some(starter))
    }

    pub(crate) fn settled(settlement: Settlement<T, E>) -> Self {
        Self::build(OnceLock::from(settlement), None)
    }

    fn build(value: OnceLock<Settlement<T, E>>, starter: Option<Starter<T, E>>) -> Self {
        Self {
            value,
            inner: Mutex::new(Inner {
                abandoned: false,
                wakers: vec![],
                starter,
            }),
            signal: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T, E>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn get(&self) -> Option<&Settlement<T, E>> {
        self.value.get()
    }

    pub(crate) fn take_starter(&self) -> Option<Starter<T, E>> {
        self.lock().starter.take()
    }

    /// Stores `settlement` unless the cell is already written. Returns whether
    /// this call settled the promise.
    pub(crate) fn settle(&self, settlement: Settlement<T, E>) -> bool {
        let state = settlement.state();
        if self.value.set(settlement).is_err() {
            log::debug!("promise already settled, ignoring {state:?}");
            return false;
        }
        // Taking the lock after the write orders us behind any observer that
        // checked the cell and is about to wait.
        let wakers = std::mem::take(&mut self.lock().wakers);
        self.signal.notify_all();
        for waker in wakers {
            waker.wake()
        }
        log::trace!("promise settled as {state:?}");
        true
    }

    /// Releases every observer of a promise nobody can settle any more.
    pub(crate) fn abandon(&self) {
        if self.value.get().is_some() {
            return;
        }
        let wakers = {
            let mut inner = self.lock();
            inner.abandoned = true;
            std::mem::take(&mut inner.wakers)
        };
        self.signal.notify_all();
        for waker in wakers {
            waker.wake()
        }
        log::warn!("promise abandoned: every resolve/reject handle dropped without settling");
    }

    /// Blocks until the cell is written, the promise is abandoned, or
    /// `deadline` passes.
    pub(crate) fn wait(&self, deadline: Option<Instant>) -> Result<&Settlement<T, E>, Error> {
        let mut inner = self.lock();
        loop {
            if let Some(settlement) = self.value.get() {
                return Ok(settlement);
            }
            if inner.abandoned {
                return Err(Error::Abandoned);
            }
            inner = match deadline {
                None => self.signal.wait(inner).unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Err(Error::Timeout);
                    }
                    self.signal
                        .wait_timeout(inner, remaining)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
    }

    pub(crate) fn poll(&self, cx: &mut Context<'_>) -> Poll<Result<&Settlement<T, E>, Error>> {
        if let Some(settlement) = self.value.get() {
            return Poll::Ready(Ok(settlement));
        }
        let mut inner = self.lock();
        // Re-check under the lock so a concurrent settle cannot slip between
        // the first check and registering the waker.
        if let Some(settlement) = self.value.get() {
            return Poll::Ready(Ok(settlement));
        }
        if inner.abandoned {
            return Poll::Ready(Err(Error::Abandoned));
        }
        if !inner.wakers.iter().any(|waker| waker.will_wake(cx.waker())) {
            inner.wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}

impl<T, E> Debug for Shared<T, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let state = self.value.get().map(Settlement::state);
        let inner = self.lock();
        f.debug_struct("Shared")
            .field("state", &state)
            .field("abandoned", &inner.abandoned)
            .field("wakers", &inner.wakers.len())
            .field("lazy", &inner.starter.is_some())
            .finish()
    }
}
