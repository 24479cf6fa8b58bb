use crate::{
    resolver::{Reject, Resolve, Resolver},
    shared::{Shared, Starter},
    Error, Promise,
};
use std::{io, sync::Arc, thread};

/// Configures how a promise's executor is started.
///
/// By default the executor starts immediately on a fresh, unnamed thread.
///
/// ```
/// use promise_out::{Builder, Promise};
///
/// let promise: Promise<i32> = Builder::new()
///     .name("answer")
///     .lazy(true)
///     .spawn(|resolve, _reject| resolve(42))
///     .expect("failed to spawn executor");
/// promise.then(Some(&mut |value: &i32| assert_eq!(*value, 42)), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    name: Option<String>,
    stack_size: Option<usize>,
    lazy: bool,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the executor thread.
    pub fn name(self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    /// Sets the stack size of the executor thread, in bytes.
    pub fn stack_size(self, stack_size: usize) -> Self {
        Self {
            stack_size: Some(stack_size),
            ..self
        }
    }

    /// Defers starting the executor until the promise is first observed.
    ///
    /// A lazy promise that fails to spawn its thread at that point is
    /// abandoned rather than reporting `Error::Spawn`.
    pub fn lazy(self, lazy: bool) -> Self {
        Self { lazy, ..self }
    }

    /// Creates a promise driven by `executor`.
    pub fn spawn<T, E, F>(self, executor: F) -> Result<Promise<T, E>, Error>
    where
        T: Send + Sync + 'static,
        E: Send + Sync + 'static,
        F: FnOnce(Resolve<T>, Reject<E>) + Send + 'static,
    {
        if self.lazy {
            let starter: Starter<T, E> = Box::new(move |shared| {
                if let Err(err) = self.start(shared, executor) {
                    log::warn!("failed to start lazy executor: {err}");
                }
            });
            return Ok(Promise::from_shared(Arc::new(Shared::lazy(starter))));
        }
        let shared = Arc::new(Shared::pending());
        self.start(shared.clone(), executor)?;
        Ok(Promise::from_shared(shared))
    }

    fn start<T, E, F>(self, shared: Arc<Shared<T, E>>, executor: F) -> io::Result<()>
    where
        T: Send + Sync + 'static,
        E: Send + Sync + 'static,
        F: FnOnce(Resolve<T>, Reject<E>) + Send + 'static,
    {
        let (resolve, reject) = Resolver::new(shared).into_callbacks();
        let mut builder = thread::Builder::new();
        if let Some(name) = self.name.clone() {
            builder = builder.name(name);
        }
        if let Some(stack_size) = self.stack_size {
            builder = builder.stack_size(stack_size);
        }
        let label = self.name.unwrap_or_else(|| String::from("<unnamed>"));
        builder.spawn(move || {
            log::trace!("executor '{label}' starting");
            executor(resolve, reject);
            log::trace!("executor '{label}' returned");
        })?;
        Ok(())
    }
}
