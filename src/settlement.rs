/// The terminal value of a promise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Settlement<T, E = T> {
    Fulfilled(T),
    Rejected(E),
}

impl<T, E> Settlement<T, E> {
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Settlement::Fulfilled(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Settlement::Rejected(_))
    }

    pub fn state(&self) -> State {
        match self {
            Settlement::Fulfilled(_) => State::Fulfilled,
            Settlement::Rejected(_) => State::Rejected,
        }
    }

    pub fn as_ref(&self) -> Settlement<&T, &E> {
        match self {
            Settlement::Fulfilled(value) => Settlement::Fulfilled(value),
            Settlement::Rejected(reason) => Settlement::Rejected(reason),
        }
    }

    /// Converts into a `Result`, fulfilled values on the `Ok` side.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Settlement::Fulfilled(value) => Ok(value),
            Settlement::Rejected(reason) => Err(reason),
        }
    }
}

impl<T> Settlement<T, T> {
    /// The settled value, whichever way it settled.
    pub fn value(&self) -> &T {
        match self {
            Settlement::Fulfilled(value) | Settlement::Rejected(value) => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Settlement::Fulfilled(value) | Settlement::Rejected(value) => value,
        }
    }
}

impl<T, E> From<Result<T, E>> for Settlement<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Settlement::Fulfilled(value),
            Err(reason) => Settlement::Rejected(reason),
        }
    }
}

/// Where a promise is in its lifecycle. `Fulfilled` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Pending,
    Fulfilled,
    Rejected,
}
