use thiserror::Error;

/// Failures of the promise machinery itself.
///
/// A rejection is not an `Error`: it is a regular settlement and is handed to
/// `catch`/`then` like any other value.
#[derive(Debug, Error)]
pub enum Error {
    /// The observation deadline passed before the promise settled.
    #[error("timed out waiting for the promise to settle")]
    Timeout,
    /// Every resolve/reject handle was dropped without settling.
    #[error("the promise was abandoned before it settled")]
    Abandoned,
    /// The executor thread could not be started.
    #[error("failed to spawn the executor thread: {0}")]
    Spawn(#[from] std::io::Error),
}
