//! A promise for threads: an executor settles it once, as fulfilled or
//! rejected, and any number of `then`/`catch`/`finally` observations see
//! that one settlement.
//!
//! ```
//! use promise_out::Promise;
//! use std::{thread, time::Duration};
//!
//! let p1: Promise<i32> = Promise::new(|resolve, _reject| {
//!     thread::sleep(Duration::from_millis(200));
//!     resolve(32);
//! });
//! let p2: Promise<i32> = Promise::new(|_resolve, reject| {
//!     thread::sleep(Duration::from_millis(50));
//!     reject(31);
//! });
//!
//! let task = thread::spawn(move || {
//!     p1.then(Some(&mut |value: &i32| println!("P1 Then Resolved: {value}")), None)
//!         .catch(Some(&mut |reason: &i32| println!("P1 Catch: {reason}")))
//!         .finally(Some(&mut |value: &i32| println!("P1 Finally {value}")));
//! });
//! p2.then(None, Some(&mut |reason: &i32| println!("P2 Then Rejected: {reason}")))
//!     .catch(Some(&mut |reason: &i32| println!("P2 Catch: {reason}")))
//!     .finally(Some(&mut |value: &i32| println!("P2 Finally {value}")));
//! task.join().expect("The P1 thread has panicked");
//! ```
//!
//! The crate logs through the [`log`] facade and installs no logger.
mod builder;
mod error;
mod promise;
mod resolver;
mod settled;
mod settlement;
mod shared;

pub use builder::Builder;
pub use error::Error;
pub use promise::Promise;
pub use resolver::{Reject, Resolve, Resolver};
pub use settled::Settled;
pub use settlement::{Settlement, State};
