//! Durable key/value storage for client state, in the manner of browser local storage.
pub mod file;
#[cfg(test)]
pub mod memory;

use crate::twoface::Fallible;

pub trait Storage {
    fn get(&self, key: &str) -> Fallible<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Fallible<()>;
    /// Removing a key that isn't there succeeds.
    fn remove(&self, key: &str) -> Fallible<()>;
}
