//! Store abstraction consumed by the state-transition core
//!
//! The host owns the key/value store; the core only needs point reads and
//! writes. There is no delete: deactivation is a flag flip.

/// Key/value store the ledger reads from and writes to
///
/// Atomicity of the writes made while applying one transaction is the
/// host's responsibility. The core performs every check before its first
/// write, so a rejected transaction leaves the store untouched.
pub trait KvStore {
    /// Value stored at `key`, or an empty vector if nothing is stored
    fn get(&self, key: &[u8]) -> Vec<u8>;

    /// Store `value` at `key`, replacing any previous value
    fn set(&mut self, key: &[u8], value: Vec<u8>);
}

impl<S: KvStore + ?Sized> KvStore for &mut S {
    fn get(&self, key: &[u8]) -> Vec<u8> {
        (**self).get(key)
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) {
        (**self).set(key, value)
    }
}
