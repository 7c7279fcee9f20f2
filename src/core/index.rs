//! Index lists
//!
//! The store only supports point lookups, so every entity kind is enumerated
//! through a list stored under its own key. Lists keep insertion order and
//! never hold the same entry twice. Membership checks are linear in the
//! number of entries.

use crate::core::codec;
use crate::core::keys::KeySpace;
use crate::core::traits::KvStore;
use crate::types::LedgerError;
use borsh::BorshSerialize;

/// Append `item` unless it is already present
///
/// # Returns
///
/// `true` if the item was appended
pub fn append_unique<T: PartialEq>(list: &mut Vec<T>, item: T) -> bool {
    if list.contains(&item) {
        return false;
    }
    list.push(item);
    true
}

/// Remove every occurrence of `item`
///
/// # Returns
///
/// `true` if anything was removed
pub fn remove_all<T: PartialEq>(list: &mut Vec<T>, item: &T) -> bool {
    let before = list.len();
    list.retain(|entry| entry != item);
    list.len() != before
}

pub fn active_names<S: KvStore + ?Sized>(store: &S, keys: &KeySpace) -> Result<Vec<String>, LedgerError> {
    codec::decode_string_list(&store.get(&keys.active_profiles()))
}

pub fn inactive_names<S: KvStore + ?Sized>(store: &S, keys: &KeySpace) -> Result<Vec<String>, LedgerError> {
    codec::decode_string_list(&store.get(&keys.inactive_profiles()))
}

pub fn invoice_ids<S: KvStore + ?Sized>(store: &S, keys: &KeySpace) -> Result<Vec<Vec<u8>>, LedgerError> {
    codec::decode_bytes_list(&store.get(&keys.invoice_list()))
}

pub fn payment_ids<S: KvStore + ?Sized>(store: &S, keys: &KeySpace) -> Result<Vec<String>, LedgerError> {
    codec::decode_string_list(&store.get(&keys.payment_list()))
}

/// Write a list back under `key`
pub fn save<S, T>(store: &mut S, key: &[u8], list: &[T]) -> Result<(), LedgerError>
where
    S: KvStore + ?Sized,
    T: BorshSerialize,
{
    store.set(key, codec::encode(&list)?);
    Ok(())
}
