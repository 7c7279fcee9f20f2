//! Typed access to stored entities
//!
//! Thin load/save helpers that pair a [`KeySpace`] key with the matching
//! codec function, shared by the handlers and the query reader.

use crate::core::codec;
use crate::core::index;
use crate::core::keys::{to_hex, KeySpace};
use crate::core::traits::KvStore;
use crate::types::{Invoice, LedgerError, Payment, Profile};

pub fn load_profile<S: KvStore + ?Sized>(
    store: &S,
    keys: &KeySpace,
    name: &str,
) -> Result<Profile, LedgerError> {
    codec::decode_profile(&store.get(&keys.profile(name)))
}

pub fn save_profile<S: KvStore + ?Sized>(
    store: &mut S,
    keys: &KeySpace,
    profile: &Profile,
) -> Result<(), LedgerError> {
    store.set(&keys.profile(&profile.name), codec::encode(profile)?);
    Ok(())
}

/// Load a profile, mapping "nothing stored" to `None`
pub fn find_profile<S: KvStore + ?Sized>(
    store: &S,
    keys: &KeySpace,
    name: &str,
) -> Result<Option<Profile>, LedgerError> {
    match load_profile(store, keys, name) {
        Ok(profile) => Ok(Some(profile)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// The active profile owned by `address`, if any
///
/// Scans the active-name list.
pub fn active_profile_by_address<S: KvStore + ?Sized>(
    store: &S,
    keys: &KeySpace,
    address: &[u8],
) -> Result<Option<Profile>, LedgerError> {
    for name in index::active_names(store, keys)? {
        let profile = load_profile(store, keys, &name)?;
        if profile.active && profile.address == address {
            return Ok(Some(profile));
        }
    }
    Ok(None)
}

/// The profile an invoice or payment is sent from
///
/// # Errors
///
/// * [`LedgerError::ProfileInactive`] if the caller only owns a deactivated profile
/// * [`LedgerError::NoSender`] if the caller owns no profile at all
pub fn sender_profile<S: KvStore + ?Sized>(
    store: &S,
    keys: &KeySpace,
    address: &[u8],
) -> Result<Profile, LedgerError> {
    if let Some(profile) = active_profile_by_address(store, keys, address)? {
        return Ok(profile);
    }
    for name in index::inactive_names(store, keys)? {
        if load_profile(store, keys, &name)?.address == address {
            return Err(LedgerError::profile_inactive(&name));
        }
    }
    Err(LedgerError::NoSender {
        name: to_hex(address),
    })
}

pub fn load_invoice<S: KvStore + ?Sized>(
    store: &S,
    keys: &KeySpace,
    id: &[u8],
) -> Result<Invoice, LedgerError> {
    codec::decode_invoice(&store.get(&keys.invoice(id)))
}

/// Load an invoice that a transaction refers to
///
/// # Errors
///
/// Returns [`LedgerError::InvoiceMissing`] if nothing is stored under `id`.
pub fn require_invoice<S: KvStore + ?Sized>(
    store: &S,
    keys: &KeySpace,
    id: &[u8],
) -> Result<Invoice, LedgerError> {
    load_invoice(store, keys, id).map_err(|e| {
        if e.is_not_found() {
            LedgerError::invoice_missing(&to_hex(id))
        } else {
            e
        }
    })
}

pub fn save_invoice<S: KvStore + ?Sized>(
    store: &mut S,
    keys: &KeySpace,
    invoice: &Invoice,
) -> Result<(), LedgerError> {
    store.set(&keys.invoice(invoice.id()), codec::encode(invoice)?);
    Ok(())
}

pub fn load_payment<S: KvStore + ?Sized>(
    store: &S,
    keys: &KeySpace,
    transaction_id: &str,
) -> Result<Payment, LedgerError> {
    codec::decode_payment(&store.get(&keys.payment(transaction_id)))
}

pub fn save_payment<S: KvStore + ?Sized>(
    store: &mut S,
    keys: &KeySpace,
    payment: &Payment,
) -> Result<(), LedgerError> {
    store.set(&keys.payment(&payment.transaction_id), codec::encode(payment)?);
    Ok(())
}
