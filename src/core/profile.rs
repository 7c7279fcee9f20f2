//! Profile state machine
//!
//! This module implements the three profile transitions:
//! - `open`: register a name (or reopen one that was deactivated)
//! - `edit`: overwrite an active profile's details in place
//! - `deactivate`: flip `active` off and move the name to the inactive list
//!
//! Every transition resolves the name against the active list first and
//! rejects the transaction if that disagrees with the operation's
//! expectation. All checks run before the first store write.

use crate::core::index;
use crate::core::keys::{to_hex, KeySpace};
use crate::core::state;
use crate::core::traits::KvStore;
use crate::types::{CallContext, LedgerError, Profile, TxProfile};
use tracing::debug;

/// Validation shared by every profile transition
///
/// # Errors
///
/// Returns an error if:
/// - The name is empty
/// - The accepted currency is empty
/// - The due duration is negative
pub fn validate(profile: &Profile) -> Result<(), LedgerError> {
    if profile.name.is_empty() {
        return Err(LedgerError::missing_field("profile", "name"));
    }
    if profile.accepted_cur.is_empty() {
        return Err(LedgerError::missing_field("profile", "accepted currency"));
    }
    if profile.due_duration_days < 0 {
        return Err(LedgerError::NegativeDueDuration {
            days: profile.due_duration_days,
        });
    }
    Ok(())
}

/// Build the profile a transaction describes, owned by the caller
fn from_tx(call: &CallContext, name: String, tx: &TxProfile) -> Profile {
    Profile::new(
        call.caller.clone(),
        name,
        tx.accepted_cur.clone(),
        tx.deposit_info.clone(),
        tx.due_duration_days,
    )
}

/// Resolve the profile an edit or deactivation targets
///
/// An empty name resolves to the caller's active profile. The name must be
/// on the active list and the stored record must belong to the caller.
///
/// # Errors
///
/// Returns an error if:
/// - The name is empty and the caller owns no active profile
/// - The name is not an active profile
/// - The stored profile is owned by another address
fn resolve_owned<S: KvStore + ?Sized>(
    store: &S,
    keys: &KeySpace,
    call: &CallContext,
    name: &str,
) -> Result<Profile, LedgerError> {
    let name = if name.is_empty() {
        state::active_profile_by_address(store, keys, &call.caller)?
            .map(|profile| profile.name)
            .ok_or_else(|| LedgerError::AddressNotRegistered {
                address: to_hex(&call.caller),
            })?
    } else {
        name.to_string()
    };

    if !index::active_names(store, keys)?.contains(&name) {
        return Err(LedgerError::ProfileNotFound { name });
    }

    let stored = state::load_profile(store, keys, &name)?;
    if stored.address != call.caller {
        return Err(LedgerError::Unauthorized { name });
    }
    Ok(stored)
}

/// Register a new profile for the caller
///
/// A name that was deactivated may be reopened by the address that owned
/// it; the name moves back from the inactive list to the active list.
///
/// # Arguments
///
/// * `store` - The key/value store to read and write
/// * `keys` - Store key namespace
/// * `call` - Caller address and block time
/// * `tx` - Decoded profile payload
///
/// # Errors
///
/// Returns an error if:
/// - Validation fails (see [`validate`])
/// - The name is already active
/// - The caller already owns an active profile
/// - The name was deactivated but belongs to another address
pub fn open<S: KvStore + ?Sized>(
    store: &mut S,
    keys: &KeySpace,
    call: &CallContext,
    tx: &TxProfile,
) -> Result<(), LedgerError> {
    let profile = from_tx(call, tx.name.clone(), tx);
    validate(&profile)?;

    let mut active = index::active_names(store, keys)?;
    if active.contains(&profile.name) {
        return Err(LedgerError::ProfileExists { name: profile.name });
    }
    if let Some(owned) = state::active_profile_by_address(store, keys, &call.caller)? {
        return Err(LedgerError::AddressInUse {
            address: to_hex(&call.caller),
            name: owned.name,
        });
    }

    let mut inactive = index::inactive_names(store, keys)?;
    let reopened = inactive.contains(&profile.name);
    if let Some(previous) = state::find_profile(store, keys, &profile.name)? {
        if previous.address != call.caller {
            return Err(LedgerError::Unauthorized { name: profile.name });
        }
    }

    state::save_profile(store, keys, &profile)?;
    index::append_unique(&mut active, profile.name.clone());
    index::save(store, &keys.active_profiles(), &active)?;
    if reopened {
        index::remove_all(&mut inactive, &profile.name);
        index::save(store, &keys.inactive_profiles(), &inactive)?;
    }

    debug!(name = %profile.name, reopened, "profile opened");
    Ok(())
}

/// Overwrite an active profile owned by the caller
///
/// List membership is left untouched.
///
/// # Errors
///
/// Returns an error if:
/// - The target cannot be resolved (see `resolve_owned`)
/// - Validation of the new details fails
pub fn edit<S: KvStore + ?Sized>(
    store: &mut S,
    keys: &KeySpace,
    call: &CallContext,
    tx: &TxProfile,
) -> Result<(), LedgerError> {
    let stored = resolve_owned(store, keys, call, &tx.name)?;
    let profile = from_tx(call, stored.name, tx);
    validate(&profile)?;

    state::save_profile(store, keys, &profile)?;

    debug!(name = %profile.name, "profile edited");
    Ok(())
}

/// Deactivate an active profile owned by the caller
///
/// Only the name (or the caller's address) is read from the payload; the
/// stored record is what gets validated and rewritten.
///
/// # Errors
///
/// Returns an error if:
/// - The target cannot be resolved (see `resolve_owned`)
/// - The stored record fails validation
pub fn deactivate<S: KvStore + ?Sized>(
    store: &mut S,
    keys: &KeySpace,
    call: &CallContext,
    tx: &TxProfile,
) -> Result<(), LedgerError> {
    let mut profile = resolve_owned(store, keys, call, &tx.name)?;
    validate(&profile)?;

    let mut active = index::active_names(store, keys)?;
    let mut inactive = index::inactive_names(store, keys)?;

    profile.active = false;
    state::save_profile(store, keys, &profile)?;
    index::remove_all(&mut active, &profile.name);
    index::append_unique(&mut inactive, profile.name.clone());
    index::save(store, &keys.active_profiles(), &active)?;
    index::save(store, &keys.inactive_profiles(), &inactive)?;

    debug!(name = %profile.name, "profile deactivated");
    Ok(())
}
