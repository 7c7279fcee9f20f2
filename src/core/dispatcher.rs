//! Transaction dispatcher
//!
//! This module provides the `Invoicer`, the single entry point the host
//! calls once per decided transaction. It reads the leading type tag,
//! decodes the payload into the matching shape and routes it to the profile,
//! invoice or payment handler.
//!
//! A rejected transaction is reported back to the host as the handler's
//! error. It never panics and never affects later transactions.

use crate::core::codec;
use crate::core::invoice;
use crate::core::keys::KeySpace;
use crate::core::payment;
use crate::core::profile;
use crate::core::traits::KvStore;
use crate::types::{CallContext, LedgerError, TxInvoice, TxPayment, TxProfile, TxType};
use tracing::{debug, warn};

/// State-transition function of the ledger
///
/// Holds only configuration; all state lives in the store passed to
/// [`Invoicer::run_tx`].
#[derive(Debug, Clone, Default)]
pub struct Invoicer {
    keys: KeySpace,
}

impl Invoicer {
    /// Create a dispatcher writing under the given key namespace
    pub fn new(keys: KeySpace) -> Self {
        Invoicer { keys }
    }

    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    /// Apply one transaction to the store
    ///
    /// # Arguments
    ///
    /// * `store` - The key/value store to read and write
    /// * `call` - Caller address and block time supplied by the host
    /// * `tx` - Raw transaction bytes, `[tag][payload]`
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the transaction was applied
    /// * `Err(LedgerError)` if it was rejected; nothing was written
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The transaction is empty or has an unknown tag
    /// - The payload does not decode into the tag's shape
    /// - The handler rejects the transaction
    pub fn run_tx<S: KvStore + ?Sized>(
        &self,
        store: &mut S,
        call: &CallContext,
        tx: &[u8],
    ) -> Result<(), LedgerError> {
        let result = self.dispatch(store, call, tx);
        if let Err(e) = &result {
            warn!(code = e.code(), kind = ?e.kind(), error = %e, "transaction rejected");
        }
        result
    }

    fn dispatch<S: KvStore + ?Sized>(
        &self,
        store: &mut S,
        call: &CallContext,
        tx: &[u8],
    ) -> Result<(), LedgerError> {
        let (tx_type, payload) = codec::decode_tx(tx)?;
        debug!(tag = tx_type.tag(), tx_type = ?tx_type, bytes = tx.len(), "dispatching transaction");

        match tx_type {
            TxType::ProfileOpen => {
                let tx: TxProfile = codec::decode_payload(payload, "profile tx")?;
                profile::open(store, &self.keys, call, &tx)
            }
            TxType::ProfileEdit => {
                let tx: TxProfile = codec::decode_payload(payload, "profile tx")?;
                profile::edit(store, &self.keys, call, &tx)
            }
            TxType::ProfileDeactivate => {
                let tx: TxProfile = codec::decode_payload(payload, "profile tx")?;
                profile::deactivate(store, &self.keys, call, &tx)
            }
            TxType::ContractOpen | TxType::ContractEdit | TxType::ExpenseOpen | TxType::ExpenseEdit => {
                let tx: TxInvoice = codec::decode_payload(payload, "invoice tx")?;
                let Some(kind) = tx_type.invoice_kind() else {
                    return Err(LedgerError::UnknownTxType { tag: tx_type.tag() });
                };
                invoice::apply(store, &self.keys, call, kind, tx_type.is_edit(), &tx).map(|_| ())
            }
            TxType::Payment => {
                let tx: TxPayment = codec::decode_payload(payload, "payment tx")?;
                payment::apply(store, &self.keys, call, &tx)
            }
        }
    }
}
