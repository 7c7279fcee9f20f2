//! Payment engine
//!
//! A payment settles one or more invoices addressed to a single receiver.
//! Applying a payment runs in two phases:
//!
//! 1. **Validate**: resolve the sender and receiver, resolve the invoice
//!    set, check every invoice's receiver and sum the unpaid amounts. A
//!    payment larger than the total unpaid is rejected here, before any
//!    invoice is touched.
//! 2. **Allocate**: walk the invoice set in order, letting each invoice
//!    absorb as much of the remaining fund as it can. Each invoice is
//!    written back as soon as it has been paid, then the payment record
//!    and the payment-id list are written.
//!
//! # Allocation order
//!
//! With explicit ids the set is walked in exactly the order the ids were
//! supplied. Without ids the set is every open invoice addressed to the
//! receiver whose invoiced date lies in `[start_date, end_date]`, walked in
//! invoice-list order (oldest insertion first).

use crate::core::index;
use crate::core::keys::{to_hex, KeySpace};
use crate::core::state;
use crate::core::traits::KvStore;
use crate::types::{AmtCurTime, CallContext, DateRange, Invoice, LedgerError, Payment, TxPayment};
use tracing::{debug, trace};

/// Apply a payment transaction
///
/// # Arguments
///
/// * `store` - The key/value store to read and write
/// * `keys` - Store key namespace
/// * `call` - Caller address and block time; the caller is the payer
/// * `tx` - Decoded payment payload
///
/// # Errors
///
/// Returns an error if:
/// - The transaction id is empty or already used
/// - The caller has no active profile
/// - The receiver is empty, unregistered or inactive
/// - The amount fails to parse or is not positive
/// - The invoice set is empty, repeats an id, or refers to a missing invoice
/// - An invoice is addressed to another receiver
/// - The amount exceeds the total unpaid, or its currency differs from the
///   invoices' payable currency
pub fn apply<S: KvStore + ?Sized>(
    store: &mut S,
    keys: &KeySpace,
    call: &CallContext,
    tx: &TxPayment,
) -> Result<(), LedgerError> {
    if tx.transaction_id.is_empty() {
        return Err(LedgerError::missing_field("payment", "transaction id"));
    }
    let mut payment_ids = index::payment_ids(store, keys)?;
    if payment_ids.contains(&tx.transaction_id)
        || !store.get(&keys.payment(&tx.transaction_id)).is_empty()
    {
        return Err(LedgerError::DuplicatePayment {
            transaction_id: tx.transaction_id.clone(),
        });
    }

    let sender = state::sender_profile(store, keys, &call.caller)?;
    check_receiver(store, keys, &tx.receiver)?;

    let amount = AmtCurTime::parse(&tx.amount, call.block_time)?;
    if amount.amount.is_sign_negative() || amount.is_zero() {
        return Err(LedgerError::invalid_amount(&tx.amount, "payment amount must be positive"));
    }

    let range = DateRange::new(tx.start_date, tx.end_date);
    let mut invoices = resolve_invoices(store, keys, tx, &range)?;
    if invoices.is_empty() {
        return Err(LedgerError::EmptyInvoiceSet);
    }

    for invoice in &invoices {
        if invoice.ctx().receiver != tx.receiver {
            return Err(LedgerError::ReceiverMismatch {
                id: to_hex(invoice.id()),
                invoice_receiver: invoice.ctx().receiver.clone(),
                payment_receiver: tx.receiver.clone(),
            });
        }
    }

    let unpaid = total_unpaid(&invoices)?;
    if amount.gt(&unpaid)? {
        return Err(LedgerError::over_payment(&amount, &unpaid));
    }

    // Every check has passed; from here on the store is written
    let mut fund = amount.clone();
    for invoice in &mut invoices {
        let before = fund.clone();
        fund = invoice.ctx_mut().pay(fund)?;
        let applied = before.checked_sub(Some(&fund))?;
        trace!(
            id = %to_hex(invoice.id()),
            applied = %applied,
            remaining = %fund,
            closed = !invoice.ctx().open,
            "payment allocated"
        );
        state::save_invoice(store, keys, invoice)?;
    }

    let payment = Payment {
        transaction_id: tx.transaction_id.clone(),
        invoice_ids: invoices.iter().map(|invoice| invoice.id().to_vec()).collect(),
        sender: sender.name,
        receiver: tx.receiver.clone(),
        payment_cur_time: amount,
        start_date: tx.start_date,
        end_date: tx.end_date,
    };
    state::save_payment(store, keys, &payment)?;
    index::append_unique(&mut payment_ids, payment.transaction_id.clone());
    index::save(store, &keys.payment_list(), &payment_ids)?;

    debug!(
        transaction_id = %payment.transaction_id,
        sender = %payment.sender,
        receiver = %payment.receiver,
        amount = %payment.payment_cur_time,
        invoices = payment.invoice_ids.len(),
        "payment applied"
    );
    Ok(())
}

fn check_receiver<S: KvStore + ?Sized>(
    store: &S,
    keys: &KeySpace,
    name: &str,
) -> Result<(), LedgerError> {
    if name.is_empty() {
        return Err(LedgerError::missing_field("payment", "receiver"));
    }
    match state::find_profile(store, keys, name)? {
        None => Err(LedgerError::NoReceiver {
            name: name.to_string(),
        }),
        Some(profile) if !profile.active => Err(LedgerError::profile_inactive(name)),
        Some(_) => Ok(()),
    }
}

/// Resolve the invoices a payment settles, in allocation order
fn resolve_invoices<S: KvStore + ?Sized>(
    store: &S,
    keys: &KeySpace,
    tx: &TxPayment,
    range: &DateRange,
) -> Result<Vec<Invoice>, LedgerError> {
    if !tx.invoice_ids.is_empty() {
        let mut invoices: Vec<Invoice> = Vec::with_capacity(tx.invoice_ids.len());
        for id in &tx.invoice_ids {
            if invoices.iter().any(|invoice| invoice.id() == id.as_slice()) {
                return Err(LedgerError::RepeatedInvoiceId { id: to_hex(id) });
            }
            invoices.push(state::require_invoice(store, keys, id)?);
        }
        return Ok(invoices);
    }

    let mut invoices = Vec::new();
    for id in index::invoice_ids(store, keys)? {
        let invoice = state::require_invoice(store, keys, &id)?;
        let ctx = invoice.ctx();
        if ctx.open && ctx.receiver == tx.receiver && range.contains(ctx.invoiced.date()) {
            invoices.push(invoice);
        }
    }
    Ok(invoices)
}

/// Sum of `payable - paid` over the set, in the payable currency
fn total_unpaid(invoices: &[Invoice]) -> Result<AmtCurTime, LedgerError> {
    let mut total: Option<AmtCurTime> = None;
    for invoice in invoices {
        let unpaid = invoice.ctx().unpaid()?;
        total = Some(unpaid.checked_add(total.as_ref())?);
    }
    total.ok_or(LedgerError::EmptyInvoiceSet)
}
