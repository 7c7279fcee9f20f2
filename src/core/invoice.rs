//! Invoice state machine
//!
//! One entry point, [`apply`], opens or edits either invoice variant. The
//! handler builds the complete new record, runs every check, and only then
//! writes the record and the invoice-id list.
//!
//! Defaults are resolved against the sender's profile and the block time:
//! - accepted currency: the sender's accepted currency
//! - due date: block time plus the sender's due duration
//! - deposit info: the sender's deposit info
//! - invoiced date: block time
//!
//! The payable amount is never converted here. It arrives pre-resolved in
//! the transaction, or is taken as-is when no conversion is needed.

use crate::core::index;
use crate::core::keys::{to_hex, KeySpace};
use crate::core::state;
use crate::core::traits::KvStore;
use crate::types::{
    AmtCurTime, CallContext, Context, Contract, Expense, Invoice, InvoiceKind, LedgerError,
    Profile, Timestamp, TxInvoice,
};
use tracing::debug;

/// Open or edit a contract or expense invoice
///
/// # Arguments
///
/// * `store` - The key/value store to read and write
/// * `keys` - Store key namespace
/// * `call` - Caller address and block time
/// * `kind` - Invoice variant named by the transaction type
/// * `is_edit` - Whether the transaction edits `tx.edit_id`
/// * `tx` - Decoded invoice payload
///
/// # Returns
///
/// The id of the written invoice
///
/// # Errors
///
/// Returns an error if:
/// - The caller has no active profile
/// - The receiver is empty, unregistered or inactive
/// - An amount fails to parse or the payable needs a conversion
/// - The due date is before the block time
/// - For an edit: the target is missing, closed, of the other variant,
///   issued by someone else, or already paid beyond the new payable
/// - For a create: an identical invoice already exists
pub fn apply<S: KvStore + ?Sized>(
    store: &mut S,
    keys: &KeySpace,
    call: &CallContext,
    kind: InvoiceKind,
    is_edit: bool,
    tx: &TxInvoice,
) -> Result<Vec<u8>, LedgerError> {
    let sender = state::sender_profile(store, keys, &call.caller)?;

    let mut ids = index::invoice_ids(store, keys)?;
    let prior = if is_edit {
        Some(edit_target(store, keys, &ids, kind, &sender, &tx.edit_id)?)
    } else {
        None
    };

    check_receiver(store, keys, &tx.to)?;
    let ctx = build_context(&sender, call.block_time, tx)?;
    let mut invoice = build_invoice(kind, ctx, tx)?;

    match &prior {
        Some(prior) => {
            carry_over(prior, &mut invoice)?;
            index::remove_all(&mut ids, &tx.edit_id);
        }
        None => {
            invoice.assign_id()?;
            if !store.get(&keys.invoice(invoice.id())).is_empty() {
                return Err(LedgerError::DuplicateInvoice {
                    id: to_hex(invoice.id()),
                });
            }
        }
    }

    state::save_invoice(store, keys, &invoice)?;
    index::append_unique(&mut ids, invoice.id().to_vec());
    index::save(store, &keys.invoice_list(), &ids)?;

    debug!(
        kind = %invoice.kind(),
        id = %to_hex(invoice.id()),
        sender = %invoice.ctx().sender,
        receiver = %invoice.ctx().receiver,
        payable = %invoice.ctx().payable,
        edit = is_edit,
        "invoice written"
    );
    Ok(invoice.id().to_vec())
}

/// The receiver must be a registered, active profile
fn check_receiver<S: KvStore + ?Sized>(
    store: &S,
    keys: &KeySpace,
    name: &str,
) -> Result<(), LedgerError> {
    if name.is_empty() {
        return Err(LedgerError::missing_field("invoice", "receiver"));
    }
    match state::find_profile(store, keys, name)? {
        None => Err(LedgerError::NoReceiver {
            name: name.to_string(),
        }),
        Some(profile) if !profile.active => Err(LedgerError::profile_inactive(name)),
        Some(_) => Ok(()),
    }
}

/// Build the shared header from the payload and the sender's defaults
fn build_context(sender: &Profile, now: Timestamp, tx: &TxInvoice) -> Result<Context, LedgerError> {
    let accepted_cur = if tx.cur.is_empty() {
        sender.accepted_cur.clone()
    } else {
        tx.cur.clone()
    };
    if accepted_cur.is_empty() {
        return Err(LedgerError::missing_field("invoice", "accepted currency"));
    }

    let invoiced = AmtCurTime::parse(&tx.amount, tx.date.unwrap_or(now))?;
    require_positive(&invoiced, &tx.amount)?;
    let payable = resolve_payable(&invoiced, &accepted_cur, &tx.payable)?;
    require_positive(&payable, &tx.payable)?;

    let due = match tx.due_date {
        Some(due) => due,
        None => {
            let days = u32::try_from(sender.due_duration_days).map_err(|_| {
                LedgerError::NegativeDueDuration {
                    days: sender.due_duration_days,
                }
            })?;
            now.checked_add_days(days).ok_or_else(|| {
                LedgerError::invalid_date(&format!("{now} + {days} days"), "out of range")
            })?
        }
    };
    if due < now {
        return Err(LedgerError::OverdueInvoice {
            due: due.to_string(),
            now: now.to_string(),
        });
    }

    let deposit_info = if tx.deposit_info.is_empty() {
        sender.deposit_info.clone()
    } else {
        tx.deposit_info.clone()
    };

    Ok(Context::new(
        sender.name.clone(),
        tx.to.clone(),
        deposit_info,
        tx.notes.clone(),
        accepted_cur,
        due,
        invoiced,
        payable,
    ))
}

/// An invoice with nothing to pay would be open while fully paid
fn require_positive(amount: &AmtCurTime, input: &str) -> Result<(), LedgerError> {
    if amount.is_zero() || amount.amount.is_sign_negative() {
        return Err(LedgerError::invalid_amount(input, "invoice amounts must be positive"));
    }
    Ok(())
}

/// The invoiced amount expressed in the accepted currency
///
/// An empty `payable` is only valid when the invoiced amount is already in
/// the accepted currency.
fn resolve_payable(
    invoiced: &AmtCurTime,
    accepted_cur: &str,
    payable: &str,
) -> Result<AmtCurTime, LedgerError> {
    if payable.trim().is_empty() {
        if invoiced.currency() == accepted_cur {
            return Ok(invoiced.clone());
        }
        return Err(LedgerError::conversion_required(invoiced.currency(), accepted_cur));
    }

    let payable = AmtCurTime::parse(payable, invoiced.date())?;
    if payable.currency() != accepted_cur {
        return Err(LedgerError::currency_mismatch(accepted_cur, payable.currency()));
    }
    Ok(payable)
}

fn build_invoice(kind: InvoiceKind, ctx: Context, tx: &TxInvoice) -> Result<Invoice, LedgerError> {
    let invoice = match kind {
        InvoiceKind::Contract => Contract::new(Vec::new(), ctx).into(),
        InvoiceKind::Expense => {
            let taxes = if tx.taxes.trim().is_empty() {
                AmtCurTime::zero(ctx.invoiced.currency(), ctx.invoiced.date())
            } else {
                AmtCurTime::parse(&tx.taxes, ctx.invoiced.date())?
            };
            Expense::new(
                Vec::new(),
                ctx,
                tx.receipt.clone(),
                tx.receipt_name.clone(),
                taxes,
            )
            .into()
        }
    };
    Ok(invoice)
}

/// Load the invoice an edit targets
///
/// Runs before any field of the edit is looked at: a closed invoice stays
/// closed whatever the edit carries.
fn edit_target<S: KvStore + ?Sized>(
    store: &S,
    keys: &KeySpace,
    ids: &[Vec<u8>],
    kind: InvoiceKind,
    sender: &Profile,
    edit_id: &[u8],
) -> Result<Invoice, LedgerError> {
    if edit_id.is_empty() {
        return Err(LedgerError::missing_field("invoice edit", "id"));
    }
    let id_hex = to_hex(edit_id);
    if !ids.iter().any(|id| id == edit_id) {
        return Err(LedgerError::invoice_missing(&id_hex));
    }

    let prior = state::require_invoice(store, keys, edit_id)?;
    if !prior.ctx().open {
        return Err(LedgerError::InvoiceClosed { id: id_hex });
    }
    if prior.kind() != kind {
        return Err(LedgerError::InvoiceKindMismatch {
            id: id_hex,
            expected: kind,
            found: prior.kind(),
        });
    }
    if prior.ctx().sender != sender.name {
        return Err(LedgerError::Unauthorized {
            name: prior.ctx().sender.clone(),
        });
    }
    Ok(prior)
}

/// Carry the stored id and whatever was already paid onto the edited invoice
fn carry_over(prior: &Invoice, invoice: &mut Invoice) -> Result<(), LedgerError> {
    if let Some(paid) = &prior.ctx().paid {
        let ctx = invoice.ctx_mut();
        if ctx.payable.lt(paid)? {
            return Err(LedgerError::EditBelowPaid {
                id: to_hex(prior.id()),
                paid: paid.to_string(),
                payable: ctx.payable.to_string(),
            });
        }
        ctx.open = !ctx.payable.equals(paid)?;
        ctx.paid = Some(paid.clone());
    }

    invoice.set_id(prior.id().to_vec());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::profile;
    use crate::core::store::MemStore;
    use crate::types::TxProfile;
    use rstest::rstest;

    fn now() -> Timestamp {
        Timestamp::from_ymd(2024, 1, 10).unwrap()
    }

    fn call(caller: &[u8]) -> CallContext {
        CallContext::new(caller, now())
    }

    /// Store with alice (USD, 30 days) and bob (USD) registered
    fn setup() -> (MemStore, KeySpace) {
        let keys = KeySpace::default();
        let mut store = MemStore::new();
        for (addr, name) in [(b"a", "alice"), (b"b", "bob")] {
            let tx = TxProfile {
                name: name.to_string(),
                accepted_cur: "USD".to_string(),
                deposit_info: format!("{name}-iban"),
                due_duration_days: 30,
            };
            profile::open(&mut store, &keys, &call(addr), &tx).unwrap();
        }
        (store, keys)
    }

    fn tx(amount: &str) -> TxInvoice {
        TxInvoice {
            to: "bob".to_string(),
            amount: amount.to_string(),
            notes: "january".to_string(),
            ..Default::default()
        }
    }

    fn open_contract(store: &mut MemStore, keys: &KeySpace, payload: &TxInvoice) -> Result<Vec<u8>, LedgerError> {
        apply(store, keys, &call(b"a"), InvoiceKind::Contract, false, payload)
    }

    #[test]
    fn test_open_applies_defaults() {
        let (mut store, keys) = setup();
        let id = open_contract(&mut store, &keys, &tx("100USD")).unwrap();

        let invoice = state::load_invoice(&store, &keys, &id).unwrap();
        let ctx = invoice.ctx();
        assert_eq!(invoice.kind(), InvoiceKind::Contract);
        assert_eq!(ctx.sender, "alice");
        assert_eq!(ctx.receiver, "bob");
        assert_eq!(ctx.accepted_cur, "USD");
        assert_eq!(ctx.deposit_info, "alice-iban");
        assert_eq!(ctx.due, Timestamp::from_ymd(2024, 2, 9).unwrap());
        assert_eq!(ctx.invoiced.date(), now());
        assert_eq!(ctx.payable, ctx.invoiced);
        assert!(ctx.open);
        assert_eq!(ctx.paid, None);
        assert_eq!(index::invoice_ids(&store, &keys).unwrap(), vec![id]);
    }

    #[test]
    fn test_open_identical_invoice_is_duplicate() {
        let (mut store, keys) = setup();
        open_contract(&mut store, &keys, &tx("100USD")).unwrap();
        let snapshot = store.clone();

        let result = open_contract(&mut store, &keys, &tx("100USD"));
        assert!(matches!(result, Err(LedgerError::DuplicateInvoice { .. })));
        assert_eq!(store, snapshot);
    }

    #[test]
    fn test_same_context_other_variant_is_distinct() {
        let (mut store, keys) = setup();
        let contract = open_contract(&mut store, &keys, &tx("100USD")).unwrap();
        let expense = apply(&mut store, &keys, &call(b"a"), InvoiceKind::Expense, false, &tx("100USD")).unwrap();

        assert_ne!(contract, expense);
        assert_eq!(contract[1..], expense[1..]);
        let stored = state::load_invoice(&store, &keys, &expense).unwrap();
        match stored {
            Invoice::Expense(expense) => assert!(expense.expense_taxes.is_zero()),
            Invoice::Contract(_) => panic!("expected an expense"),
        }
    }

    #[test]
    fn test_unregistered_parties() {
        let (mut store, keys) = setup();

        let result = apply(&mut store, &keys, &call(b"zz"), InvoiceKind::Contract, false, &tx("1USD"));
        assert_eq!(result.unwrap_err(), LedgerError::NoSender { name: "7a7a".to_string() });

        let to_nobody = TxInvoice { to: "nobody".to_string(), ..tx("1USD") };
        assert_eq!(
            open_contract(&mut store, &keys, &to_nobody).unwrap_err(),
            LedgerError::NoReceiver { name: "nobody".to_string() }
        );

        let to_empty = TxInvoice { to: String::new(), ..tx("1USD") };
        assert_eq!(
            open_contract(&mut store, &keys, &to_empty).unwrap_err(),
            LedgerError::missing_field("invoice", "receiver")
        );
    }

    #[test]
    fn test_inactive_receiver_rejected() {
        let (mut store, keys) = setup();
        profile::deactivate(&mut store, &keys, &call(b"b"), &TxProfile::default()).unwrap();

        assert_eq!(
            open_contract(&mut store, &keys, &tx("1USD")).unwrap_err(),
            LedgerError::profile_inactive("bob")
        );
    }

    #[test]
    fn test_overdue_rejected() {
        let (mut store, keys) = setup();
        let payload = TxInvoice {
            due_date: Some(Timestamp::from_ymd(2024, 1, 9).unwrap()),
            ..tx("1USD")
        };
        assert!(matches!(
            open_contract(&mut store, &keys, &payload),
            Err(LedgerError::OverdueInvoice { .. })
        ));
    }

    #[test]
    fn test_payable_resolution() {
        let (mut store, keys) = setup();

        let needs_rate = tx("1BTC");
        assert_eq!(
            open_contract(&mut store, &keys, &needs_rate).unwrap_err(),
            LedgerError::conversion_required("BTC", "USD")
        );

        let wrong_currency = TxInvoice { payable: "40000EUR".to_string(), ..tx("1BTC") };
        assert_eq!(
            open_contract(&mut store, &keys, &wrong_currency).unwrap_err(),
            LedgerError::currency_mismatch("USD", "EUR")
        );

        let converted = TxInvoice { payable: "40000USD".to_string(), ..tx("1BTC") };
        let id = open_contract(&mut store, &keys, &converted).unwrap();
        let invoice = state::load_invoice(&store, &keys, &id).unwrap();
        assert_eq!(invoice.ctx().invoiced.to_string(), "1BTC");
        assert_eq!(invoice.ctx().payable.to_string(), "40000USD");
    }

    #[test]
    fn test_edit_keeps_id_and_moves_to_end() {
        let (mut store, keys) = setup();
        let first = open_contract(&mut store, &keys, &tx("100USD")).unwrap();
        let second = open_contract(&mut store, &keys, &tx("200USD")).unwrap();

        let edit = TxInvoice {
            edit_id: first.clone(),
            notes: "corrected".to_string(),
            ..tx("150USD")
        };
        let edited = apply(&mut store, &keys, &call(b"a"), InvoiceKind::Contract, true, &edit).unwrap();

        assert_eq!(edited, first);
        let invoice = state::load_invoice(&store, &keys, &first).unwrap();
        assert_eq!(invoice.ctx().notes, "corrected");
        assert_eq!(invoice.ctx().payable.to_string(), "150USD");
        assert_eq!(index::invoice_ids(&store, &keys).unwrap(), vec![second, first]);
    }

    #[test]
    fn test_edit_failures() {
        let (mut store, keys) = setup();
        let id = open_contract(&mut store, &keys, &tx("100USD")).unwrap();

        let missing = TxInvoice { edit_id: vec![0x01, 0x02], ..tx("1USD") };
        assert_eq!(
            apply(&mut store, &keys, &call(b"a"), InvoiceKind::Contract, true, &missing).unwrap_err(),
            LedgerError::invoice_missing("0102")
        );

        let wrong_kind = TxInvoice { edit_id: id.clone(), ..tx("1USD") };
        assert!(matches!(
            apply(&mut store, &keys, &call(b"a"), InvoiceKind::Expense, true, &wrong_kind),
            Err(LedgerError::InvoiceKindMismatch { .. })
        ));

        assert!(matches!(
            apply(&mut store, &keys, &call(b"b"), InvoiceKind::Contract, true, &wrong_kind),
            Err(LedgerError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_edit_closed_invoice_fails() {
        let (mut store, keys) = setup();
        let id = open_contract(&mut store, &keys, &tx("100USD")).unwrap();

        let mut invoice = state::load_invoice(&store, &keys, &id).unwrap();
        invoice.ctx_mut().pay(AmtCurTime::parse("100USD", now()).unwrap()).unwrap();
        state::save_invoice(&mut store, &keys, &invoice).unwrap();
        let snapshot = store.clone();

        let edit = TxInvoice { edit_id: id.clone(), ..tx("120USD") };
        assert_eq!(
            apply(&mut store, &keys, &call(b"a"), InvoiceKind::Contract, true, &edit).unwrap_err(),
            LedgerError::InvoiceClosed { id: to_hex(&id) }
        );
        assert_eq!(store, snapshot);

        let invalid = TxInvoice { edit_id: id.clone(), to: String::new(), ..tx("lots") };
        assert_eq!(
            apply(&mut store, &keys, &call(b"a"), InvoiceKind::Contract, true, &invalid).unwrap_err(),
            LedgerError::InvoiceClosed { id: to_hex(&id) }
        );

        let other_variant = TxInvoice { edit_id: id.clone(), ..tx("120USD") };
        assert_eq!(
            apply(&mut store, &keys, &call(b"a"), InvoiceKind::Expense, true, &other_variant).unwrap_err(),
            LedgerError::InvoiceClosed { id: to_hex(&id) }
        );
        assert_eq!(store, snapshot);
    }

    #[test]
    fn test_deactivated_sender_is_inactive_not_missing() {
        let (mut store, keys) = setup();
        profile::deactivate(&mut store, &keys, &call(b"a"), &TxProfile::default()).unwrap();

        let result = apply(&mut store, &keys, &call(b"a"), InvoiceKind::Contract, false, &tx("1USD"));
        assert_eq!(result.unwrap_err(), LedgerError::profile_inactive("alice"));
    }

    #[rstest]
    #[case::zero_amount("0USD", "")]
    #[case::zero_payable("10EUR", "0USD")]
    #[case::rounds_to_zero("0.00000000000000000000000000001USD", "")]
    fn test_non_positive_amounts_rejected(#[case] amount: &str, #[case] payable: &str) {
        let (mut store, keys) = setup();
        let payload = TxInvoice { payable: payable.to_string(), ..tx(amount) };

        let result = open_contract(&mut store, &keys, &payload);
        assert!(matches!(result, Err(LedgerError::InvalidAmount { .. })), "{result:?}");
        assert!(index::invoice_ids(&store, &keys).unwrap().is_empty());
    }

    #[test]
    fn test_edit_carries_paid_amount() {
        let (mut store, keys) = setup();
        let id = open_contract(&mut store, &keys, &tx("100USD")).unwrap();

        let mut invoice = state::load_invoice(&store, &keys, &id).unwrap();
        invoice.ctx_mut().pay(AmtCurTime::parse("40USD", now()).unwrap()).unwrap();
        state::save_invoice(&mut store, &keys, &invoice).unwrap();

        let too_low = TxInvoice { edit_id: id.clone(), ..tx("30USD") };
        assert!(matches!(
            apply(&mut store, &keys, &call(b"a"), InvoiceKind::Contract, true, &too_low),
            Err(LedgerError::EditBelowPaid { .. })
        ));

        let settle = TxInvoice { edit_id: id.clone(), ..tx("40USD") };
        apply(&mut store, &keys, &call(b"a"), InvoiceKind::Contract, true, &settle).unwrap();
        let edited = state::load_invoice(&store, &keys, &id).unwrap();
        assert_eq!(edited.ctx().paid.as_ref().map(ToString::to_string), Some("40USD".to_string()));
        assert!(!edited.ctx().open);
    }
}
