//! Binary codec for transactions and stored records
//!
//! Every record is borsh-encoded. Transactions carry one extra leading byte,
//! the [`TxType`] tag, in front of their payload.
//!
//! Decoding distinguishes two failure outcomes:
//! - zero-length input is [`LedgerError::StateNotFound`], the canonical
//!   "nothing stored here" signal
//! - anything else that fails to decode is [`LedgerError::Decoding`]

use crate::types::{Contract, Expense, Invoice, InvoiceKind, LedgerError, Payment, Profile, TxType};
use borsh::{BorshDeserialize, BorshSerialize};

/// Encode a record
pub fn encode<T: BorshSerialize>(value: &T) -> Result<Vec<u8>, LedgerError> {
    Ok(borsh::to_vec(value)?)
}

/// Encode a transaction: the type tag followed by the encoded payload
///
/// # Examples
///
/// ```
/// use invoicer_engine::core::codec::{decode_tx, encode_tx};
/// use invoicer_engine::types::{TxProfile, TxType};
///
/// let payload = TxProfile { name: "alice".into(), accepted_cur: "BTC".into(), ..Default::default() };
/// let tx = encode_tx(TxType::ProfileOpen, &payload).unwrap();
/// assert_eq!(tx[0], 0);
///
/// let (tx_type, rest) = decode_tx(&tx).unwrap();
/// assert_eq!(tx_type, TxType::ProfileOpen);
/// assert_eq!(rest, &tx[1..]);
/// ```
pub fn encode_tx<T: BorshSerialize>(tx_type: TxType, payload: &T) -> Result<Vec<u8>, LedgerError> {
    let mut bytes = vec![tx_type.tag()];
    payload.serialize(&mut bytes)?;
    Ok(bytes)
}

/// Split a transaction into its type and its payload bytes
///
/// # Errors
///
/// * [`LedgerError::EmptyTransaction`] for zero-length input
/// * [`LedgerError::UnknownTxType`] if the leading byte is not a known tag
pub fn decode_tx(tx: &[u8]) -> Result<(TxType, &[u8]), LedgerError> {
    let (&tag, payload) = tx.split_first().ok_or(LedgerError::EmptyTransaction)?;
    Ok((TxType::try_from(tag)?, payload))
}

/// Decode a transaction payload
///
/// Unlike stored records, an empty payload is a decode error rather than
/// "not found": a transaction always carries its payload.
pub fn decode_payload<T: BorshDeserialize>(payload: &[u8], what: &str) -> Result<T, LedgerError> {
    borsh::from_slice(payload).map_err(|e| LedgerError::decoding(what, e))
}

/// Decode a stored record
///
/// # Errors
///
/// * [`LedgerError::StateNotFound`] if `bytes` is empty
/// * [`LedgerError::Decoding`] if the bytes are not a complete `T`
pub fn decode<T: BorshDeserialize>(bytes: &[u8], what: &str) -> Result<T, LedgerError> {
    if bytes.is_empty() {
        return Err(LedgerError::state_not_found(what));
    }
    borsh::from_slice(bytes).map_err(|e| LedgerError::decoding(what, e))
}

pub fn decode_profile(bytes: &[u8]) -> Result<Profile, LedgerError> {
    decode(bytes, "profile")
}

pub fn decode_payment(bytes: &[u8]) -> Result<Payment, LedgerError> {
    decode(bytes, "payment")
}

/// Decode a stored invoice of either variant
///
/// The leading byte of the stored id must name the same variant as the
/// record's discriminant.
pub fn decode_invoice(bytes: &[u8]) -> Result<Invoice, LedgerError> {
    let invoice: Invoice = decode(bytes, "invoice")?;
    let id_kind = invoice.id().first().copied().and_then(InvoiceKind::from_tag);
    if id_kind != Some(invoice.kind()) {
        return Err(LedgerError::decoding(
            "invoice",
            format!("id tag does not match {} record", invoice.kind()),
        ));
    }
    Ok(invoice)
}

/// Decode a stored invoice that must be a contract
pub fn decode_contract(bytes: &[u8]) -> Result<Contract, LedgerError> {
    match decode_invoice(bytes)? {
        Invoice::Contract(contract) => Ok(contract),
        Invoice::Expense(_) => Err(LedgerError::decoding("contract", "record is an expense")),
    }
}

/// Decode a stored invoice that must be an expense
pub fn decode_expense(bytes: &[u8]) -> Result<Expense, LedgerError> {
    match decode_invoice(bytes)? {
        Invoice::Expense(expense) => Ok(expense),
        Invoice::Contract(_) => Err(LedgerError::decoding("expense", "record is a contract")),
    }
}

/// Decode a list of names; an absent list is empty
pub fn decode_string_list(bytes: &[u8]) -> Result<Vec<String>, LedgerError> {
    decode_list(bytes, "name list")
}

/// Decode a list of byte ids; an absent list is empty
pub fn decode_bytes_list(bytes: &[u8]) -> Result<Vec<Vec<u8>>, LedgerError> {
    decode_list(bytes, "id list")
}

fn decode_list<T: BorshDeserialize>(bytes: &[u8], what: &str) -> Result<Vec<T>, LedgerError> {
    match decode(bytes, what) {
        Err(e) if e.is_not_found() => Ok(Vec::new()),
        other => other,
    }
}
