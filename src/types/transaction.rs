//! Transaction types for the invoicer engine
//!
//! This module defines the wire tag of every transaction, the payload shapes
//! that follow the tag, and the call context the host passes alongside.
//!
//! # Wire format
//!
//! `[1 tag byte][borsh-encoded payload]`

use super::error::LedgerError;
use super::invoice::InvoiceKind;
use super::time::Timestamp;
use borsh::{BorshDeserialize, BorshSerialize};

/// Transaction variants, identified by the leading byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TxType {
    /// Register a new profile (or reopen a deactivated one)
    ProfileOpen = 0,

    /// Overwrite an active profile's details
    ProfileEdit = 1,

    /// Deactivate an active profile
    ProfileDeactivate = 2,

    ContractOpen = 3,
    ContractEdit = 4,
    ExpenseOpen = 5,
    ExpenseEdit = 6,

    /// Settle one or more invoices
    Payment = 7,
}

impl TxType {
    /// The tag byte written before the payload
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Invoice variant handled by this transaction, if any
    pub fn invoice_kind(self) -> Option<InvoiceKind> {
        match self {
            TxType::ContractOpen | TxType::ContractEdit => Some(InvoiceKind::Contract),
            TxType::ExpenseOpen | TxType::ExpenseEdit => Some(InvoiceKind::Expense),
            _ => None,
        }
    }

    /// Whether the transaction modifies an existing record
    pub fn is_edit(self) -> bool {
        matches!(
            self,
            TxType::ProfileEdit
                | TxType::ProfileDeactivate
                | TxType::ContractEdit
                | TxType::ExpenseEdit
        )
    }
}

impl TryFrom<u8> for TxType {
    type Error = LedgerError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(TxType::ProfileOpen),
            1 => Ok(TxType::ProfileEdit),
            2 => Ok(TxType::ProfileDeactivate),
            3 => Ok(TxType::ContractOpen),
            4 => Ok(TxType::ContractEdit),
            5 => Ok(TxType::ExpenseOpen),
            6 => Ok(TxType::ExpenseEdit),
            7 => Ok(TxType::Payment),
            _ => Err(LedgerError::UnknownTxType { tag }),
        }
    }
}

/// Payload of the profile transactions
///
/// The profile's address is always the caller's address. For edit and
/// deactivate an empty `name` resolves to the caller's active profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct TxProfile {
    pub name: String,
    pub accepted_cur: String,
    pub deposit_info: String,
    pub due_duration_days: i32,
}

/// Payload of the contract and expense transactions
///
/// Empty strings and `None` fall back to the sender profile's defaults or
/// to the block time, as documented per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct TxInvoice {
    /// Id of the invoice being edited; empty when opening
    pub edit_id: Vec<u8>,

    /// Receiver profile name
    pub to: String,

    /// Invoiced amount as `<number><currency>`
    pub amount: String,

    /// Valuation date of the invoiced amount; block time if unset
    pub date: Option<Timestamp>,

    /// Accepted currency override; sender's default if empty
    pub cur: String,

    /// Invoiced amount already converted into the accepted currency
    ///
    /// May only be empty when no conversion is needed.
    pub payable: String,

    pub notes: String,

    /// Due date override; block time plus the sender's due duration if unset
    pub due_date: Option<Timestamp>,

    /// Deposit info override; sender's default if empty
    pub deposit_info: String,

    /// Receipt document (expenses only)
    pub receipt: Vec<u8>,
    pub receipt_name: String,

    /// Declared taxes (expenses only); zero in the invoiced currency if empty
    pub taxes: String,
}

/// Payload of the payment transaction
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct TxPayment {
    pub transaction_id: String,

    /// Invoices to settle, in allocation order; empty selects by date range
    pub invoice_ids: Vec<Vec<u8>>,

    pub receiver: String,

    /// Payment amount as `<number><currency>`
    pub amount: String,

    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
}

/// What the host knows about the call besides the transaction bytes
///
/// Any value the caller attached to the transaction is the host's to
/// restore when the transaction is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    /// Address of the account that signed the transaction
    pub caller: Vec<u8>,

    /// Time of the block the transaction was decided in
    pub block_time: Timestamp,
}

impl CallContext {
    pub fn new(caller: impl Into<Vec<u8>>, block_time: Timestamp) -> Self {
        CallContext {
            caller: caller.into(),
            block_time,
        }
    }
}
