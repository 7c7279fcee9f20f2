//! Error types for the invoicer engine
//!
//! This module defines every error a transaction can be rejected with.
//! Each condition gets its own variant so the caller sees exactly which
//! check failed; nothing is collapsed into a generic "bad request".
//!
//! # Error Categories
//!
//! - **Structural**: empty transaction, unknown type tag, undecodable bytes
//! - **Validation**: missing fields, unregistered profiles, currency mismatch,
//!   overdue issuance, closed or missing invoices, duplicates
//! - **Business rule**: overpayment, inactive profile, receiver mismatch
//! - **External**: a payable amount that needs a conversion rate the core
//!   cannot look up
//!
//! Every error is fatal to the single transaction that raised it, never to
//! the process.

use super::invoice::InvoiceKind;
use thiserror::Error;

/// Broad class of a [`LedgerError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Structural,
    Validation,
    BusinessRule,
    External,
}

impl ErrorKind {
    /// Stable numeric result code reported to the host
    pub fn code(self) -> u32 {
        match self {
            ErrorKind::Structural => 1,
            ErrorKind::Validation => 2,
            ErrorKind::BusinessRule => 3,
            ErrorKind::External => 4,
        }
    }
}

/// Main error type for the invoicer engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Transaction carried no bytes at all
    #[error("Error decoding tx: no tx bytes")]
    EmptyTransaction,

    /// Leading type byte does not name a known transaction
    #[error("Error decoding tx: unknown type byte {tag:#04x}")]
    UnknownTxType { tag: u8 },

    /// Bytes could not be decoded into the expected shape
    #[error("Error decoding {what}: {message}")]
    Decoding { what: String, message: String },

    /// Zero-length state: nothing stored under the key
    #[error("{what} not found")]
    StateNotFound { what: String },

    /// A required field was left empty
    #[error("{entity} must have a {field}")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("Profile due duration must be non-negative, got {days}")]
    NegativeDueDuration { days: i32 },

    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("Invalid date '{input}': {reason}")]
    InvalidDate { input: String, reason: String },

    /// Two amounts of different currencies were combined or compared
    #[error("Currency mismatch: expected {expected}, got {found}")]
    CurrencyMismatch { expected: String, found: String },

    /// Decimal arithmetic left the representable range
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow { operation: String },

    #[error("Cannot create an already existing profile '{name}'")]
    ProfileExists { name: String },

    #[error("Cannot modify a non-existent profile '{name}'")]
    ProfileNotFound { name: String },

    /// No active profile is owned by the caller's address
    #[error("No active profile registered for address {address}")]
    AddressNotRegistered { address: String },

    #[error("Address {address} already owns the active profile '{name}'")]
    AddressInUse { address: String, name: String },

    #[error("Caller does not own profile '{name}'")]
    Unauthorized { name: String },

    #[error("Sender's profile '{name}' doesn't exist")]
    NoSender { name: String },

    #[error("Receiver's profile '{name}' doesn't exist")]
    NoReceiver { name: String },

    #[error("Cannot issue overdue invoice: due {due} is before {now}")]
    OverdueInvoice { due: String, now: String },

    #[error("Cannot edit closed invoice {id}")]
    InvoiceClosed { id: String },

    #[error("Invoice {id} missing")]
    InvoiceMissing { id: String },

    #[error("Duplicate invoice {id}, edit the invoice notes to make them unique")]
    DuplicateInvoice { id: String },

    /// An edit was submitted with the other variant's transaction type
    #[error("Invoice {id} is a {found}, not a {expected}")]
    InvoiceKindMismatch {
        id: String,
        expected: InvoiceKind,
        found: InvoiceKind,
    },

    #[error("Invoice {id} already has {paid} paid, cannot lower payable to {payable}")]
    EditBelowPaid {
        id: String,
        paid: String,
        payable: String,
    },

    #[error("Payment doesn't contain any invoices to close")]
    EmptyInvoiceSet,

    #[error("Invoice {id} listed more than once in payment")]
    RepeatedInvoiceId { id: String },

    #[error("Payment with transaction id '{transaction_id}' already exists")]
    DuplicatePayment { transaction_id: String },

    #[error("Profile '{name}' is inactive")]
    ProfileInactive { name: String },

    #[error("Invoice {id} has receiver {invoice_receiver} but the payment is to receiver {payment_receiver}")]
    ReceiverMismatch {
        id: String,
        invoice_receiver: String,
        payment_receiver: String,
    },

    #[error("Payment of {payment} exceeds the {unpaid} left unpaid")]
    OverPayment { payment: String, unpaid: String },

    /// Payable amount must be converted, but no converted amount was supplied
    #[error("Payable amount in {to} must be supplied with the transaction to convert from {from}")]
    ConversionRequired { from: String, to: String },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::Decoding {
            what: "state".to_string(),
            message: error.to_string(),
        }
    }
}

impl LedgerError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::EmptyTransaction
            | LedgerError::UnknownTxType { .. }
            | LedgerError::Decoding { .. } => ErrorKind::Structural,

            LedgerError::ProfileInactive { .. }
            | LedgerError::ReceiverMismatch { .. }
            | LedgerError::OverPayment { .. } => ErrorKind::BusinessRule,

            LedgerError::ConversionRequired { .. } => ErrorKind::External,

            _ => ErrorKind::Validation,
        }
    }

    /// Numeric result code of [`LedgerError::kind`]
    pub fn code(&self) -> u32 {
        self.kind().code()
    }

    /// Create a Decoding error
    pub fn decoding(what: &str, message: impl ToString) -> Self {
        LedgerError::Decoding {
            what: what.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a StateNotFound error
    pub fn state_not_found(what: &str) -> Self {
        LedgerError::StateNotFound {
            what: what.to_string(),
        }
    }

    /// Whether this is the canonical "nothing stored" outcome
    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::StateNotFound { .. })
    }

    /// Create a MissingField error
    pub fn missing_field(entity: &'static str, field: &'static str) -> Self {
        LedgerError::MissingField { entity, field }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(input: &str, reason: &str) -> Self {
        LedgerError::InvalidAmount {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an InvalidDate error
    pub fn invalid_date(input: &str, reason: &str) -> Self {
        LedgerError::InvalidDate {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a CurrencyMismatch error
    pub fn currency_mismatch(expected: &str, found: &str) -> Self {
        LedgerError::CurrencyMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
        }
    }

    /// Create an InvoiceMissing error
    pub fn invoice_missing(id: &str) -> Self {
        LedgerError::InvoiceMissing { id: id.to_string() }
    }

    /// Create a ProfileInactive error
    pub fn profile_inactive(name: &str) -> Self {
        LedgerError::ProfileInactive {
            name: name.to_string(),
        }
    }

    /// Create an OverPayment error
    pub fn over_payment(payment: impl ToString, unpaid: impl ToString) -> Self {
        LedgerError::OverPayment {
            payment: payment.to_string(),
            unpaid: unpaid.to_string(),
        }
    }

    /// Create a ConversionRequired error
    pub fn conversion_required(from: &str, to: &str) -> Self {
        LedgerError::ConversionRequired {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
