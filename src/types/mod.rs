//! Types module
//!
//! Contains the data model persisted by the ledger and the transaction
//! payloads that change it:
//! - `currency`: currency-tagged exact decimal amounts
//! - `time`: timestamps and date ranges
//! - `profile`: registered parties
//! - `invoice`: contract and expense invoices and their shared context
//! - `payment`: payment records
//! - `transaction`: transaction tags, payloads and call context
//! - `error`: error types for the engine

pub mod currency;
pub mod error;
pub mod invoice;
pub mod payment;
pub mod profile;
pub mod time;
pub mod transaction;

pub use currency::{AmtCurTime, CurrencyTime};
pub use error::{ErrorKind, LedgerError};
pub use invoice::{Context, Contract, Expense, Invoice, InvoiceKind};
pub use payment::Payment;
pub use profile::Profile;
pub use time::{DateRange, Timestamp};
pub use transaction::{CallContext, TxInvoice, TxPayment, TxProfile, TxType};
