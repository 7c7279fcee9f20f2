//! Invoicer Engine Library
//! # Overview
//!
//! This library provides the deterministic state-transition core of an
//! invoicing ledger, plus a CSV replay host around it. Every replica that
//! applies the same transactions in the same order ends with byte-identical
//! state.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Profile, Invoice, Payment, AmtCurTime, etc.)
//! - [`core`] - Business logic components:
//!   - [`core::dispatcher`] - Tag-based routing of raw transactions
//!   - [`core::profile`], [`core::invoice`], [`core::payment`] - Transaction handlers
//!   - [`core::codec`] - Binary encoding of transactions and stored records
//!   - [`core::query`] - Read-side lookups and filters
//! - [`io`] - CSV replay input and report output
//! - [`replay`] - Orchestration of a replay run
//! - [`cli`] - CLI arguments parsing
//!
//! # Transaction Types
//!
//! The engine supports eight transaction types, identified by a leading tag byte:
//!
//! - **ProfileOpen / ProfileEdit / ProfileDeactivate**: Manage named parties
//! - **ContractOpen / ContractEdit**: Bill another party for work
//! - **ExpenseOpen / ExpenseEdit**: Bill another party for a receipted expense
//! - **Payment**: Settle open invoices in order, oldest allocation first
//!
//! # Invoice State
//!
//! Each invoice maintains:
//! - `payable`: The amount owed, in the accepted currency
//! - `paid`: The amount settled so far, absent until the first payment
//! - `open`: Whether any amount is still unpaid

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod replay;
pub mod types;

pub use core::{Invoicer, KeySpace, KvStore, MemStore, Query};
pub use types::{
    AmtCurTime, CallContext, Invoice, InvoiceKind, LedgerError, Payment, Profile, Timestamp,
    TxType,
};
