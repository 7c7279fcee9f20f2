//! Core state-transition module
//!
//! This module contains the deterministic ledger core:
//! - `traits` - Store abstraction supplied by the host
//! - `store` - In-memory store used by the replay host and tests
//! - `keys` - Store key namespace
//! - `codec` - Binary encoding of transactions and records
//! - `index` - Index lists enumerating each entity kind
//! - `state` - Typed load/save of stored entities
//! - `profile`, `invoice`, `payment` - Transaction handlers
//! - `dispatcher` - Tag-based routing to the handlers
//! - `query` - Read-side lookups and filters

pub mod codec;
pub mod dispatcher;
pub mod index;
pub mod invoice;
pub mod keys;
pub mod payment;
pub mod profile;
pub mod query;
pub mod state;
pub mod store;
pub mod traits;

pub use dispatcher::Invoicer;
pub use keys::KeySpace;
pub use query::{InvoiceFilter, PaymentFilter, Query};
pub use store::MemStore;
pub use traits::KvStore;
