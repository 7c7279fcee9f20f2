//! Payment record
//!
//! A payment settles one or more invoices. It is written once per
//! transaction id and never edited.

use super::currency::AmtCurTime;
use super::time::Timestamp;
use borsh::{BorshDeserialize, BorshSerialize};

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Payment {
    /// External transaction id, the payment's primary key
    pub transaction_id: String,

    /// Invoices the payment was applied to, in allocation order
    pub invoice_ids: Vec<Vec<u8>>,

    /// Profile name of the paying party
    pub sender: String,

    /// Profile name of the party being paid
    pub receiver: String,

    pub payment_cur_time: AmtCurTime,

    /// Invoiced-date bounds used to select invoices when no ids were given
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
}
