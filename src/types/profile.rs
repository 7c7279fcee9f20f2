//! Profile types
//!
//! A profile is a named party that sends and receives invoices and payments.
//! Profiles are never physically deleted; deactivation flips `active`.

use borsh::{BorshDeserialize, BorshSerialize};

/// Registered party
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Profile {
    /// Address of the account that owns this profile
    pub address: Vec<u8>,

    /// Unique name, the profile's primary key
    pub name: String,

    /// Currency this party accepts payment in
    pub accepted_cur: String,

    /// Default deposit information printed on issued invoices
    pub deposit_info: String,

    /// Default number of days until an issued invoice is due
    pub due_duration_days: i32,

    /// Whether the profile may take part in new invoices and payments
    pub active: bool,
}

impl Profile {
    /// Create a new active profile
    pub fn new(
        address: Vec<u8>,
        name: impl Into<String>,
        accepted_cur: impl Into<String>,
        deposit_info: impl Into<String>,
        due_duration_days: i32,
    ) -> Self {
        Profile {
            address,
            name: name.into(),
            accepted_cur: accepted_cur.into(),
            deposit_info: deposit_info.into(),
            due_duration_days,
            active: true,
        }
    }
}
