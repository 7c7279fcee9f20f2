//! Store key space
//!
//! Pure functions from (entity kind, identifier) to store key, namespaced
//! by an application name so the ledger can share a store with other users.
//!
//! | entity            | key                          |
//! |-------------------|------------------------------|
//! | profile           | `<app>,Profile=<name>`       |
//! | invoice           | `<app>,ID=<hex id>`          |
//! | payment           | `<app>,Payment=<tx id>`      |
//! | active profiles   | `<app>,Profiles`             |
//! | inactive profiles | `<app>,ProfilesInactive`     |
//! | invoice ids       | `<app>,Invoices`             |
//! | payment ids       | `<app>,Payments`             |
//!
//! Entity keys carry `=` after their kind marker and list keys do not, so
//! no identifier can produce another kind's key.

use std::fmt::Write;

/// Application name used when none is configured
pub const APP_NAME: &str = "invoicer";

/// Lower-case hex rendering of raw bytes
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // Writing into a String cannot fail
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Namespaced key generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    app: String,
}

impl KeySpace {
    pub fn new(app: impl Into<String>) -> Self {
        KeySpace { app: app.into() }
    }

    /// The namespace prefix
    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn profile(&self, name: &str) -> Vec<u8> {
        format!("{},Profile={}", self.app, name).into_bytes()
    }

    pub fn invoice(&self, id: &[u8]) -> Vec<u8> {
        format!("{},ID={}", self.app, to_hex(id)).into_bytes()
    }

    pub fn payment(&self, transaction_id: &str) -> Vec<u8> {
        format!("{},Payment={}", self.app, transaction_id).into_bytes()
    }

    pub fn active_profiles(&self) -> Vec<u8> {
        format!("{},Profiles", self.app).into_bytes()
    }

    pub fn inactive_profiles(&self) -> Vec<u8> {
        format!("{},ProfilesInactive", self.app).into_bytes()
    }

    pub fn invoice_list(&self) -> Vec<u8> {
        format!("{},Invoices", self.app).into_bytes()
    }

    pub fn payment_list(&self) -> Vec<u8> {
        format!("{},Payments", self.app).into_bytes()
    }
}

impl Default for KeySpace {
    fn default() -> Self {
        KeySpace::new(APP_NAME)
    }
}
