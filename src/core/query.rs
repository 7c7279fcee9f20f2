//! Read-side queries
//!
//! [`Query`] never writes. Point lookups return [`LedgerError::StateNotFound`]
//! when nothing is stored and [`LedgerError::Decoding`] when the stored bytes
//! are corrupt, so callers can tell the two apart. Enumerations walk the
//! index lists in insertion order and apply a filter.

use crate::core::index;
use crate::core::keys::KeySpace;
use crate::core::state;
use crate::core::traits::KvStore;
use crate::types::{AmtCurTime, DateRange, Invoice, InvoiceKind, LedgerError, Payment, Profile};
use std::collections::BTreeMap;

/// Selection of invoices for [`Query::invoices`]
///
/// Empty sender or receiver sets match every party.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceFilter {
    pub contracts: bool,
    pub expenses: bool,
    pub open: bool,
    pub closed: bool,

    /// Range the invoiced date must fall in
    pub dates: DateRange,
    pub senders: Vec<String>,
    pub receivers: Vec<String>,

    /// Maximum number of results; `None` for no limit
    pub limit: Option<usize>,
}

impl Default for InvoiceFilter {
    fn default() -> Self {
        InvoiceFilter {
            contracts: true,
            expenses: true,
            open: true,
            closed: true,
            dates: DateRange::default(),
            senders: Vec::new(),
            receivers: Vec::new(),
            limit: None,
        }
    }
}

impl InvoiceFilter {
    /// Narrow by comma-separated modifiers: `contract`, `expense`, `open`, `closed`
    ///
    /// Within each pair, naming neither modifier keeps both.
    ///
    /// ```
    /// use invoicer_engine::core::query::InvoiceFilter;
    ///
    /// let filter = InvoiceFilter::default().with_types("expense,open").unwrap();
    /// assert!(filter.expenses && !filter.contracts);
    /// assert!(filter.open && !filter.closed);
    /// ```
    pub fn with_types(mut self, types: &str) -> Result<Self, LedgerError> {
        let mut named = [false; 4];
        for modifier in types.split(',').map(str::trim).filter(|m| !m.is_empty()) {
            match modifier {
                "contract" => named[0] = true,
                "expense" => named[1] = true,
                "open" => named[2] = true,
                "closed" => named[3] = true,
                other => {
                    return Err(LedgerError::decoding(
                        "invoice filter",
                        format!("unknown modifier '{other}'"),
                    ))
                }
            }
        }
        let [contract, expense, open, closed] = named;
        if contract || expense {
            self.contracts = contract;
            self.expenses = expense;
        }
        if open || closed {
            self.open = open;
            self.closed = closed;
        }
        Ok(self)
    }

    pub fn with_dates(mut self, dates: DateRange) -> Self {
        self.dates = dates;
        self
    }

    pub fn with_senders(mut self, senders: Vec<String>) -> Self {
        self.senders = senders;
        self
    }

    pub fn with_receivers(mut self, receivers: Vec<String>) -> Self {
        self.receivers = receivers;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a single invoice passes the filter
    pub fn matches(&self, invoice: &Invoice) -> bool {
        let ctx = invoice.ctx();
        let kind_ok = match invoice.kind() {
            InvoiceKind::Contract => self.contracts,
            InvoiceKind::Expense => self.expenses,
        };
        let status_ok = if ctx.open { self.open } else { self.closed };
        kind_ok
            && status_ok
            && self.dates.contains(ctx.invoiced.date())
            && party_matches(&self.senders, &ctx.sender)
            && party_matches(&self.receivers, &ctx.receiver)
    }
}

/// Selection of payments for [`Query::payments`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentFilter {
    /// Range the payment date must fall in
    pub dates: DateRange,
    pub senders: Vec<String>,
    pub receivers: Vec<String>,
    pub limit: Option<usize>,
}

impl PaymentFilter {
    pub fn matches(&self, payment: &Payment) -> bool {
        self.dates.contains(payment.payment_cur_time.date())
            && party_matches(&self.senders, &payment.sender)
            && party_matches(&self.receivers, &payment.receiver)
    }
}

fn party_matches(allowed: &[String], name: &str) -> bool {
    allowed.is_empty() || allowed.iter().any(|allowed| allowed == name)
}

/// Read-only view of the ledger state
pub struct Query<'a, S: KvStore + ?Sized> {
    store: &'a S,
    keys: &'a KeySpace,
}

impl<'a, S: KvStore + ?Sized> Query<'a, S> {
    pub fn new(store: &'a S, keys: &'a KeySpace) -> Self {
        Query { store, keys }
    }

    pub fn profile(&self, name: &str) -> Result<Profile, LedgerError> {
        state::load_profile(self.store, self.keys, name)
    }

    pub fn invoice(&self, id: &[u8]) -> Result<Invoice, LedgerError> {
        state::load_invoice(self.store, self.keys, id)
    }

    pub fn payment(&self, transaction_id: &str) -> Result<Payment, LedgerError> {
        state::load_payment(self.store, self.keys, transaction_id)
    }

    /// Active profiles in registration order
    pub fn active_profiles(&self) -> Result<Vec<Profile>, LedgerError> {
        index::active_names(self.store, self.keys)?
            .iter()
            .map(|name| self.profile(name))
            .collect()
    }

    /// Deactivated profiles in deactivation order
    pub fn inactive_profiles(&self) -> Result<Vec<Profile>, LedgerError> {
        index::inactive_names(self.store, self.keys)?
            .iter()
            .map(|name| self.profile(name))
            .collect()
    }

    /// Invoices passing `filter`, in invoice-list order
    pub fn invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, LedgerError> {
        let mut found = Vec::new();
        for id in index::invoice_ids(self.store, self.keys)? {
            if filter.limit.is_some_and(|limit| found.len() >= limit) {
                break;
            }
            let invoice = self.invoice(&id)?;
            if filter.matches(&invoice) {
                found.push(invoice);
            }
        }
        Ok(found)
    }

    /// Payments passing `filter`, in the order they were applied
    pub fn payments(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, LedgerError> {
        let mut found = Vec::new();
        for transaction_id in index::payment_ids(self.store, self.keys)? {
            if filter.limit.is_some_and(|limit| found.len() >= limit) {
                break;
            }
            let payment = self.payment(&transaction_id)?;
            if filter.matches(&payment) {
                found.push(payment);
            }
        }
        Ok(found)
    }

    /// Total unpaid amount per sender over the invoices passing `filter`
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CurrencyMismatch`] if one sender's invoices
    /// are payable in more than one currency.
    pub fn unpaid_by_sender(
        &self,
        filter: &InvoiceFilter,
    ) -> Result<BTreeMap<String, AmtCurTime>, LedgerError> {
        let mut totals: BTreeMap<String, AmtCurTime> = BTreeMap::new();
        for invoice in self.invoices(filter)? {
            let ctx = invoice.ctx();
            let unpaid = ctx.unpaid()?;
            let total = unpaid.checked_add(totals.get(&ctx.sender))?;
            totals.insert(ctx.sender.clone(), total);
        }
        Ok(totals)
    }
}
