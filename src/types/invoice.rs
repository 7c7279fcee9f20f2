//! Invoice types
//!
//! An invoice is a closed sum of two variants, [`Contract`] and [`Expense`],
//! sharing the [`Context`] header. Behaviour that differs per variant is
//! matched exhaustively on [`Invoice`].
//!
//! # Identity
//!
//! An invoice id is content-addressed: one variant tag byte followed by the
//! blake3 hash of the borsh-encoded context at creation time. The id is
//! computed once, when the invoice is first created, and is carried through
//! every later edit unchanged.

use super::currency::AmtCurTime;
use super::error::LedgerError;
use super::time::Timestamp;
use borsh::{BorshDeserialize, BorshSerialize};
use std::fmt;

/// Leading id byte of a contract invoice
pub const CONTRACT_TAG: u8 = 0x01;

/// Leading id byte of an expense invoice
pub const EXPENSE_TAG: u8 = 0x02;

/// Length of a content-addressed invoice id
pub const INVOICE_ID_LEN: usize = 1 + blake3::OUT_LEN;

/// Discriminant of the two invoice variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvoiceKind {
    Contract,
    Expense,
}

impl InvoiceKind {
    /// Id tag byte for this variant
    pub fn tag(self) -> u8 {
        match self {
            InvoiceKind::Contract => CONTRACT_TAG,
            InvoiceKind::Expense => EXPENSE_TAG,
        }
    }

    /// Variant named by an id's leading byte
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            CONTRACT_TAG => Some(InvoiceKind::Contract),
            EXPENSE_TAG => Some(InvoiceKind::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for InvoiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceKind::Contract => write!(f, "contract"),
            InvoiceKind::Expense => write!(f, "expense"),
        }
    }
}

/// Shared invoice header, and the input of the content hash
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Context {
    pub sender: String,
    pub receiver: String,
    pub deposit_info: String,
    pub notes: String,
    pub accepted_cur: String,
    pub due: Timestamp,

    /// False exactly when `paid == payable`
    pub open: bool,

    /// Amount as invoiced, in the sender's currency
    pub invoiced: AmtCurTime,

    /// Amount due, in the accepted currency
    pub payable: AmtCurTime,

    /// Amount settled so far; `None` until the first payment
    pub paid: Option<AmtCurTime>,
}

impl Context {
    /// Create an open, unpaid context
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        deposit_info: impl Into<String>,
        notes: impl Into<String>,
        accepted_cur: impl Into<String>,
        due: Timestamp,
        invoiced: AmtCurTime,
        payable: AmtCurTime,
    ) -> Self {
        Context {
            sender: sender.into(),
            receiver: receiver.into(),
            deposit_info: deposit_info.into(),
            notes: notes.into(),
            accepted_cur: accepted_cur.into(),
            due,
            open: true,
            invoiced,
            payable,
            paid: None,
        }
    }

    /// Remaining unpaid portion, `payable - paid`
    pub fn unpaid(&self) -> Result<AmtCurTime, LedgerError> {
        self.payable.checked_sub(self.paid.as_ref())
    }

    /// Apply as much of `fund` as this invoice can absorb
    ///
    /// If the fund covers the unpaid portion the invoice is paid in full and
    /// closed; otherwise the whole fund is added to `paid` and the invoice
    /// stays open. Returns what is left of the fund.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CurrencyMismatch`] if the fund is not in the
    /// payable currency.
    pub fn pay(&mut self, fund: AmtCurTime) -> Result<AmtCurTime, LedgerError> {
        if fund.is_zero() {
            return Ok(fund);
        }

        let unpaid = self.unpaid()?;
        if fund.gte(&unpaid)? {
            self.paid = Some(self.payable.clone());
            self.open = false;
            fund.checked_sub(Some(&unpaid))
        } else {
            self.paid = Some(fund.checked_add(self.paid.as_ref())?);
            Ok(AmtCurTime::zero(fund.currency(), fund.date()))
        }
    }

    /// blake3 hash of the encoded context
    pub fn content_hash(&self) -> Result<[u8; blake3::OUT_LEN], LedgerError> {
        let bytes = borsh::to_vec(self)?;
        Ok(*blake3::hash(&bytes).as_bytes())
    }
}

/// Invoice for contracted work
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Contract {
    pub id: Vec<u8>,
    pub ctx: Context,
}

impl Contract {
    pub fn new(id: Vec<u8>, ctx: Context) -> Self {
        Contract { id, ctx }
    }
}

/// Invoice for a reimbursable expense, carrying its receipt
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Expense {
    pub id: Vec<u8>,
    pub ctx: Context,
    pub document: Vec<u8>,
    pub doc_file_name: String,
    pub expense_taxes: AmtCurTime,
}

impl Expense {
    pub fn new(
        id: Vec<u8>,
        ctx: Context,
        document: Vec<u8>,
        doc_file_name: impl Into<String>,
        expense_taxes: AmtCurTime,
    ) -> Self {
        Expense {
            id,
            ctx,
            document,
            doc_file_name: doc_file_name.into(),
            expense_taxes,
        }
    }
}

/// A stored invoice of either variant
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum Invoice {
    Contract(Contract),
    Expense(Expense),
}

impl Invoice {
    pub fn kind(&self) -> InvoiceKind {
        match self {
            Invoice::Contract(_) => InvoiceKind::Contract,
            Invoice::Expense(_) => InvoiceKind::Expense,
        }
    }

    pub fn id(&self) -> &[u8] {
        match self {
            Invoice::Contract(contract) => &contract.id,
            Invoice::Expense(expense) => &expense.id,
        }
    }

    pub fn ctx(&self) -> &Context {
        match self {
            Invoice::Contract(contract) => &contract.ctx,
            Invoice::Expense(expense) => &expense.ctx,
        }
    }

    pub fn ctx_mut(&mut self) -> &mut Context {
        match self {
            Invoice::Contract(contract) => &mut contract.ctx,
            Invoice::Expense(expense) => &mut expense.ctx,
        }
    }

    /// Replace the id, as an edit does with the id of the invoice it edits
    pub fn set_id(&mut self, id: Vec<u8>) {
        match self {
            Invoice::Contract(contract) => contract.id = id,
            Invoice::Expense(expense) => expense.id = id,
        }
    }

    /// Assign the content-addressed id if none is set yet
    ///
    /// An invoice that already has an id keeps it.
    pub fn assign_id(&mut self) -> Result<(), LedgerError> {
        if !self.id().is_empty() {
            return Ok(());
        }
        let hash = self.ctx().content_hash()?;
        let mut id = Vec::with_capacity(INVOICE_ID_LEN);
        id.push(self.kind().tag());
        id.extend_from_slice(&hash);
        self.set_id(id);
        Ok(())
    }
}

impl From<Contract> for Invoice {
    fn from(contract: Contract) -> Self {
        Invoice::Contract(contract)
    }
}

impl From<Expense> for Invoice {
    fn from(expense: Expense) -> Self {
        Invoice::Expense(expense)
    }
}
