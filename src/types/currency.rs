//! Currency-tagged exact decimal amounts
//!
//! [`AmtCurTime`] is the only money type in the ledger. The amount is a
//! [`Decimal`], never a float, so every replica computes identical results.
//! Binary operations require both operands to carry the same currency code;
//! a mismatch is a hard error and nothing is ever converted implicitly.
//!
//! The stored form of the amount is its exact decimal string, so `100.00`
//! and `100` round-trip as written.

use super::error::LedgerError;
use super::time::Timestamp;
use borsh::{BorshDeserialize, BorshSerialize};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use std::io::{self, Read, Write};
use std::str::FromStr;

/// Currency code plus the date an amount was valued at
#[derive(Debug, Clone, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
pub struct CurrencyTime {
    pub cur: String,
    pub date: Timestamp,
}

impl CurrencyTime {
    pub fn new(cur: impl Into<String>, date: Timestamp) -> Self {
        CurrencyTime {
            cur: cur.into(),
            date,
        }
    }
}

/// An exact decimal amount tagged with a currency and a date
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AmtCurTime {
    pub cur_time: CurrencyTime,
    pub amount: Decimal,
}

impl AmtCurTime {
    pub fn new(amount: Decimal, cur: impl Into<String>, date: Timestamp) -> Self {
        AmtCurTime {
            cur_time: CurrencyTime::new(cur, date),
            amount,
        }
    }

    /// Zero of the given currency
    pub fn zero(cur: impl Into<String>, date: Timestamp) -> Self {
        AmtCurTime::new(Decimal::ZERO, cur, date)
    }

    /// Parse `<number><currency>` text such as `100BTC` or `12.50 USD`
    ///
    /// The numeric part is the leading run of digits and `.`; the rest,
    /// after optional whitespace, must be a non-empty alphabetic code.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] if either part is missing or
    /// the number is not a valid decimal.
    ///
    /// ```
    /// use invoicer_engine::types::{AmtCurTime, Timestamp};
    ///
    /// let date = Timestamp::from_ymd(2015, 12, 31).unwrap();
    /// let amt = AmtCurTime::parse("100BTC", date).unwrap();
    /// assert_eq!(amt.currency(), "BTC");
    /// assert_eq!(amt.to_string(), "100BTC");
    /// ```
    pub fn parse(text: &str, date: Timestamp) -> Result<Self, LedgerError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::invalid_amount(text, "empty amount"));
        }

        let split = trimmed
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(trimmed.len());
        let (number, cur) = trimmed.split_at(split);
        let cur = cur.trim_start();

        if number.is_empty() {
            return Err(LedgerError::invalid_amount(text, "missing numeric amount"));
        }
        if cur.is_empty() {
            return Err(LedgerError::invalid_amount(text, "missing currency"));
        }
        if !cur.chars().all(char::is_alphabetic) {
            return Err(LedgerError::invalid_amount(text, "currency must be letters only"));
        }

        // Rejects input the decimal type would round, e.g. beyond 28 places
        let amount = Decimal::from_str_exact(number)
            .map_err(|e| LedgerError::invalid_amount(text, &e.to_string()))?;

        Ok(AmtCurTime::new(amount, cur, date))
    }

    pub fn currency(&self) -> &str {
        &self.cur_time.cur
    }

    pub fn date(&self) -> Timestamp {
        self.cur_time.date
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    fn check_currency(&self, other: &AmtCurTime) -> Result<(), LedgerError> {
        if self.currency() == other.currency() {
            Ok(())
        } else {
            Err(LedgerError::currency_mismatch(self.currency(), other.currency()))
        }
    }

    /// `self + rhs`, where `None` is the additive identity
    ///
    /// The result keeps `self`'s currency and date.
    pub fn checked_add(&self, rhs: Option<&AmtCurTime>) -> Result<AmtCurTime, LedgerError> {
        let Some(rhs) = rhs else {
            return Ok(self.clone());
        };
        self.check_currency(rhs)?;
        let amount = self
            .amount
            .checked_add(rhs.amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("add"))?;
        Ok(AmtCurTime {
            cur_time: self.cur_time.clone(),
            amount,
        })
    }

    /// `self - rhs`, where `None` is the additive identity
    pub fn checked_sub(&self, rhs: Option<&AmtCurTime>) -> Result<AmtCurTime, LedgerError> {
        let Some(rhs) = rhs else {
            return Ok(self.clone());
        };
        self.check_currency(rhs)?;
        let amount = self
            .amount
            .checked_sub(rhs.amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("subtract"))?;
        Ok(AmtCurTime {
            cur_time: self.cur_time.clone(),
            amount,
        })
    }

    /// Currency-checked ordering of the two amounts
    pub fn compare(&self, other: &AmtCurTime) -> Result<Ordering, LedgerError> {
        self.check_currency(other)?;
        Ok(self.amount.cmp(&other.amount))
    }

    pub fn equals(&self, other: &AmtCurTime) -> Result<bool, LedgerError> {
        Ok(self.compare(other)? == Ordering::Equal)
    }

    pub fn gt(&self, other: &AmtCurTime) -> Result<bool, LedgerError> {
        Ok(self.compare(other)? == Ordering::Greater)
    }

    pub fn gte(&self, other: &AmtCurTime) -> Result<bool, LedgerError> {
        Ok(self.compare(other)? != Ordering::Less)
    }

    pub fn lt(&self, other: &AmtCurTime) -> Result<bool, LedgerError> {
        Ok(self.compare(other)? == Ordering::Less)
    }

    pub fn lte(&self, other: &AmtCurTime) -> Result<bool, LedgerError> {
        Ok(self.compare(other)? != Ordering::Greater)
    }
}

impl fmt::Display for AmtCurTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.cur_time.cur)
    }
}

impl BorshSerialize for AmtCurTime {
    fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.amount.to_string().serialize(writer)?;
        self.cur_time.serialize(writer)
    }
}

impl BorshDeserialize for AmtCurTime {
    fn deserialize_reader<R: Read>(reader: &mut R) -> io::Result<Self> {
        let text = String::deserialize_reader(reader)?;
        let amount = Decimal::from_str(&text)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        let cur_time = CurrencyTime::deserialize_reader(reader)?;
        Ok(AmtCurTime { cur_time, amount })
    }
}
