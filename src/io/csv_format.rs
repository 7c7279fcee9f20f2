//! CSV format handling for replay input and report output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for the replay input rows
//! - Conversion from CSV records to a call context plus raw transaction bytes
//! - Report serialization for invoices, profiles and payments
//!
//! All functions are pure (no file I/O) for easy testing.
//!
//! # Input format
//!
//! ```text
//! time,caller,tx
//! 2024-01-10T09:00:00Z,YWxpY2U=,AAUAAABhbGljZQ...
//! ```
//!
//! `time` is the RFC 3339 block time, `caller` the base64 caller address and
//! `tx` the base64 transaction bytes.

use crate::core::keys::to_hex;
use crate::types::{CallContext, Invoice, Payment, Profile, Timestamp};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// CSV record structure for (de)serialization
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    pub time: String,
    pub caller: String,
    pub tx: String,
}

impl CsvRecord {
    /// Build the CSV row that replays `tx` under `call`
    pub fn from_tx(call: &CallContext, tx: &[u8]) -> Self {
        CsvRecord {
            time: call.block_time.to_string(),
            caller: STANDARD.encode(&call.caller),
            tx: STANDARD.encode(tx),
        }
    }
}

/// One decoded input row, ready for the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayRecord {
    pub call: CallContext,
    pub tx: Vec<u8>,
}

/// Convert a CsvRecord to a ReplayRecord
///
/// # Arguments
///
/// * `csv_record` - The deserialized CSV record
///
/// # Returns
///
/// Result containing either:
/// - Ok(ReplayRecord) - Successfully converted record
/// - Err(String) - Error message describing the conversion failure
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<ReplayRecord, String> {
    let block_time: Timestamp = csv_record
        .time
        .parse()
        .map_err(|e| format!("Invalid block time '{}': {}", csv_record.time, e))?;

    let caller = STANDARD
        .decode(csv_record.caller.trim())
        .map_err(|e| format!("Invalid caller '{}': {}", csv_record.caller, e))?;
    if caller.is_empty() {
        return Err("Caller address must not be empty".to_string());
    }

    let tx = STANDARD
        .decode(csv_record.tx.trim())
        .map_err(|e| format!("Invalid transaction encoding: {}", e))?;

    Ok(ReplayRecord {
        call: CallContext::new(caller, block_time),
        tx,
    })
}

fn csv_writer(output: &mut dyn Write) -> csv::Writer<&mut dyn Write> {
    csv::Writer::from_writer(output)
}

fn write_row(writer: &mut csv::Writer<&mut dyn Write>, row: &[String]) -> Result<(), String> {
    writer
        .write_record(row)
        .map_err(|e| format!("Failed to write CSV record: {}", e))
}

fn finish(mut writer: csv::Writer<&mut dyn Write>) -> Result<(), String> {
    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))
}

/// Write invoices to CSV format
///
/// Columns: id, kind, sender, receiver, invoiced, payable, paid, unpaid,
/// due, open. Rows keep the order given.
pub fn write_invoices_csv(invoices: &[Invoice], output: &mut dyn Write) -> Result<(), String> {
    let mut writer = csv_writer(output);
    writer
        .write_record([
            "id", "kind", "sender", "receiver", "invoiced", "payable", "paid", "unpaid", "due",
            "open",
        ])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for invoice in invoices {
        let ctx = invoice.ctx();
        let unpaid = ctx
            .unpaid()
            .map_err(|e| format!("Invoice {}: {}", to_hex(invoice.id()), e))?;
        write_row(
            &mut writer,
            &[
                to_hex(invoice.id()),
                invoice.kind().to_string(),
                ctx.sender.clone(),
                ctx.receiver.clone(),
                ctx.invoiced.to_string(),
                ctx.payable.to_string(),
                ctx.paid.as_ref().map(ToString::to_string).unwrap_or_default(),
                unpaid.to_string(),
                ctx.due.to_string(),
                ctx.open.to_string(),
            ],
        )?;
    }
    finish(writer)
}

/// Write profiles to CSV format
///
/// Columns: name, address (hex), accepted_cur, deposit_info,
/// due_duration_days, active.
pub fn write_profiles_csv(profiles: &[Profile], output: &mut dyn Write) -> Result<(), String> {
    let mut writer = csv_writer(output);
    writer
        .write_record([
            "name",
            "address",
            "accepted_cur",
            "deposit_info",
            "due_duration_days",
            "active",
        ])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for profile in profiles {
        write_row(
            &mut writer,
            &[
                profile.name.clone(),
                to_hex(&profile.address),
                profile.accepted_cur.clone(),
                profile.deposit_info.clone(),
                profile.due_duration_days.to_string(),
                profile.active.to_string(),
            ],
        )?;
    }
    finish(writer)
}

/// Write payments to CSV format
///
/// Columns: transaction_id, sender, receiver, amount, date, invoices. The
/// invoices column joins the hex ids with `;` in allocation order.
pub fn write_payments_csv(payments: &[Payment], output: &mut dyn Write) -> Result<(), String> {
    let mut writer = csv_writer(output);
    writer
        .write_record(["transaction_id", "sender", "receiver", "amount", "date", "invoices"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for payment in payments {
        let ids: Vec<String> = payment.invoice_ids.iter().map(|id| to_hex(id)).collect();
        write_row(
            &mut writer,
            &[
                payment.transaction_id.clone(),
                payment.sender.clone(),
                payment.receiver.clone(),
                payment.payment_cur_time.to_string(),
                payment.payment_cur_time.date().to_string(),
                ids.join(";"),
            ],
        )?;
    }
    finish(writer)
}
