//! Ledger replay
//!
//! Replays a CSV file of decided transactions against a fresh in-memory
//! store and writes a CSV report of the resulting state. This is the host
//! side of the ledger: it supplies the caller address and block time for
//! every row and keeps going after a rejected or malformed row.
//!
//! # Design
//!
//! `replay` focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - State transitions to `Invoicer` (ledger rules)
//! - Reporting to `Query` and the `csv_format` writers
//!
//! Rows are processed one at a time; memory use is bounded by the ledger
//! state, not by the length of the input.

use crate::cli::ReportKind;
use crate::core::{InvoiceFilter, Invoicer, KeySpace, MemStore, PaymentFilter, Query};
use crate::io::csv_format::{write_invoices_csv, write_payments_csv, write_profiles_csv};
use crate::io::sync_reader::SyncReader;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Row counts of a finished replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Transactions the ledger accepted
    pub applied: usize,

    /// Transactions the ledger rejected
    pub rejected: usize,

    /// Rows that could not be read into a transaction
    pub malformed: usize,
}

/// Replay `input_path` and write the selected report to `output`
///
/// # Arguments
///
/// * `input_path` - CSV file with `time,caller,tx` rows
/// * `report` - Which entity kind to report
/// * `keys` - Store key namespace the ledger writes under
/// * `output` - Writer receiving the CSV report
///
/// # Returns
///
/// * `Ok(ReplaySummary)` once every row was processed and the report written
/// * `Err(String)` if the input could not be opened, the stored state could
///   not be read back, or the report could not be written
///
/// Rejected transactions and malformed rows are logged and counted; they
/// never stop the replay.
///
/// # Examples
///
/// ```no_run
/// use invoicer_engine::cli::ReportKind;
/// use invoicer_engine::core::KeySpace;
/// use invoicer_engine::replay::replay;
/// use std::path::Path;
///
/// let mut output = std::io::stdout();
/// let summary = replay(Path::new("ledger.csv"), ReportKind::Invoices, KeySpace::default(), &mut output)
///     .expect("Replay failed");
/// println!("{} applied", summary.applied);
/// ```
pub fn replay(
    input_path: &Path,
    report: ReportKind,
    keys: KeySpace,
    output: &mut dyn Write,
) -> Result<ReplaySummary, String> {
    let invoicer = Invoicer::new(keys);
    let mut store = MemStore::new();
    let reader = SyncReader::new(input_path)?;

    let mut summary = ReplaySummary::default();
    for result in reader {
        match result {
            Ok(record) => match invoicer.run_tx(&mut store, &record.call, &record.tx) {
                Ok(()) => summary.applied += 1,
                // The dispatcher already logged the rejection
                Err(_) => summary.rejected += 1,
            },
            Err(e) => {
                warn!(error = %e, "skipping malformed row");
                summary.malformed += 1;
            }
        }
    }

    info!(
        app = invoicer.keys().app(),
        applied = summary.applied,
        rejected = summary.rejected,
        malformed = summary.malformed,
        entries = store.len(),
        "replay finished"
    );

    write_report(&store, invoicer.keys(), report, output)?;
    Ok(summary)
}

/// Write the report for `kind` from the current store contents
///
/// Profiles are listed active first, then deactivated. Invoices and payments
/// follow their list order.
pub fn write_report(
    store: &MemStore,
    keys: &KeySpace,
    kind: ReportKind,
    output: &mut dyn Write,
) -> Result<(), String> {
    let query = Query::new(store, keys);
    let read_error = |e: crate::types::LedgerError| format!("Failed to read ledger state: {}", e);

    match kind {
        ReportKind::Invoices => {
            let invoices = query.invoices(&InvoiceFilter::default()).map_err(read_error)?;
            write_invoices_csv(&invoices, output)
        }
        ReportKind::Profiles => {
            let mut profiles = query.active_profiles().map_err(read_error)?;
            profiles.extend(query.inactive_profiles().map_err(read_error)?);
            write_profiles_csv(&profiles, output)
        }
        ReportKind::Payments => {
            let payments = query.payments(&PaymentFilter::default()).map_err(read_error)?;
            write_payments_csv(&payments, output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::codec::encode_tx;
    use crate::io::csv_format::CsvRecord;
    use crate::types::{CallContext, Timestamp, TxInvoice, TxPayment, TxProfile, TxType};
    use tempfile::NamedTempFile;

    fn at(day: u32) -> CallContext {
        CallContext::new(b"alice".to_vec(), Timestamp::from_ymd(2024, 3, day).unwrap())
    }

    fn as_bob(day: u32) -> CallContext {
        CallContext::new(b"bob".to_vec(), Timestamp::from_ymd(2024, 3, day).unwrap())
    }

    fn open_profile(name: &str) -> Vec<u8> {
        let tx = TxProfile {
            name: name.to_string(),
            accepted_cur: "USD".to_string(),
            due_duration_days: 14,
            ..Default::default()
        };
        encode_tx(TxType::ProfileOpen, &tx).unwrap()
    }

    /// Helper function to write replay rows into a temporary CSV file
    fn create_temp_csv(rows: &[(CallContext, Vec<u8>)]) -> NamedTempFile {
        let file = NamedTempFile::new().expect("Failed to create temp file");
        let mut writer = csv::Writer::from_path(file.path()).expect("Failed to open writer");
        for (call, tx) in rows {
            writer
                .serialize(CsvRecord::from_tx(call, tx))
                .expect("Failed to write row");
        }
        writer.flush().expect("Failed to flush temp file");
        file
    }

    fn ledger_rows() -> Vec<(CallContext, Vec<u8>)> {
        let contract = TxInvoice {
            to: "bob".to_string(),
            amount: "250USD".to_string(),
            notes: "march".to_string(),
            ..Default::default()
        };
        let payment = TxPayment {
            transaction_id: "wire-1".to_string(),
            receiver: "bob".to_string(),
            amount: "100USD".to_string(),
            ..Default::default()
        };
        vec![
            (at(1), open_profile("alice")),
            (as_bob(1), open_profile("bob")),
            (at(2), encode_tx(TxType::ContractOpen, &contract).unwrap()),
            (as_bob(3), encode_tx(TxType::Payment, &payment).unwrap()),
        ]
    }

    fn run(file: &NamedTempFile, report: ReportKind) -> (ReplaySummary, String) {
        let mut output = Vec::new();
        let summary = replay(file.path(), report, KeySpace::default(), &mut output).unwrap();
        (summary, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_replay_applies_rows_in_order() {
        let file = create_temp_csv(&ledger_rows());
        let (summary, report) = run(&file, ReportKind::Invoices);

        assert_eq!(
            summary,
            ReplaySummary {
                applied: 4,
                rejected: 0,
                malformed: 0
            }
        );
        let row = report.lines().nth(1).unwrap();
        assert!(row.contains(",contract,alice,bob,250USD,250USD,100USD,150USD,"));
        assert!(row.ends_with(",true"));
    }

    #[test]
    fn test_replay_profile_and_payment_reports() {
        let file = create_temp_csv(&ledger_rows());

        let (_, profiles) = run(&file, ReportKind::Profiles);
        let lines: Vec<_> = profiles.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("alice,616c696365,USD,"));
        assert!(lines[2].starts_with("bob,626f62,USD,"));

        let (_, payments) = run(&file, ReportKind::Payments);
        let row = payments.lines().nth(1).unwrap();
        assert!(row.starts_with("wire-1,bob,bob,100USD,2024-03-03T00:00:00+00:00,01"));
    }

    #[test]
    fn test_replay_counts_rejections_and_continues() {
        let mut rows = ledger_rows();
        // Second registration of the same name
        rows.insert(2, (as_bob(2), open_profile("alice")));
        let file = create_temp_csv(&rows);

        let (summary, report) = run(&file, ReportKind::Invoices);
        assert_eq!(summary.applied, 4);
        assert_eq!(summary.rejected, 1);
        assert_eq!(report.lines().count(), 2);
    }

    #[test]
    fn test_replay_skips_malformed_rows() {
        let file = create_temp_csv(&ledger_rows());
        let mut content = std::fs::read_to_string(file.path()).unwrap();
        content.push_str("not-a-time,YQ==,AA==\n");
        content.push_str("2024-03-05T00:00:00Z,YQ==,!!\n");
        std::fs::write(file.path(), content).unwrap();

        let (summary, _) = run(&file, ReportKind::Invoices);
        assert_eq!(summary.applied, 4);
        assert_eq!(summary.malformed, 2);
    }

    #[test]
    fn test_replay_handles_missing_file() {
        let mut output = Vec::new();
        let result = replay(
            Path::new("nonexistent.csv"),
            ReportKind::Profiles,
            KeySpace::default(),
            &mut output,
        );
        assert!(result.unwrap_err().contains("Failed to open file"));
        assert!(output.is_empty());
    }

    #[test]
    fn test_replay_empty_input_writes_header_only() {
        let file = create_temp_csv(&[]);
        // csv::Writer writes nothing for zero records, so add the header
        std::fs::write(file.path(), "time,caller,tx\n").unwrap();

        let (summary, report) = run(&file, ReportKind::Payments);
        assert_eq!(summary, ReplaySummary::default());
        assert_eq!(report, "transaction_id,sender,receiver,amount,date,invoices\n");
    }
}
