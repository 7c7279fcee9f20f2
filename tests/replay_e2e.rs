//! End-to-end replay tests
//!
//! These tests validate the complete replay pipeline. Each test:
//! 1. Encodes a sequence of transactions and writes them as CSV rows
//! 2. Replays the file through the ledger
//! 3. Compares the generated report with the expected rows
//!
//! Invoice ids are content hashes, so invoice reports are compared with the
//! id column stripped.

#[cfg(test)]
mod tests {
    use invoicer_engine::cli::ReportKind;
    use invoicer_engine::core::codec::encode_tx;
    use invoicer_engine::core::KeySpace;
    use invoicer_engine::io::CsvRecord;
    use invoicer_engine::replay::{replay, ReplaySummary};
    use invoicer_engine::types::{CallContext, Timestamp, TxInvoice, TxPayment, TxProfile, TxType};
    use rstest::rstest;
    use tempfile::NamedTempFile;

    fn at(caller: &str, day: u32) -> CallContext {
        CallContext::new(caller.as_bytes(), Timestamp::from_ymd(2024, 4, day).unwrap())
    }

    fn profile(name: &str, cur: &str) -> Vec<u8> {
        let tx = TxProfile {
            name: name.to_string(),
            accepted_cur: cur.to_string(),
            deposit_info: format!("{name}-bank"),
            due_duration_days: 10,
        };
        encode_tx(TxType::ProfileOpen, &tx).unwrap()
    }

    fn contract(to: &str, amount: &str, notes: &str) -> Vec<u8> {
        let tx = TxInvoice {
            to: to.to_string(),
            amount: amount.to_string(),
            notes: notes.to_string(),
            ..Default::default()
        };
        encode_tx(TxType::ContractOpen, &tx).unwrap()
    }

    fn expense(to: &str, amount: &str, payable: &str) -> Vec<u8> {
        let tx = TxInvoice {
            to: to.to_string(),
            amount: amount.to_string(),
            payable: payable.to_string(),
            receipt: b"receipt".to_vec(),
            receipt_name: "taxi.png".to_string(),
            taxes: "1.5EUR".to_string(),
            ..Default::default()
        };
        encode_tx(TxType::ExpenseOpen, &tx).unwrap()
    }

    fn payment(tx_id: &str, receiver: &str, amount: &str) -> Vec<u8> {
        let tx = TxPayment {
            transaction_id: tx_id.to_string(),
            receiver: receiver.to_string(),
            amount: amount.to_string(),
            ..Default::default()
        };
        encode_tx(TxType::Payment, &tx).unwrap()
    }

    /// A month of bookkeeping between a contractor and two clients
    fn scenario() -> Vec<(CallContext, Vec<u8>)> {
        vec![
            (at("addr-ann", 1), profile("ann", "USD")),
            (at("addr-ben", 1), profile("ben", "USD")),
            (at("addr-cat", 1), profile("cat", "USD")),
            (at("addr-ann", 2), contract("ben", "300USD", "design")),
            (at("addr-ann", 3), contract("ben", "200USD", "build")),
            (at("addr-ann", 4), expense("cat", "20EUR", "21.60USD")),
            // Rejected: a conversion is needed but no payable was supplied
            (at("addr-ann", 4), expense("cat", "30EUR", "")),
            (at("addr-ben", 5), payment("ben-1", "ben", "350USD")),
            (at("addr-cat", 6), payment("cat-1", "cat", "21.60USD")),
            // Rejected: nothing left open for cat
            (at("addr-cat", 7), payment("cat-2", "cat", "1USD")),
            // Rejected: unknown tag
            (at("addr-cat", 7), vec![0x2a]),
        ]
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

    fn run(report: ReportKind) -> (ReplaySummary, Vec<String>) {
        let file = create_temp_csv(&scenario());
        let mut output = Vec::new();
        let summary = replay(file.path(), report, KeySpace::default(), &mut output).unwrap();
        let lines = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        (summary, lines)
    }

    /// Drop the leading id column of an invoice report row
    fn without_id(line: &str) -> &str {
        line.split_once(',').map(|(_, rest)| rest).unwrap_or(line)
    }

    #[test]
    fn test_replay_summary() {
        let (summary, _) = run(ReportKind::Invoices);
        assert_eq!(
            summary,
            ReplaySummary {
                applied: 8,
                rejected: 3,
                malformed: 0
            }
        );
    }

    #[test]
    fn test_invoice_report() {
        let (_, lines) = run(ReportKind::Invoices);
        let rows: Vec<&str> = lines.iter().skip(1).map(|line| without_id(line)).collect();
        assert_eq!(
            rows,
            vec![
                "contract,ann,ben,300USD,300USD,300USD,0USD,2024-04-12T00:00:00+00:00,false",
                "contract,ann,ben,200USD,200USD,50USD,150USD,2024-04-13T00:00:00+00:00,true",
                "expense,ann,cat,20EUR,21.60USD,21.60USD,0.00USD,2024-04-14T00:00:00+00:00,false",
            ]
        );
        assert!(lines[1].starts_with("01"));
        assert!(lines[3].starts_with("02"));
    }

    #[test]
    fn test_profile_report() {
        let (_, lines) = run(ReportKind::Profiles);
        assert_eq!(
            lines,
            vec![
                "name,address,accepted_cur,deposit_info,due_duration_days,active",
                "ann,616464722d616e6e,USD,ann-bank,10,true",
                "ben,616464722d62656e,USD,ben-bank,10,true",
                "cat,616464722d636174,USD,cat-bank,10,true",
            ]
        );
    }

    #[test]
    fn test_payment_report() {
        let (_, lines) = run(ReportKind::Payments);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("ben-1,ben,ben,350USD,2024-04-05T00:00:00+00:00,01"));
        // Two invoices settled, ids separated by ';'
        assert_eq!(lines[1].matches(';').count(), 1);
        assert!(lines[2].starts_with("cat-1,cat,cat,21.60USD,2024-04-06T00:00:00+00:00,02"));
    }

    #[rstest]
    #[case::invoices(ReportKind::Invoices)]
    #[case::profiles(ReportKind::Profiles)]
    #[case::payments(ReportKind::Payments)]
    fn test_namespace_does_not_change_report(#[case] report: ReportKind) {
        let file = create_temp_csv(&scenario());
        let mut default_ns = Vec::new();
        let mut custom_ns = Vec::new();
        replay(file.path(), report, KeySpace::default(), &mut default_ns).unwrap();
        replay(file.path(), report, KeySpace::new("books"), &mut custom_ns).unwrap();
        assert_eq!(default_ns, custom_ns);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let file = create_temp_csv(&scenario());
        let mut first = Vec::new();
        let mut second = Vec::new();
        replay(file.path(), ReportKind::Invoices, KeySpace::default(), &mut first).unwrap();
        replay(file.path(), ReportKind::Invoices, KeySpace::default(), &mut second).unwrap();
        assert_eq!(first, second);
    }
}
