//! Benchmark suite for payment allocation
//!
//! Measures applying one payment that settles every open invoice addressed
//! to a receiver, across invoice sets of increasing size. Invoice lookup and
//! the receiver check are linear in the invoice list, so this is the
//! transaction whose cost grows with the ledger.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```

use divan::Bencher;
use invoicer_engine::core::codec::encode_tx;
use invoicer_engine::{CallContext, Invoicer, MemStore, Timestamp, TxType};
use invoicer_engine::types::{TxInvoice, TxPayment, TxProfile};

fn main() {
    divan::main();
}

fn call(caller: &[u8]) -> CallContext {
    CallContext::new(caller, Timestamp::from_ymd(2024, 1, 1).expect("valid date"))
}

/// Alice and Bob registered, with `invoices` open contracts from Alice to Bob
fn ledger(invoicer: &Invoicer, invoices: usize) -> MemStore {
    let mut store = MemStore::new();
    for (caller, name) in [(b"a", "alice"), (b"b", "bob")] {
        let tx = TxProfile {
            name: name.to_string(),
            accepted_cur: "USD".to_string(),
            due_duration_days: 30,
            ..Default::default()
        };
        let tx = encode_tx(TxType::ProfileOpen, &tx).expect("encodable");
        invoicer.run_tx(&mut store, &call(caller), &tx).expect("profile opens");
    }
    for i in 0..invoices {
        let tx = TxInvoice {
            to: "bob".to_string(),
            amount: "10.25USD".to_string(),
            notes: format!("invoice {i}"),
            ..Default::default()
        };
        let tx = encode_tx(TxType::ContractOpen, &tx).expect("encodable");
        invoicer.run_tx(&mut store, &call(b"a"), &tx).expect("invoice opens");
    }
    store
}

fn settle_all(invoices: usize) -> Vec<u8> {
    let cents = invoices as u64 * 1025;
    let tx = TxPayment {
        transaction_id: "bench".to_string(),
        receiver: "bob".to_string(),
        amount: format!("{}.{:02}USD", cents / 100, cents % 100),
        ..Default::default()
    };
    encode_tx(TxType::Payment, &tx).expect("encodable")
}

/// One payment settling every open invoice, found by scanning the list
#[divan::bench(args = [1, 10, 100, 1000])]
fn settle_by_scan(bencher: Bencher, invoices: usize) {
    let invoicer = Invoicer::default();
    let tx = settle_all(invoices);
    bencher
        .with_inputs(|| ledger(&invoicer, invoices))
        .bench_values(|mut store| {
            invoicer
                .run_tx(&mut store, &call(b"b"), &tx)
                .expect("payment applies");
            store
        });
}

/// A partial payment that only touches the oldest invoice
#[divan::bench(args = [1, 10, 100, 1000])]
fn partial_payment(bencher: Bencher, invoices: usize) {
    let invoicer = Invoicer::default();
    let tx = TxPayment {
        transaction_id: "bench".to_string(),
        receiver: "bob".to_string(),
        amount: "5USD".to_string(),
        ..Default::default()
    };
    let tx = encode_tx(TxType::Payment, &tx).expect("encodable");
    bencher
        .with_inputs(|| ledger(&invoicer, invoices))
        .bench_values(|mut store| {
            invoicer
                .run_tx(&mut store, &call(b"b"), &tx)
                .expect("payment applies");
            store
        });
}
