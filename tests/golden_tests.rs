//! # Golden Tests
//!
//! These tests pin the exact TSPL text the label encoder produces for a
//! fixed record, one file per label size.
//!
//! ## Regenerating Golden Files
//!
//! ```bash
//! cargo test generate_golden_files -- --ignored --nocapture
//! ```

use pretty_assertions::assert_eq;
use std::fs;
use tarazu::label::{EncodeOptions, LabelField, LabelRecord, encode, encode_with};
use tarazu::printer::LabelSize;

/// Path to golden test directory
const GOLDEN_DIR: &str = "tests/golden";

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// The shipment every golden label is built from.
fn sample_record() -> LabelRecord {
    let mut record = LabelRecord::default();
    for (field, value) in [
        (LabelField::TrackingNumber, "04515000010732"),
        (LabelField::OrderId, "200-40236801"),
        (LabelField::SenderName, "BIZ"),
        (LabelField::SenderCity, "Tehran"),
        (LabelField::SenderAddress, "Postal code 1577646813"),
        (LabelField::ReceiverName, "Peyman Moeini"),
        (LabelField::ReceiverCity, "Zanjan"),
        (LabelField::ReceiverAddress, "Parvin Etesami St, No. 1"),
        (LabelField::ReceiverPostCode, "4571310004"),
        (LabelField::ReceiverPhone, "02435520000"),
        (LabelField::ReceiverMobile, "09100277226"),
        (LabelField::Weight, "205"),
        (LabelField::Date, "1404-04-22"),
    ] {
        record.set(field, value);
    }
    record
}

fn golden_name(size: LabelSize) -> String {
    format!("label_{}", size)
}

fn write_golden(name: &str, ext: &str, data: &str) {
    let path = format!("{}/{}.{}", GOLDEN_DIR, name, ext);
    fs::write(&path, data).unwrap();
    println!("Wrote {}", path);
}

fn check_golden(name: &str, ext: &str, data: &str) {
    let path = format!("{}/{}.{}", GOLDEN_DIR, name, ext);
    let golden = fs::read_to_string(&path).unwrap_or_else(|_| {
        panic!(
            "Golden file not found: {}. Run `cargo test generate_golden_files -- --ignored` to generate.",
            path
        )
    });
    assert_eq!(golden, data, "golden mismatch for {}", path);
}

// ============================================================================
// GOLDEN FILE GENERATION
// ============================================================================

/// Run with: cargo test generate_golden_files -- --ignored --nocapture
#[test]
#[ignore]
fn generate_golden_files() {
    fs::create_dir_all(GOLDEN_DIR).unwrap();
    let record = sample_record();
    for size in LabelSize::ALL {
        write_golden(&golden_name(size), "tspl", &encode(&record, size).to_tspl());
    }
}

// ============================================================================
// LABEL TESTS
// ============================================================================

#[test]
fn test_label_100x80() {
    let tspl = encode(&sample_record(), LabelSize::Size100x80).to_tspl();
    check_golden("label_100x80", "tspl", &tspl);
}

#[test]
fn test_label_100x100() {
    let tspl = encode(&sample_record(), LabelSize::Size100x100).to_tspl();
    check_golden("label_100x100", "tspl", &tspl);
}

#[test]
fn test_label_80x100() {
    let tspl = encode(&sample_record(), LabelSize::Size80x100).to_tspl();
    check_golden("label_80x100", "tspl", &tspl);
}

#[test]
fn test_copies_only_change_the_print_line() {
    let options = EncodeOptions {
        copies: 2,
        ..Default::default()
    };
    let single = encode(&sample_record(), LabelSize::Size100x80).to_tspl();
    let double = encode_with(&sample_record(), LabelSize::Size100x80, &options).to_tspl();
    assert_eq!(
        single.replace("PRINT 1\n", "PRINT 2\n"),
        double,
    );
}

#[test]
fn test_every_line_is_newline_terminated() {
    for size in LabelSize::ALL {
        let tspl = encode(&sample_record(), size).to_tspl();
        assert!(tspl.ends_with('\n'));
        assert!(!tspl.contains("\r"));
        assert!(!tspl.contains("\n\n"));
    }
}
