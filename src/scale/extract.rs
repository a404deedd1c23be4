//! Weight extraction from a single framed line.
//!
//! Scale frames usually carry status and unit tags before the reading
//! (`ST,GS,+  1.200kg`), so candidates are scanned from the right and the
//! first one that parses to a finite value above zero wins. Zero and
//! negative readings are skipped.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    // ASCII digits only; `\d` would also match Arabic-Indic digits that f64
    // parsing rejects.
    Regex::new(r"[-+]?[0-9]*\.?[0-9]+").expect("number pattern is valid")
});

/// A weight read off one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightSample {
    pub value: f64,
    /// Canonical text stored in the label's weight field (`1.200` → `1.2`).
    pub text: String,
    /// Line the value came from.
    pub line: String,
}

/// All numeric tokens in `line`, left to right.
pub fn candidates(line: &str) -> Vec<&str> {
    NUMBER.find_iter(line).map(|m| m.as_str()).collect()
}

/// Pick the rightmost strictly positive number in `line`.
///
/// ```
/// use tarazu::scale::extract_weight;
///
/// assert_eq!(extract_weight("ST,GS,+  1.200kg").unwrap().value, 1.2);
/// assert_eq!(extract_weight("-0,0,45.2,BAD").unwrap().text, "45.2");
/// assert!(extract_weight("ST,GS,+  0.000kg").is_none());
/// ```
pub fn extract_weight(line: &str) -> Option<WeightSample> {
    candidates(line)
        .into_iter()
        .rev()
        .filter_map(|token| token.parse::<f64>().ok())
        .find(|value| value.is_finite() && *value > 0.0)
        .map(|value| WeightSample {
            value,
            text: value.to_string(),
            line: line.to_string(),
        })
}

// ============================================================================
// TESTS
// ============================================================================
