use std::fmt;

use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::report::format_quantity;

// ---------------------------------------------------------------------------
// Source tag
// ---------------------------------------------------------------------------

/// Which of the two input tables a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Source {
    A,
    B,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Normalized input
// ---------------------------------------------------------------------------

/// One input row renamed onto canonical fields, cells still as text.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub source: Source,
    pub line: usize,
    pub provider: String,
    pub tariff: String,
    pub tariff_id: String,
    pub start: String,
    pub kind: String,
    pub consumption_from: String,
    pub consumption_to: String,
    pub base_commission: String,
    /// `None` when the table has no special-commission column.
    pub special_commission: Option<String>,
}

// ---------------------------------------------------------------------------
// Canonical record
// ---------------------------------------------------------------------------

/// The schema-unified, numerically coerced unit of comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    pub source: Source,
    /// 1-based data row number in the source table.
    pub line: usize,
    pub provider: String,
    pub tariff: String,
    pub tariff_id: String,
    /// Verbatim contract start token; never parsed as a date.
    pub start: String,
    pub kind: String,
    pub consumption_from: Option<f64>,
    pub consumption_to: Option<f64>,
    pub base_commission: f64,
    pub special_commission: f64,
    pub total_commission: f64,
}

impl CanonicalRecord {
    pub fn match_key(&self) -> MatchKey {
        MatchKey {
            provider: self.provider.clone(),
            tariff: self.tariff.clone(),
            tariff_id: self.tariff_id.clone(),
            start: self.start.clone(),
            kind: self.kind.clone(),
            consumption_from: self.consumption_from.map(key_number),
            consumption_to: self.consumption_to.map(key_number),
        }
    }
}

/// Collapse -0.0 onto 0.0 so both hash identically.
fn key_number(value: f64) -> OrderedFloat<f64> {
    OrderedFloat(value + 0.0)
}

// ---------------------------------------------------------------------------
// Match key
// ---------------------------------------------------------------------------

/// Composite business identity of a contract. Null consumption equals null.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchKey {
    pub provider: String,
    pub tariff: String,
    pub tariff_id: String,
    pub start: String,
    pub kind: String,
    pub consumption_from: Option<OrderedFloat<f64>>,
    pub consumption_to: Option<OrderedFloat<f64>>,
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num = |v: &Option<OrderedFloat<f64>>| v.map(|n| format_quantity(n.0)).unwrap_or_default();
        write!(
            f,
            "({} | {} | {} | {} | {} | {} | {})",
            self.provider,
            self.tariff,
            self.tariff_id,
            self.start,
            self.kind,
            num(&self.consumption_from),
            num(&self.consumption_to),
        )
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    A,
    B,
    /// Equal totals under the `tie` policy.
    Tie,
}

impl Winner {
    /// Whether the given source's commission is (one of) the winning value(s).
    pub fn includes(&self, source: Source) -> bool {
        matches!(
            (self, source),
            (Self::A, Source::A) | (Self::B, Source::B) | (Self::Tie, _)
        )
    }
}

impl From<Source> for Winner {
    fn from(source: Source) -> Self {
        match source {
            Source::A => Self::A,
            Source::B => Self::B,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchedRecord {
    pub key: MatchKey,
    pub a: CanonicalRecord,
    pub b: CanonicalRecord,
    pub winner: Winner,
    /// `max(a.total_commission, b.total_commission)`.
    pub result: f64,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconSummary {
    pub rows_a: usize,
    pub rows_b: usize,
    pub matched: usize,
    pub a_wins: usize,
    pub b_wins: usize,
    pub ties: usize,
    pub only_a_keys: usize,
    pub only_b_keys: usize,
    pub coerced_cells: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub label_a: String,
    pub label_b: String,
    pub engine_version: String,
    pub run_at: String,
    /// SHA-256 over both inputs, hex.
    pub input_fingerprint: String,
}

#[derive(Debug, Clone)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub matches: Vec<MatchedRecord>,
    pub report: crate::report::Report,
}
