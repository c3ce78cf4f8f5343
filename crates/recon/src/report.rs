// Report projection: matched records in, display rows with highlight flags out.
// No recomputation of commission values, no re-sorting.

use std::fmt;

use crate::config::HighlightTarget;
use crate::model::{MatchedRecord, Source};

/// Output columns, in contract order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Provider,
    Tariff,
    TariffId,
    Start,
    Type,
    ConsumptionFrom,
    ConsumptionTo,
    CommissionA,
    CommissionB,
    Result,
}

impl Column {
    pub const ALL: [Column; 10] = [
        Column::Provider,
        Column::Tariff,
        Column::TariffId,
        Column::Start,
        Column::Type,
        Column::ConsumptionFrom,
        Column::ConsumptionTo,
        Column::CommissionA,
        Column::CommissionB,
        Column::Result,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Column::Provider => "Provider",
            Column::Tariff => "Tariff",
            Column::TariffId => "Tariff-ID",
            Column::Start => "Start",
            Column::Type => "Type",
            Column::ConsumptionFrom => "Consumption-From",
            Column::ConsumptionTo => "Consumption-To",
            Column::CommissionA => "Commission-A",
            Column::CommissionB => "Commission-B",
            Column::Result => "Result",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Column::ConsumptionFrom
                | Column::ConsumptionTo
                | Column::CommissionA
                | Column::CommissionB
                | Column::Result
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    /// Money, shown with two decimals.
    Amount(f64),
    /// Consumption, shown without trailing zeros.
    Quantity(f64),
    Empty,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Amount(v) => f.write_str(&format_amount(*v)),
            CellValue::Quantity(v) => f.write_str(&format_quantity(*v)),
            CellValue::Empty => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportCell {
    pub column: Column,
    pub value: CellValue,
    pub highlight: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub cells: Vec<ReportCell>,
}

impl ReportRow {
    pub fn cell(&self, column: Column) -> Option<&ReportCell> {
        self.cells.iter().find(|c| c.column == column)
    }

    pub fn highlighted(&self) -> impl Iterator<Item = Column> + '_ {
        self.cells.iter().filter(|c| c.highlight).map(|c| c.column)
    }
}

/// Everything a renderer needs: heading, header row, data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    pub columns: Vec<Column>,
    pub rows: Vec<ReportRow>,
}

pub fn format_amount(v: f64) -> String {
    // avoid "-0.00"
    let v = if v == 0.0 { 0.0 } else { v };
    format!("{v:.2}")
}

pub fn format_quantity(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{v:.6}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn project(m: &MatchedRecord, column: Column) -> CellValue {
    let quantity = |v: Option<f64>| v.map(CellValue::Quantity).unwrap_or(CellValue::Empty);
    match column {
        Column::Provider => CellValue::Text(m.key.provider.clone()),
        Column::Tariff => CellValue::Text(m.key.tariff.clone()),
        Column::TariffId => CellValue::Text(m.key.tariff_id.clone()),
        Column::Start => CellValue::Text(m.key.start.clone()),
        Column::Type => CellValue::Text(m.key.kind.clone()),
        Column::ConsumptionFrom => quantity(m.a.consumption_from),
        Column::ConsumptionTo => quantity(m.a.consumption_to),
        Column::CommissionA => CellValue::Amount(m.a.total_commission),
        Column::CommissionB => CellValue::Amount(m.b.total_commission),
        Column::Result => CellValue::Amount(m.result),
    }
}

fn is_highlighted(m: &MatchedRecord, column: Column, target: HighlightTarget) -> bool {
    match (target, column) {
        (HighlightTarget::WinningCommission, Column::CommissionA) => m.winner.includes(Source::A),
        (HighlightTarget::WinningCommission, Column::CommissionB) => m.winner.includes(Source::B),
        (HighlightTarget::Result, Column::Result) => true,
        _ => false,
    }
}

pub fn build_row(m: &MatchedRecord, target: HighlightTarget) -> ReportRow {
    let cells = Column::ALL
        .iter()
        .map(|&column| ReportCell {
            column,
            value: project(m, column),
            highlight: is_highlighted(m, column, target),
        })
        .collect();
    ReportRow { cells }
}

/// One row per matched record, in reconciler order.
pub fn build_report(title: &str, matches: &[MatchedRecord], target: HighlightTarget) -> Report {
    Report {
        title: title.to_string(),
        columns: Column::ALL.to_vec(),
        rows: matches.iter().map(|m| build_row(m, target)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CanonicalRecord, Winner};

    fn record(source: Source, total: f64) -> CanonicalRecord {
        CanonicalRecord {
            source,
            line: 1,
            provider: "X".into(),
            tariff: "T1".into(),
            tariff_id: "1".into(),
            start: "2024-01-01".into(),
            kind: "Strom".into(),
            consumption_from: Some(0.0),
            consumption_to: None,
            base_commission: total,
            special_commission: 0.0,
            total_commission: total,
        }
    }

    fn matched(total_a: f64, total_b: f64, winner: Winner) -> MatchedRecord {
        let a = record(Source::A, total_a);
        MatchedRecord {
            key: a.match_key(),
            b: record(Source::B, total_b),
            a,
            winner,
            result: total_a.max(total_b),
        }
    }

    #[test]
    fn header_order_is_fixed() {
        let report = build_report("t", &[], HighlightTarget::WinningCommission);
        let labels: Vec<&str> = report.columns.iter().map(|c| c.label()).collect();
        assert_eq!(
            labels,
            vec![
                "Provider", "Tariff", "Tariff-ID", "Start", "Type", "Consumption-From",
                "Consumption-To", "Commission-A", "Commission-B", "Result",
            ]
        );
        assert!(report.rows.is_empty());
    }

    #[test]
    fn winner_cell_highlighted() {
        let row = build_row(&matched(15.0, 12.0, Winner::A), HighlightTarget::WinningCommission);
        assert_eq!(row.highlighted().collect::<Vec<_>>(), vec![Column::CommissionA]);
        assert_eq!(row.cell(Column::Result).unwrap().value.to_string(), "15.00");
        assert_eq!(row.cell(Column::CommissionB).unwrap().value.to_string(), "12.00");
        assert_eq!(row.cell(Column::ConsumptionFrom).unwrap().value.to_string(), "0");
        assert_eq!(row.cell(Column::ConsumptionTo).unwrap().value, CellValue::Empty);
    }

    #[test]
    fn tie_highlights_both_commissions() {
        let row = build_row(&matched(10.0, 10.0, Winner::Tie), HighlightTarget::WinningCommission);
        assert_eq!(
            row.highlighted().collect::<Vec<_>>(),
            vec![Column::CommissionA, Column::CommissionB]
        );
    }

    #[test]
    fn result_target_highlights_result_only() {
        let row = build_row(&matched(10.0, 12.0, Winner::B), HighlightTarget::Result);
        assert_eq!(row.highlighted().collect::<Vec<_>>(), vec![Column::Result]);
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_amount(12.5), "12.50");
        assert_eq!(format_amount(-0.0), "0.00");
        assert_eq!(format_quantity(100.0), "100");
        assert_eq!(format_quantity(2000.5), "2000.5");
        assert_eq!(format_quantity(0.125), "0.125");
    }
}
