use crate::model::{CanonicalRecord, NormalizedRow};
use crate::numeric::NumericCell;

/// Records of one table after numeric coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatedTable {
    pub records: Vec<CanonicalRecord>,
    /// Non-empty cells that could not be read as numbers.
    pub coerced_cells: usize,
}

/// Coerce one row. Commission cells fall back to 0, consumption cells to null.
/// Returns the record and how many non-empty cells were coerced.
pub fn calculate_row(row: &NormalizedRow) -> (CanonicalRecord, usize) {
    let mut coerced = 0;
    let mut cell = |raw: &str| {
        let parsed = NumericCell::parse(raw);
        if parsed.is_unparseable() && !raw.trim().is_empty() {
            coerced += 1;
        }
        parsed
    };

    let consumption_from = cell(&row.consumption_from).or_null();
    let consumption_to = cell(&row.consumption_to).or_null();
    let base_commission = cell(&row.base_commission).or_zero();
    let special_commission = match &row.special_commission {
        Some(raw) => cell(raw).or_zero(),
        None => 0.0,
    };

    let record = CanonicalRecord {
        source: row.source,
        line: row.line,
        provider: row.provider.clone(),
        tariff: row.tariff.clone(),
        tariff_id: row.tariff_id.clone(),
        start: row.start.clone(),
        kind: row.kind.clone(),
        consumption_from,
        consumption_to,
        base_commission,
        special_commission,
        total_commission: base_commission + special_commission,
    };
    (record, coerced)
}

/// Apply the coercion policy to every row of one table.
pub fn calculate_table(rows: &[NormalizedRow]) -> CalculatedTable {
    let mut coerced_cells = 0;
    let records = rows
        .iter()
        .map(|row| {
            let (record, coerced) = calculate_row(row);
            coerced_cells += coerced;
            record
        })
        .collect();

    if coerced_cells > 0 {
        if let Some(first) = rows.first() {
            log::warn!(
                "table {}: {coerced_cells} non-numeric cell(s) coerced to defaults",
                first.source
            );
        }
    }

    CalculatedTable { records, coerced_cells }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Source;

    fn row(base: &str, special: Option<&str>, from: &str, to: &str) -> NormalizedRow {
        NormalizedRow {
            source: Source::A,
            line: 1,
            provider: "X".into(),
            tariff: "T1".into(),
            tariff_id: "1".into(),
            start: "2024-01-01".into(),
            kind: "Strom".into(),
            consumption_from: from.into(),
            consumption_to: to.into(),
            base_commission: base.into(),
            special_commission: special.map(String::from),
        }
    }

    #[test]
    fn total_is_base_plus_special() {
        let (r, coerced) = calculate_row(&row("10", Some("5"), "0", "100"));
        assert_eq!(r.base_commission, 10.0);
        assert_eq!(r.special_commission, 5.0);
        assert_eq!(r.total_commission, 15.0);
        assert_eq!(r.consumption_from, Some(0.0));
        assert_eq!(r.consumption_to, Some(100.0));
        assert_eq!(coerced, 0);
    }

    #[test]
    fn absent_special_column_is_zero() {
        let (r, _) = calculate_row(&row("12", None, "0", "100"));
        assert_eq!(r.special_commission, 0.0);
        assert_eq!(r.total_commission, 12.0);
    }

    #[test]
    fn unparseable_commission_is_zero() {
        let (r, coerced) = calculate_row(&row("k.A.", Some(""), "0", "100"));
        assert_eq!(r.base_commission, 0.0);
        assert_eq!(r.special_commission, 0.0);
        assert_eq!(r.total_commission, 0.0);
        // empty special cell is not counted as a coercion
        assert_eq!(coerced, 1);
    }

    #[test]
    fn unparseable_consumption_is_null() {
        let (r, coerced) = calculate_row(&row("1", None, "", "unbegrenzt"));
        assert_eq!(r.consumption_from, None);
        assert_eq!(r.consumption_to, None);
        assert_eq!(coerced, 1);
    }

    #[test]
    fn locale_decimals() {
        let (r, _) = calculate_row(&row("12,50", Some("2,25"), "1.500", "2.000,5"));
        assert_eq!(r.total_commission, 14.75);
        assert_eq!(r.consumption_from, Some(1.5));
        assert_eq!(r.consumption_to, Some(2000.5));
    }

    #[test]
    fn table_counts_coercions() {
        let rows = vec![row("x", None, "0", "1"), row("1", Some("y"), "z", "1")];
        let table = calculate_table(&rows);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.coerced_cells, 3);
    }
}
