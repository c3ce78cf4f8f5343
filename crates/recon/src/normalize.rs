use crate::config::ColumnAliases;
use crate::error::ReconError;
use crate::model::NormalizedRow;
use crate::table::RawTable;

/// Resolved column positions for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub provider: usize,
    pub tariff: usize,
    pub tariff_id: usize,
    pub start: usize,
    pub kind: usize,
    pub consumption_from: usize,
    pub consumption_to: usize,
    pub base_commission: usize,
    pub special_commission: Option<usize>,
}

/// First alias present in the header wins.
fn find_column(table: &RawTable, aliases: &[String]) -> Option<usize> {
    aliases.iter().find_map(|name| table.column_index(name))
}

/// Locate every canonical field in the table header.
/// Collects all missing required columns before failing.
pub fn resolve_layout(table: &RawTable, aliases: &ColumnAliases) -> Result<ColumnLayout, ReconError> {
    let mut missing = Vec::new();
    let mut required = |list: &[String]| -> usize {
        match find_column(table, list) {
            Some(idx) => idx,
            None => {
                missing.push(list.first().cloned().unwrap_or_default());
                usize::MAX
            }
        }
    };

    let layout = ColumnLayout {
        provider: required(&aliases.provider),
        tariff: required(&aliases.tariff),
        tariff_id: required(&aliases.tariff_id),
        start: required(&aliases.start),
        kind: required(&aliases.kind),
        consumption_from: required(&aliases.consumption_from),
        consumption_to: required(&aliases.consumption_to),
        base_commission: required(&aliases.base_commission),
        special_commission: find_column(table, &aliases.special_commission),
    };

    if !missing.is_empty() {
        return Err(ReconError::Schema {
            source: table.source,
            missing,
        });
    }

    Ok(layout)
}

/// Rename a raw table onto canonical fields. Extra columns are dropped.
pub fn normalize_table(table: &RawTable, aliases: &ColumnAliases) -> Result<Vec<NormalizedRow>, ReconError> {
    let layout = resolve_layout(table, aliases)?;

    if layout.special_commission.is_none() {
        log::debug!("table {}: no special-commission column, defaulting to 0", table.source);
    }

    let rows = table
        .rows
        .iter()
        .map(|row| NormalizedRow {
            source: table.source,
            line: row.line,
            provider: row.get(layout.provider).to_string(),
            tariff: row.get(layout.tariff).to_string(),
            tariff_id: row.get(layout.tariff_id).to_string(),
            start: row.get(layout.start).to_string(),
            kind: row.get(layout.kind).to_string(),
            consumption_from: row.get(layout.consumption_from).to_string(),
            consumption_to: row.get(layout.consumption_to).to_string(),
            base_commission: row.get(layout.base_commission).to_string(),
            special_commission: layout.special_commission.map(|idx| row.get(idx).to_string()),
        })
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Source;
    use crate::table::read_table;

    const FULL_HEADER: &str =
        "Versorger;Tarif;Tarif-ID;Starte;Typ;Verbrauch von;Verbrauch bis;Provision in Euro;Sonderprovision";

    fn table(source: Source, csv: &str) -> RawTable {
        read_table(source, csv.as_bytes(), b';').unwrap()
    }

    #[test]
    fn normalizes_primary_layout() {
        let csv = format!("{FULL_HEADER}\nX;T1;1;2024-01-01;Strom;0;100;10;5\n");
        let rows = normalize_table(&table(Source::A, &csv), &ColumnAliases::default()).unwrap();
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.provider, "X");
        assert_eq!(r.tariff_id, "1");
        assert_eq!(r.start, "2024-01-01");
        assert_eq!(r.kind, "Strom");
        assert_eq!(r.consumption_to, "100");
        assert_eq!(r.base_commission, "10");
        assert_eq!(r.special_commission.as_deref(), Some("5"));
    }

    #[test]
    fn normalizes_underscore_layout_in_any_order() {
        let csv = "Provision;Typ;Tarif_ID;Extra;Versorger;Tarif;Starte;Verbrauch_von;Verbrauch_bis\n\
                   12;Gas;7;ignored;Y;T2;01.02.2024;;500\n";
        let rows = normalize_table(&table(Source::B, csv), &ColumnAliases::default()).unwrap();
        let r = &rows[0];
        assert_eq!(r.source, Source::B);
        assert_eq!(r.provider, "Y");
        assert_eq!(r.tariff_id, "7");
        assert_eq!(r.base_commission, "12");
        assert_eq!(r.consumption_from, "");
        assert_eq!(r.special_commission, None);
    }

    #[test]
    fn missing_columns_all_reported() {
        let csv = "Versorger;Tarif;Tarif-ID;Starte;Verbrauch von\nX;T;1;2024;0\n";
        let err = normalize_table(&table(Source::B, csv), &ColumnAliases::default()).unwrap_err();
        match err {
            ReconError::Schema { source, missing } => {
                assert_eq!(source, Source::B);
                assert_eq!(missing, vec!["Typ", "Verbrauch bis", "Provision in Euro"]);
            }
            other => panic!("expected schema error, got {other}"),
        }
    }

    #[test]
    fn first_alias_wins() {
        let csv = "Versorger;Tarif;Tarif_ID;Tarif-ID;Starte;Typ;Verbrauch von;Verbrauch bis;Provision in Euro\n\
                   X;T;underscore;dash;2024;Strom;0;1;1\n";
        let rows = normalize_table(&table(Source::A, csv), &ColumnAliases::default()).unwrap();
        assert_eq!(rows[0].tariff_id, "dash");
    }

    #[test]
    fn header_only_table_has_no_rows() {
        let rows = normalize_table(&table(Source::A, FULL_HEADER), &ColumnAliases::default()).unwrap();
        assert!(rows.is_empty());
    }
}
