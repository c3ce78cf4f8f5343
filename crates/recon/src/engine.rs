use crate::calculate::{calculate_table, CalculatedTable};
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::evidence::{compute_summary, input_fingerprint};
use crate::matcher::match_records;
use crate::model::{ReconMeta, ReconResult, Source};
use crate::normalize::normalize_table;
use crate::report::build_report;
use crate::table::read_table;

/// Read, normalize and coerce one uploaded table.
pub fn load_table(source: Source, bytes: &[u8], config: &ReconConfig) -> Result<CalculatedTable, ReconError> {
    let raw = read_table(source, bytes, config.delimiter_byte())?;
    let normalized = normalize_table(&raw, &config.columns)?;
    if normalized.is_empty() {
        return Err(ReconError::EmptyInput { source });
    }
    Ok(calculate_table(&normalized))
}

/// Run reconciliation per config over two uploaded tables.
/// All-or-nothing: any error aborts before a report exists.
pub fn run(config: &ReconConfig, table_a: &[u8], table_b: &[u8]) -> Result<ReconResult, ReconError> {
    let a = load_table(Source::A, table_a, config)?;
    let b = load_table(Source::B, table_b, config)?;

    let output = match_records(&a.records, &b.records, config.policy.duplicates, config.policy.ties)?;

    let summary = compute_summary(
        a.records.len(),
        b.records.len(),
        &output,
        a.coerced_cells + b.coerced_cells,
    );

    let report = build_report(&config.title(), &output.matched, config.report.highlight);

    log::info!(
        "{}: {} matched ({} A wins, {} B wins, {} ties) from {} A rows / {} B rows",
        config.name,
        summary.matched,
        summary.a_wins,
        summary.b_wins,
        summary.ties,
        summary.rows_a,
        summary.rows_b,
    );

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            label_a: config.sources.a.label.clone(),
            label_b: config.sources.b.label.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            input_fingerprint: input_fingerprint(table_a, table_b),
        },
        summary,
        matches: output.matched,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Winner;

    const HEADER: &str =
        "Versorger;Tarif;Tarif-ID;Starte;Typ;Verbrauch von;Verbrauch bis;Provision in Euro";

    #[test]
    fn header_only_table_is_empty_input() {
        let a = format!("{HEADER}\nX;T1;1;2024-01-01;Strom;0;100;10\n");
        let err = run(&ReconConfig::default(), a.as_bytes(), HEADER.as_bytes()).unwrap_err();
        assert!(matches!(err, ReconError::EmptyInput { source: Source::B }));
    }

    #[test]
    fn schema_error_before_empty_check() {
        let a = "Versorger;Tarif\n";
        let err = run(&ReconConfig::default(), a.as_bytes(), HEADER.as_bytes()).unwrap_err();
        assert!(matches!(err, ReconError::Schema { source: Source::A, .. }));
    }

    #[test]
    fn custom_delimiter() {
        let config = ReconConfig::from_toml("delimiter = \",\"").unwrap();
        let header = HEADER.replace(';', ",");
        let a = format!("{header}\nX,T1,1,2024-01-01,Strom,0,100,10\n");
        let b = format!("{header}\nX,T1,1,2024-01-01,Strom,0,100,12\n");
        let result = run(&config, a.as_bytes(), b.as_bytes()).unwrap();
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].winner, Winner::B);
        assert_eq!(result.meta.input_fingerprint.len(), 64);
    }
}
