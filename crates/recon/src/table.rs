use crate::error::ReconError;
use crate::model::Source;

/// A delimited table as read from an upload: header row plus data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub source: Source,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// One data row, cells aligned to the header. Missing trailing cells are empty.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based data row number (header excluded).
    pub line: usize,
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn get(&self, idx: usize) -> &str {
        self.cells.get(idx).map(String::as_str).unwrap_or("")
    }
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Decode raw upload bytes: UTF-8 first, Windows-1252 otherwise (Excel exports).
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Parse a delimited table with a header row.
pub fn read_table(source: Source, bytes: &[u8], delimiter: u8) -> Result<RawTable, ReconError> {
    let text = decode_text(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconError::Parse { source, message: e.to_string() })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(ReconError::Parse {
            source,
            message: "no header row".into(),
        });
    }

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let line = i + 1;
        let record = record.map_err(|e| ReconError::Parse { source, message: e.to_string() })?;

        if record.len() > headers.len() && record.iter().skip(headers.len()).any(|c| !c.trim().is_empty()) {
            return Err(ReconError::Parse {
                source,
                message: format!(
                    "row {line}: expected {} fields, saw {}",
                    headers.len(),
                    record.len()
                ),
            });
        }

        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        let mut cells: Vec<String> = record.iter().take(headers.len()).map(|c| c.to_string()).collect();
        cells.resize(headers.len(), String::new());
        rows.push(RawRow { line, cells });
    }

    log::debug!("table {source}: read {} columns, {} rows", headers.len(), rows.len());

    Ok(RawTable { source, headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_semicolon_table() {
        let csv = "Versorger;Tarif\nX;T1\nY;T2\n";
        let table = read_table(Source::A, csv.as_bytes(), b';').unwrap();
        assert_eq!(table.headers, vec!["Versorger", "Tarif"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].get(0), "Y");
        assert_eq!(table.rows[1].line, 2);
    }

    #[test]
    fn strips_bom_and_trims_headers() {
        let csv = "\u{feff}Versorger ; Tarif\nX;T1\n";
        let table = read_table(Source::A, csv.as_bytes(), b';').unwrap();
        assert_eq!(table.headers, vec!["Versorger", "Tarif"]);
    }

    #[test]
    fn windows_1252_fallback() {
        // "Müller" in Windows-1252
        let bytes = b"Versorger;Tarif\nM\xFCller;T1\n";
        let table = read_table(Source::B, bytes, b';').unwrap();
        assert_eq!(table.rows[0].get(0), "Müller");
    }

    #[test]
    fn short_rows_are_padded() {
        let csv = "a;b;c\n1\n";
        let table = read_table(Source::A, csv.as_bytes(), b';').unwrap();
        assert_eq!(table.rows[0].cells, vec!["1", "", ""]);
    }

    #[test]
    fn trailing_empty_fields_allowed() {
        let csv = "a;b\n1;2;\n";
        let table = read_table(Source::A, csv.as_bytes(), b';').unwrap();
        assert_eq!(table.rows[0].cells, vec!["1", "2"]);
    }

    #[test]
    fn surplus_fields_are_parse_error() {
        let csv = "a;b\n1;2;3\n";
        let err = read_table(Source::A, csv.as_bytes(), b';').unwrap_err();
        assert!(matches!(err, ReconError::Parse { source: Source::A, .. }));
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn blank_rows_skipped() {
        let csv = "a;b\n1;2\n;\n3;4\n";
        let table = read_table(Source::A, csv.as_bytes(), b';').unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].line, 3);
    }

    #[test]
    fn empty_input_is_parse_error() {
        let err = read_table(Source::B, b"", b';').unwrap_err();
        assert!(matches!(err, ReconError::Parse { source: Source::B, .. }));
    }
}
