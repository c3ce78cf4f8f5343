// XLSX export: the same report as a single worksheet.
//
// Presentation snapshot, not a round-trip format. Amounts are written as
// numbers with a two-decimal format so spreadsheets can keep calculating.

use provcmp_recon::report::{CellValue, Report};
use provcmp_recon::{ReconError, TableRenderer};
use rust_xlsxwriter::{
    Color, DocProperties, ExcelDateTime, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError,
};

const SHEET_NAME: &str = "Comparison";
const HIGHLIGHT: u32 = 0xFFFF00;
/// Excel paper size code for A4.
const PAPER_A4: u8 = 9;
const COLUMN_WIDTH: f64 = 16.0;

#[derive(Debug, Clone, Default)]
pub struct XlsxRenderer;

impl TableRenderer for XlsxRenderer {
    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn content_type(&self) -> &'static str {
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    }

    fn render(&self, report: &Report) -> Result<Vec<u8>, ReconError> {
        build_workbook(report).map_err(|e| ReconError::Render(format!("Failed to write XLSX: {}", e)))
    }
}

/// Cell formats for one workbook.
struct Formats {
    title: Format,
    header: Format,
    text: Format,
    number: Format,
    text_marked: Format,
    number_marked: Format,
}

impl Formats {
    fn new() -> Self {
        let cell = Format::new().set_border(FormatBorder::Thin);
        let number = cell.clone().set_num_format("0.00").set_align(FormatAlign::Right);
        let marked = |f: &Format| f.clone().set_background_color(Color::RGB(HIGHLIGHT));
        Self {
            title: Format::new().set_bold().set_font_size(14).set_align(FormatAlign::Center),
            header: cell.clone().set_bold().set_align(FormatAlign::Center),
            text_marked: marked(&cell),
            number_marked: marked(&number),
            text: cell,
            number,
        }
    }
}

fn build_workbook(report: &Report) -> Result<Vec<u8>, XlsxError> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();
    // Fixed creation time: otherwise docProps/core.xml carries the wall clock
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    workbook.set_properties(
        &DocProperties::new()
            .set_title(report.title.as_str())
            .set_creation_datetime(&created),
    );
    let worksheet = workbook.add_worksheet().set_name(SHEET_NAME)?;

    worksheet.set_landscape();
    worksheet.set_paper_size(PAPER_A4);

    let last_col = report.columns.len().saturating_sub(1) as u16;
    if last_col > 0 {
        worksheet.merge_range(0, 0, 0, last_col, &report.title, &formats.title)?;
    } else {
        worksheet.write_string_with_format(0, 0, &report.title, &formats.title)?;
    }

    for (col, column) in report.columns.iter().enumerate() {
        let col = col as u16;
        worksheet.set_column_width(col, COLUMN_WIDTH)?;
        worksheet.write_string_with_format(1, col, column.label(), &formats.header)?;
    }
    // Header repeats on every printed page
    worksheet.set_repeat_rows(1, 1)?;

    for (idx, row) in report.rows.iter().enumerate() {
        let row_num = (idx + 2) as u32;
        for (col, column) in report.columns.iter().enumerate() {
            let col = col as u16;
            let Some(cell) = row.cell(*column) else {
                worksheet.write_blank(row_num, col, &formats.text)?;
                continue;
            };
            write_cell(worksheet, row_num, col, &cell.value, cell.highlight, &formats)?;
        }
    }

    workbook.save_to_buffer()
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    highlight: bool,
    formats: &Formats,
) -> Result<(), XlsxError> {
    let (text_fmt, number_fmt) = if highlight {
        (&formats.text_marked, &formats.number_marked)
    } else {
        (&formats.text, &formats.number)
    };
    match value {
        CellValue::Text(s) => {
            worksheet.write_string_with_format(row, col, s, text_fmt)?;
        }
        CellValue::Amount(v) => {
            worksheet.write_number_with_format(row, col, *v, number_fmt)?;
        }
        // Quantities keep their natural precision
        CellValue::Quantity(v) => {
            worksheet.write_number_with_format(row, col, *v, text_fmt)?;
        }
        CellValue::Empty => {
            worksheet.write_blank(row, col, text_fmt)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx};
    use provcmp_recon::config::ReconConfig;
    use std::io::Cursor;

    const HEADER: &str = "Versorger;Tarif;Tarif-ID;Starte;Typ;Verbrauch von;Verbrauch bis;Provision in Euro";

    fn engine_report() -> Report {
        let a = format!("{HEADER}\nGaswerk Süd;T1;1;2024-01-01;Gas;0;2000,5;15\nY;T2;2;2024-01-01;Strom;;;5\n");
        let b = format!("{HEADER}\nGaswerk Süd;T1;1;2024-01-01;Gas;0;2000,5;12,5\nY;T2;2;2024-01-01;Strom;;;7\n");
        provcmp_recon::run(&ReconConfig::default(), a.as_bytes(), b.as_bytes()).unwrap().report
    }

    fn read_back(bytes: Vec<u8>) -> calamine::Range<Data> {
        let mut xlsx: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).unwrap();
        xlsx.worksheet_range(SHEET_NAME).unwrap()
    }

    #[test]
    fn writes_title_header_and_rows() {
        let bytes = XlsxRenderer.render(&engine_report()).unwrap();
        // XLSX is a ZIP container
        assert!(bytes.starts_with(b"PK"));

        let range = read_back(bytes);
        assert_eq!(
            range.get_value((0, 0)),
            Some(&Data::String("Commission comparison A vs. B".to_string()))
        );
        assert_eq!(range.get_value((1, 0)), Some(&Data::String("Provider".to_string())));
        assert_eq!(range.get_value((1, 9)), Some(&Data::String("Result".to_string())));
        assert_eq!(range.get_value((2, 0)), Some(&Data::String("Gaswerk Süd".to_string())));
        assert_eq!(range.get_value((2, 6)), Some(&Data::Float(2000.5)));
        assert_eq!(range.get_value((2, 7)), Some(&Data::Float(15.0)));
        assert_eq!(range.get_value((2, 8)), Some(&Data::Float(12.5)));
        assert_eq!(range.get_value((3, 9)), Some(&Data::Float(7.0)));
    }

    #[test]
    fn equal_reports_give_equal_bytes() {
        let report = engine_report();
        let first = XlsxRenderer.render(&report).unwrap();
        // core.xml timestamps have one-second resolution
        std::thread::sleep(std::time::Duration::from_millis(1100));
        let second = XlsxRenderer.render(&report).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_report_keeps_header() {
        let mut report = engine_report();
        report.rows.clear();
        let range = read_back(XlsxRenderer.render(&report).unwrap());
        assert_eq!(range.get_value((1, 4)), Some(&Data::String("Type".to_string())));
        assert_eq!(range.end().map(|(row, _)| row), Some(1));
    }
}
