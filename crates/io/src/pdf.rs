// PDF export: landscape A4 table with repeated title and header rows.
//
// Hand-assembled PDF 1.4 with the two standard Type1 fonts (Helvetica,
// Helvetica-Bold) in WinAnsiEncoding. No embedded fonts, no compression,
// no timestamps: equal reports produce equal bytes.

use std::io::Write;

use encoding_rs::WINDOWS_1252;
use provcmp_recon::report::{Report, ReportRow};
use provcmp_recon::{ReconError, TableRenderer};

const MM: f64 = 72.0 / 25.4;

/// Page geometry and type sizes, in points.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub title_height: f64,
    pub title_font_size: f64,
    pub row_height: f64,
    pub font_size: f64,
    pub cell_padding: f64,
}

impl Default for PageLayout {
    /// A4 landscape, 10 mm margins, 10 mm title row, 6 mm table rows.
    fn default() -> Self {
        Self {
            width: 841.89,
            height: 595.28,
            margin: 10.0 * MM,
            title_height: 10.0 * MM,
            title_font_size: 10.0,
            row_height: 6.0 * MM,
            font_size: 6.0,
            cell_padding: 1.5,
        }
    }
}

impl PageLayout {
    fn usable_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    fn column_width(&self, columns: usize) -> f64 {
        self.usable_width() / columns.max(1) as f64
    }

    /// Data rows that fit below the title and header on one page (at least one).
    pub fn rows_per_page(&self) -> usize {
        let available = self.height - 2.0 * self.margin - self.title_height - self.row_height;
        ((available / self.row_height).floor() as usize).max(1)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    pub layout: PageLayout,
}

impl TableRenderer for PdfRenderer {
    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn render(&self, report: &Report) -> Result<Vec<u8>, ReconError> {
        let pages = paginate(&report.rows, self.layout.rows_per_page());
        let streams: Vec<Vec<u8>> = pages
            .iter()
            .map(|rows| page_content(&self.layout, report, rows))
            .collect();
        log::debug!("pdf: {} rows on {} page(s)", report.rows.len(), streams.len());
        assemble(&self.layout, &report.title, &streams).map_err(|e| ReconError::Render(e.to_string()))
    }
}

/// Split rows into page-sized chunks. An empty report still gets one page.
fn paginate(rows: &[ReportRow], per_page: usize) -> Vec<&[ReportRow]> {
    if rows.is_empty() {
        return vec![&rows[..0]];
    }
    rows.chunks(per_page).collect()
}

// ============================================================================
// Page content
// ============================================================================

#[derive(Clone, Copy, PartialEq)]
enum Align {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

struct ContentBuilder<'a> {
    layout: &'a PageLayout,
    out: Vec<u8>,
}

impl<'a> ContentBuilder<'a> {
    fn new(layout: &'a PageLayout) -> Self {
        let mut out = Vec::new();
        out.extend_from_slice(b"0.5 w\n0 0 0 RG\n");
        Self { layout, out }
    }

    fn op(&mut self, line: String) {
        self.out.extend_from_slice(line.as_bytes());
        self.out.push(b'\n');
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.op(format!("q 1 1 0 rg {} {} {} {} re f Q", num(x), num(y), num(w), num(h)));
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.op(format!("{} {} {} {} re S", num(x), num(y), num(w), num(h)));
    }

    /// Text inside the box (x, y, w, h), vertically centred, truncated to fit.
    fn text(&mut self, text: &str, x: f64, y: f64, w: f64, h: f64, font: Font, size: f64, align: Align) {
        if text.is_empty() {
            return;
        }
        let pad = self.layout.cell_padding;
        let encoded = fit_text(&encode_win_ansi(text), w - 2.0 * pad, size, font);
        let text_w = text_width(&encoded, size, font);
        let tx = match align {
            Align::Left => x + pad,
            Align::Center => x + (w - text_w) / 2.0,
            Align::Right => x + w - pad - text_w,
        };
        // Cap height of Helvetica is ~0.72 em
        let ty = y + (h - size * 0.72) / 2.0;

        let mut line = format!("BT /{} {} Tf {} {} Td (", font.resource(), num(size), num(tx), num(ty)).into_bytes();
        line.extend_from_slice(&escape_pdf_string(&encoded));
        line.extend_from_slice(b") Tj ET\n");
        self.out.extend_from_slice(&line);
    }
}

fn page_content(layout: &PageLayout, report: &Report, rows: &[ReportRow]) -> Vec<u8> {
    let mut b = ContentBuilder::new(layout);
    let left = layout.margin;
    let col_w = layout.column_width(report.columns.len());
    let mut top = layout.height - layout.margin;

    // Title
    top -= layout.title_height;
    b.text(
        &report.title,
        left,
        top,
        layout.usable_width(),
        layout.title_height,
        Font::Bold,
        layout.title_font_size,
        Align::Center,
    );

    // Header
    top -= layout.row_height;
    for (i, column) in report.columns.iter().enumerate() {
        let x = left + i as f64 * col_w;
        b.stroke_rect(x, top, col_w, layout.row_height);
        b.text(column.label(), x, top, col_w, layout.row_height, Font::Bold, layout.font_size, Align::Center);
    }

    // Data
    for row in rows {
        top -= layout.row_height;
        for (i, column) in report.columns.iter().enumerate() {
            let x = left + i as f64 * col_w;
            let cell = row.cell(*column);
            if cell.is_some_and(|c| c.highlight) {
                b.fill_rect(x, top, col_w, layout.row_height);
            }
            b.stroke_rect(x, top, col_w, layout.row_height);
            if let Some(cell) = cell {
                let align = if column.is_numeric() { Align::Right } else { Align::Left };
                b.text(&cell.value.to_string(), x, top, col_w, layout.row_height, Font::Regular, layout.font_size, align);
            }
        }
    }

    b.out
}

// ============================================================================
// Text encoding and metrics
// ============================================================================

/// Encode to WinAnsi; characters outside Windows-1252 become '?'.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        let (bytes, _, unmappable) = WINDOWS_1252.encode(ch.encode_utf8(&mut buf));
        if unmappable || ch.is_control() {
            out.push(b'?');
        } else {
            out.extend_from_slice(&bytes);
        }
    }
    out
}

fn escape_pdf_string(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    for &b in bytes {
        if matches!(b, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(b);
    }
    out
}

/// Hex text string in UTF-16BE with a byte order mark, for the Info
/// dictionary. Info strings are PDFDocEncoding or UTF-16, not WinAnsi.
fn pdf_text_string(text: &str) -> String {
    let mut out = String::from("<FEFF");
    for unit in text.encode_utf16() {
        out.push_str(&format!("{unit:04X}"));
    }
    out.push('>');
    out
}

/// Helvetica advance widths for 0x20..=0x7E, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

fn glyph_width(b: u8) -> u16 {
    match b {
        0x20..=0x7E => HELVETICA_WIDTHS[(b - 0x20) as usize],
        _ => 556,
    }
}

/// Approximate rendered width; bold runs about 6% wider than regular.
fn text_width(bytes: &[u8], size: f64, font: Font) -> f64 {
    let units: u32 = bytes.iter().map(|&b| glyph_width(b) as u32).sum();
    let scale = match font {
        Font::Regular => 1.0,
        Font::Bold => 1.06,
    };
    units as f64 * size / 1000.0 * scale
}

/// Truncate with ".." when the text is wider than `max_width`.
fn fit_text(bytes: &[u8], max_width: f64, size: f64, font: Font) -> Vec<u8> {
    if text_width(bytes, size, font) <= max_width {
        return bytes.to_vec();
    }
    let mut cut = bytes.to_vec();
    while !cut.is_empty() {
        cut.pop();
        let mut candidate = cut.clone();
        candidate.extend_from_slice(b"..");
        if text_width(&candidate, size, font) <= max_width {
            return candidate;
        }
    }
    Vec::new()
}

/// Fixed-precision number without trailing zeros.
fn num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

// ============================================================================
// File assembly
// ============================================================================

// Object layout: 1 catalog, 2 page tree, 3-4 fonts, 5 info,
// then a (page, content) pair per page starting at 6.
const CATALOG: usize = 1;
const PAGES: usize = 2;
const FONT_REGULAR: usize = 3;
const FONT_BOLD: usize = 4;
const INFO: usize = 5;
const FIRST_PAGE: usize = 6;

fn page_obj(i: usize) -> usize {
    FIRST_PAGE + 2 * i
}

fn assemble(layout: &PageLayout, title: &str, streams: &[Vec<u8>]) -> std::io::Result<Vec<u8>> {
    let mut objects: Vec<Vec<u8>> = Vec::with_capacity(INFO + 2 * streams.len());

    objects.push(format!("<< /Type /Catalog /Pages {PAGES} 0 R >>").into_bytes());

    let kids: Vec<String> = (0..streams.len()).map(|i| format!("{} 0 R", page_obj(i))).collect();
    objects.push(format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), streams.len()).into_bytes());

    for base in ["Helvetica", "Helvetica-Bold"] {
        objects.push(
            format!("<< /Type /Font /Subtype /Type1 /BaseFont /{base} /Encoding /WinAnsiEncoding >>").into_bytes(),
        );
    }

    objects.push(format!("<< /Producer (provcmp) /Title {} >>", pdf_text_string(title)).into_bytes());

    for (i, content) in streams.iter().enumerate() {
        objects.push(
            format!(
                "<< /Type /Page /Parent {PAGES} 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 {FONT_REGULAR} 0 R /F2 {FONT_BOLD} 0 R >> >> /Contents {} 0 R >>",
                num(layout.width),
                num(layout.height),
                page_obj(i) + 1,
            )
            .into_bytes(),
        );
        let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        stream.extend_from_slice(content);
        stream.extend_from_slice(b"\nendstream");
        objects.push(stream);
    }

    let mut out: Vec<u8> = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (idx, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        write!(out, "{} 0 obj\n", idx + 1)?;
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_at = out.len();
    write!(out, "xref\n0 {}\n", objects.len() + 1)?;
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in &offsets {
        write!(out, "{offset:010} 00000 n \n")?;
    }
    write!(
        out,
        "trailer\n<< /Size {} /Root {CATALOG} 0 R /Info {INFO} 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
        objects.len() + 1,
    )?;
    Ok(out)
}
