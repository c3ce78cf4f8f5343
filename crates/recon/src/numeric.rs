// Numeric cell coercion for commission and consumption columns.
// Pure functions: text in, number (or the documented default) out.

/// A cell that was expected to hold a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericCell {
    Number(f64),
    Unparseable,
}

impl NumericCell {
    pub fn parse(raw: &str) -> Self {
        match parse_locale_number(raw) {
            Some(v) => Self::Number(v),
            None => Self::Unparseable,
        }
    }

    /// Commission policy: unparseable becomes 0.
    pub fn or_zero(self) -> f64 {
        match self {
            Self::Number(v) => v,
            Self::Unparseable => 0.0,
        }
    }

    /// Consumption policy: unparseable becomes null.
    pub fn or_null(self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(v),
            Self::Unparseable => None,
        }
    }

    pub fn is_unparseable(&self) -> bool {
        matches!(self, Self::Unparseable)
    }
}

/// Parse a number written with either German or English conventions:
/// - Strip `€`, `EUR`, whitespace (incl. NBSP) and `'` group marks
/// - Handle `(12,50)` → `-12.5`
/// - `1.234,56` and `1,234.56`: the last separator is the decimal one
/// - A lone `,` is a decimal comma; a repeated separator is grouping
/// - Returns None for empty, non-numeric or non-finite input
pub fn parse_locale_number(s: &str) -> Option<f64> {
    let mut trimmed = s.trim();
    for affix in ["EUR", "€"] {
        trimmed = trimmed.strip_suffix(affix).unwrap_or(trimmed).trim_end();
        trimmed = trimmed.strip_prefix(affix).unwrap_or(trimmed).trim_start();
    }
    if trimmed.is_empty() {
        return None;
    }

    let (is_negative, inner) = if trimmed.starts_with('(') && trimmed.ends_with(')') && trimmed.len() > 1 {
        (true, &trimmed[1..trimmed.len() - 1])
    } else {
        (false, trimmed)
    };

    let compact: String = inner
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\'' && *c != '\u{a0}' && *c != '\u{202f}')
        .collect();
    if compact.is_empty() {
        return None;
    }

    let cleaned = normalize_separators(&compact);

    for (i, c) in cleaned.chars().enumerate() {
        match c {
            '0'..='9' | '.' | 'e' | 'E' => {}
            '-' | '+' if i == 0 && !is_negative => {}
            // exponent sign
            '-' | '+' if matches!(cleaned[..i].chars().last(), Some('e' | 'E')) => {}
            _ => return None,
        }
    }

    let value: f64 = cleaned.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if is_negative { -value } else { value })
}

/// Rewrite grouping/decimal separators so the result uses a single `.` decimal point.
fn normalize_separators(s: &str) -> String {
    let dots = s.matches('.').count();
    let commas = s.matches(',').count();

    match (dots, commas) {
        (0, 0) => s.to_string(),
        (_, 0) if dots > 1 => s.replace('.', ""),
        (_, 0) => s.to_string(),
        (0, 1) => s.replace(',', "."),
        (0, _) => s.replace(',', ""),
        _ => {
            let last_dot = s.rfind('.').unwrap_or(0);
            let last_comma = s.rfind(',').unwrap_or(0);
            if last_comma > last_dot {
                s.replace('.', "").replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_numbers() {
        assert_eq!(parse_locale_number("10"), Some(10.0));
        assert_eq!(parse_locale_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_locale_number("-3"), Some(-3.0));
        assert_eq!(parse_locale_number("1e3"), Some(1000.0));
    }

    #[test]
    fn german_formatting() {
        assert_eq!(parse_locale_number("12,50"), Some(12.5));
        assert_eq!(parse_locale_number("1.234,56"), Some(1234.56));
        assert_eq!(parse_locale_number("1.234.567"), Some(1234567.0));
        assert_eq!(parse_locale_number("12,50 €"), Some(12.5));
        assert_eq!(parse_locale_number("EUR 7"), Some(7.0));
        assert_eq!(parse_locale_number("1 500"), Some(1500.0));
    }

    #[test]
    fn english_grouping() {
        assert_eq!(parse_locale_number("1,234.56"), Some(1234.56));
        assert_eq!(parse_locale_number("1,234,567"), Some(1234567.0));
        assert_eq!(parse_locale_number("1'000.5"), Some(1000.5));
    }

    #[test]
    fn parenthesized_negative() {
        assert_eq!(parse_locale_number("(12,50)"), Some(-12.5));
        assert_eq!(parse_locale_number("(-1)"), None);
    }

    #[test]
    fn unparseable_inputs() {
        assert_eq!(parse_locale_number(""), None);
        assert_eq!(parse_locale_number("   "), None);
        assert_eq!(parse_locale_number("n/a"), None);
        assert_eq!(parse_locale_number("NaN"), None);
        assert_eq!(parse_locale_number("inf"), None);
        assert_eq!(parse_locale_number("12a"), None);
        assert_eq!(parse_locale_number("€"), None);
        assert_eq!(parse_locale_number("1-2"), None);
    }

    #[test]
    fn coercion_policies() {
        assert_eq!(NumericCell::parse("x").or_zero(), 0.0);
        assert_eq!(NumericCell::parse("x").or_null(), None);
        assert_eq!(NumericCell::parse("4,5").or_zero(), 4.5);
        assert_eq!(NumericCell::parse("4,5").or_null(), Some(4.5));
        assert!(NumericCell::parse("").is_unparseable());
    }
}
