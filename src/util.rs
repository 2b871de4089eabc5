// Utility helpers for cell coercion and display formatting.
//
// This module centralizes the "dirty" handling of PBL number formats so the
// rest of the code can work with `CellValue` and plain `f64`.
use crate::types::CellValue;
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use regex::Regex;

/// Digits with `.`/`,` separators, an optional sign and an optional exponent.
static NUMERIC_CELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?[0-9.,]*[0-9][0-9.,]*([eE][+-]?[0-9]+)?$").unwrap());

/// Coerce a raw CSV cell.
///
/// - Empty or whitespace-only cells become `Null`, never zero.
/// - Cells that look like a Dutch-formatted number (`1.234,5`) or a plain
///   one (`12.5`) become `Number`.
/// - Everything else, including numbers that fail to parse after
///   normalization, is kept verbatim as `Text`.
pub fn coerce_cell(raw: &str) -> CellValue {
    let s = raw.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if !NUMERIC_CELL.is_match(s) {
        return CellValue::Text(raw.to_string());
    }
    match normalize_number(s).and_then(|n| n.parse::<f64>().ok()) {
        Some(n) => CellValue::Number(n),
        None => CellValue::Text(raw.to_string()),
    }
}

/// Rewrite a locale-formatted number into Rust's `f64` syntax.
///
/// With a comma present, periods are thousands separators and the single
/// comma is the decimal mark. Without one, several periods are thousands
/// separators and a single period is a decimal mark.
fn normalize_number(s: &str) -> Option<String> {
    let commas = s.matches(',').count();
    let periods = s.matches('.').count();
    match (commas, periods) {
        (0, 0) | (0, 1) => Some(s.to_string()),
        (0, _) => Some(s.replace('.', "")),
        (1, _) => Some(s.replace('.', "").replace(',', ".")),
        _ => None,
    }
}

/// Pick the delimiter of a PBL CSV from its header line.
///
/// Semicolon wins only when it occurs more often than the comma.
pub fn detect_delimiter(text: &str) -> u8 {
    let header = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let commas = header.matches(',').count();
    let semis = header.matches(';').count();
    if semis > commas {
        b';'
    } else {
        b','
    }
}

/// Decode a member file as UTF-8, replacing invalid bytes and dropping a
/// leading byte-order mark.
pub fn decode_text(bytes: &[u8]) -> String {
    let s = String::from_utf8_lossy(bytes);
    s.strip_prefix('\u{feff}').unwrap_or(&*s).to_string()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Dutch notation: `.` between thousands, `,` before the decimals.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let mut res = match int_part.parse::<u128>() {
        Ok(v) => v.to_formatted_string(&Locale::nl),
        Err(_) => int_part.to_string(),
    };
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push(',');
            res.push_str(frac);
        }
    }
    if neg && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

/// Like [`format_number`] but renders absent values as `-`.
pub fn format_optional(n: Option<f64>, decimals: usize) -> String {
    match n {
        Some(v) if v.is_finite() => format_number(v, decimals),
        _ => "-".to_string(),
    }
}

pub fn format_euro(amount: Option<f64>, compact: bool) -> String {
    let amount = match amount {
        Some(a) if a.is_finite() => a,
        _ => return "€ -".to_string(),
    };
    if compact {
        if amount.abs() >= 1_000_000.0 {
            return format!("€{:.1}M", amount / 1_000_000.0);
        }
        if amount.abs() >= 1_000.0 {
            return format!("€{:.0}k", amount / 1_000.0);
        }
    }
    format!("€{}", format_number(amount, 0))
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::nl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_dutch_numbers() {
        assert_eq!(coerce_cell("1.234,5"), CellValue::Number(1234.5));
        assert_eq!(coerce_cell("12,75"), CellValue::Number(12.75));
        assert_eq!(coerce_cell("-3,5"), CellValue::Number(-3.5));
        assert_eq!(coerce_cell("42"), CellValue::Number(42.0));
        assert_eq!(coerce_cell("0.5"), CellValue::Number(0.5));
        assert_eq!(coerce_cell("1.234.567"), CellValue::Number(1234567.0));
        assert_eq!(coerce_cell("1,5e3"), CellValue::Number(1500.0));
    }

    #[test]
    fn keeps_text_unchanged() {
        assert_eq!(coerce_cell("Amsterdam"), CellValue::Text("Amsterdam".into()));
        assert_eq!(coerce_cell("BU03630000"), CellValue::Text("BU03630000".into()));
        assert_eq!(coerce_cell("1,2,3"), CellValue::Text("1,2,3".into()));
        assert_eq!(coerce_cell("s1a"), CellValue::Text("s1a".into()));
        assert_eq!(coerce_cell("12abc"), CellValue::Text("12abc".into()));
    }

    #[test]
    fn empty_cells_are_null_not_zero() {
        assert_eq!(coerce_cell(""), CellValue::Null);
        assert_eq!(coerce_cell("   "), CellValue::Null);
    }

    #[test]
    fn delimiter_detection() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), b';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), b',');
        assert_eq!(detect_delimiter("\n\na;b\n"), b';');
        assert_eq!(detect_delimiter(""), b',');
    }

    #[test]
    fn decode_strips_bom() {
        assert_eq!(decode_text("\u{feff}a;b".as_bytes()), "a;b");
        assert_eq!(decode_text(b"a;\xffb"), "a;\u{fffd}b");
    }

    #[test]
    fn dutch_formatting() {
        assert_eq!(format_number(1234567.891, 2), "1.234.567,89");
        assert_eq!(format_number(-1500.0, 0), "-1.500");
        assert_eq!(format_number(-0.001, 1), "0,0");
        assert_eq!(format_number(1e20, 0), "100.000.000.000.000.000.000");
        let huge = format_number(-1e300, 0);
        assert!(huge.starts_with("-1000"));
        assert_eq!(huge.len(), 302);
        assert_eq!(format_optional(None, 1), "-");
        assert_eq!(format_optional(Some(f64::NAN), 1), "-");
    }

    #[test]
    fn euro_formatting() {
        assert_eq!(format_euro(Some(2_340_000.0), true), "€2.3M");
        assert_eq!(format_euro(Some(12_400.0), true), "€12k");
        assert_eq!(format_euro(Some(12_400.0), false), "€12.400");
        assert_eq!(format_euro(None, true), "€ -");
    }
}
