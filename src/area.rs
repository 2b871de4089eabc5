//! CBS area codes (`GM0363`, `WK036301`, `BU03630105`).
//!
//! Nesting is by digit prefix: a district's digits start with its
//! municipality's digits, a neighborhood's with its district's.
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AreaKind {
    Municipality,
    District,
    Neighborhood,
}

impl AreaKind {
    fn prefix(self) -> &'static str {
        match self {
            AreaKind::Municipality => "GM",
            AreaKind::District => "WK",
            AreaKind::Neighborhood => "BU",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AreaCode {
    pub kind: AreaKind,
    pub digits: String,
}

impl AreaCode {
    pub fn parse(code: &str) -> Option<AreaCode> {
        let code = code.trim();
        if code.len() < 3 || !code.is_char_boundary(2) {
            return None;
        }
        let (prefix, digits) = code.split_at(2);
        let kind = match prefix.to_ascii_uppercase().as_str() {
            "GM" => AreaKind::Municipality,
            "WK" => AreaKind::District,
            "BU" => AreaKind::Neighborhood,
            _ => return None,
        };
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Some(AreaCode {
            kind,
            digits: digits.to_string(),
        })
    }

    /// `true` if `other` lies inside this area. An area contains itself.
    pub fn contains(&self, other: &AreaCode) -> bool {
        self.kind <= other.kind && other.digits.starts_with(&self.digits)
    }
}

impl fmt::Display for AreaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.digits)
    }
}

/// Codes of `codes` that fall inside `area`. Unparseable codes are skipped.
pub fn codes_within<'a, I>(area: &AreaCode, codes: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    codes
        .into_iter()
        .filter(|code| AreaCode::parse(code).is_some_and(|c| area.contains(&c)))
        .collect()
}
