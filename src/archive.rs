//! Locates the three PBL member files inside a ZIP archive.
use crate::error::{PblError, Result};
use crate::util::decode_text;
use serde::Serialize;
use std::fmt;
use std::io::{Cursor, Read};

/// Role of a CSV member inside a PBL "Startanalyse" archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FileRole {
    /// `*totaalbebouwing.csv`: one row per neighborhood.
    Totals,
    /// `*strategie.csv`: basis row plus one row per indicator.
    Strategy,
    /// `*bebouwing.csv`: building-stock detail rows.
    Detail,
}

impl FileRole {
    pub const ALL: [FileRole; 3] = [FileRole::Totals, FileRole::Strategy, FileRole::Detail];

    /// Classify a member name. Totals is checked before detail because
    /// "totaalbebouwing" also contains "bebouwing".
    pub fn classify(name: &str) -> Option<FileRole> {
        let lower = name.to_lowercase();
        if !lower.ends_with(".csv") {
            return None;
        }
        if lower.contains("totaalbebouwing") {
            Some(FileRole::Totals)
        } else if lower.contains("strategie") {
            Some(FileRole::Strategy)
        } else if lower.contains("bebouwing") && !lower.contains("totaal") {
            Some(FileRole::Detail)
        } else {
            None
        }
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileRole::Totals => "totaalbebouwing",
            FileRole::Strategy => "strategie",
            FileRole::Detail => "bebouwing",
        };
        f.write_str(s)
    }
}

/// Decoded text of the three member files.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTables {
    pub totals: String,
    pub strategy: String,
    pub detail: String,
}

impl RawTables {
    pub fn get(&self, role: FileRole) -> &str {
        match role {
            FileRole::Totals => &self.totals,
            FileRole::Strategy => &self.strategy,
            FileRole::Detail => &self.detail,
        }
    }
}

/// Read the three PBL tables out of `bytes`.
///
/// `archive` identifies the upload in error messages only.
pub fn extract_tables(bytes: &[u8], archive: &str) -> Result<RawTables> {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|source| PblError::Archive {
        archive: archive.to_string(),
        source,
    })?;

    let mut totals = None;
    let mut strategy = None;
    let mut detail = None;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|source| PblError::Archive {
            archive: archive.to_string(),
            source,
        })?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let Some(role) = FileRole::classify(&name) else {
            log::debug!("skipping archive member {}", name);
            continue;
        };
        let slot = match role {
            FileRole::Totals => &mut totals,
            FileRole::Strategy => &mut strategy,
            FileRole::Detail => &mut detail,
        };
        if slot.is_some() {
            log::warn!("{}: ignoring second {} member {}", archive, role, name);
            continue;
        }
        let mut buf = Vec::new();
        entry.read_to_end(&mut buf)?;
        log::debug!("{}: {} <- {} ({} bytes)", archive, role, name, buf.len());
        *slot = Some(decode_text(&buf));
    }

    match (totals, strategy, detail) {
        (Some(totals), Some(strategy), Some(detail)) => Ok(RawTables {
            totals,
            strategy,
            detail,
        }),
        (t, s, d) => {
            let missing = [
                (FileRole::Totals, t.is_none()),
                (FileRole::Strategy, s.is_none()),
                (FileRole::Detail, d.is_none()),
            ]
            .into_iter()
            .filter_map(|(role, absent)| absent.then_some(role))
            .collect();
            Err(PblError::MissingFiles {
                archive: archive.to_string(),
                missing,
            })
        }
    }
}
