use crate::archive::FileRole;
use std::fmt;

pub type Result<T> = std::result::Result<T, PblError>;

/// Fatal ingestion failures. Field-level anomalies never surface here.
#[derive(Debug, thiserror::Error)]
pub enum PblError {
    #[error("incompatible or incomplete archive {archive}: missing {}", RoleList(.missing))]
    MissingFiles {
        archive: String,
        missing: Vec<FileRole>,
    },

    #[error("archive {archive} contained no data")]
    NoUsableData { archive: String },

    #[error("archive {archive} is not a readable ZIP file")]
    Archive {
        archive: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to read {role} table in {archive}")]
    Csv {
        archive: String,
        role: FileRole,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl PblError {
    /// `true` for errors that mean the archive itself is unusable.
    pub fn is_fatal_ingestion(&self) -> bool {
        matches!(
            self,
            PblError::MissingFiles { .. }
                | PblError::NoUsableData { .. }
                | PblError::Archive { .. }
                | PblError::Csv { .. }
        )
    }
}

struct RoleList<'a>(&'a [FileRole]);

impl fmt::Display for RoleList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, role) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", role)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_message_lists_roles() {
        let err = PblError::MissingFiles {
            archive: "Utrecht.zip".to_string(),
            missing: vec![FileRole::Strategy, FileRole::Detail],
        };
        assert_eq!(
            err.to_string(),
            "incompatible or incomplete archive Utrecht.zip: missing strategie, bebouwing"
        );
        assert!(err.is_fatal_ingestion());
    }

    #[test]
    fn csv_error_names_archive_and_role() {
        let err = PblError::Csv {
            archive: "Utrecht.zip".to_string(),
            role: FileRole::Totals,
            source: csv::Error::from(std::io::Error::new(std::io::ErrorKind::InvalidData, "bad header")),
        };
        assert_eq!(err.to_string(), "failed to read totaalbebouwing table in Utrecht.zip");
        assert!(err.is_fatal_ingestion());
    }
}
