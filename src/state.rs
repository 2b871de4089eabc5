//! Holder for the dataset of the current session.
//!
//! A re-upload swaps the whole `Arc`; readers keep the snapshot they took.
use crate::types::ParsedDataset;
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
pub struct DatasetHandle {
    current: RwLock<Option<Arc<ParsedDataset>>>,
}

impl DatasetHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// The dataset loaded at the time of the call, if any.
    pub fn snapshot(&self) -> Option<Arc<ParsedDataset>> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Install `dataset`, returning the one it replaces.
    pub fn replace(&self, dataset: ParsedDataset) -> Option<Arc<ParsedDataset>> {
        let next = Some(Arc::new(dataset));
        match self.current.write() {
            Ok(mut guard) => std::mem::replace(&mut *guard, next),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), next),
        }
    }

    pub fn clear(&self) -> Option<Arc<ParsedDataset>> {
        match self.current.write() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DatasetMetadata;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn dataset(source: &str) -> ParsedDataset {
        ParsedDataset {
            neighborhoods: BTreeMap::new(),
            scenario_columns: Vec::new(),
            metadata: DatasetMetadata {
                source: source.to_string(),
                neighborhood_count: 0,
                scenario_column_count: 0,
                parsed_at: Utc::now(),
            },
        }
    }

    #[test]
    fn snapshots_survive_replacement() {
        let handle = DatasetHandle::new();
        assert!(!handle.is_loaded());
        handle.replace(dataset("eerste.zip"));
        let old = handle.snapshot().unwrap();
        let previous = handle.replace(dataset("tweede.zip")).unwrap();
        assert!(Arc::ptr_eq(&old, &previous));
        assert_eq!(old.metadata.source, "eerste.zip");
        assert_eq!(handle.snapshot().unwrap().metadata.source, "tweede.zip");
        assert!(handle.clear().is_some());
        assert!(!handle.is_loaded());
    }
}
