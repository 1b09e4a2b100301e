//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into [`crate::NotificationService`]. Assembly never reads files or environment
//! variables; the vocabulary table is loaded here and shared read-only afterwards.

use crate::form::{Gender, Interpretation};
use crate::{NotificationError, NotificationResult};
use fhir::vocabulary::{EncounterClass, NotificationType, SectionKind};
use fhir::{VocabularyResolver, VocabularyTable};
use std::path::PathBuf;
use std::sync::Arc;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    vocabulary: Arc<VocabularyTable>,
}

impl CoreConfig {
    /// Create a new `CoreConfig` around a loaded vocabulary table.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::VocabularyTable`] if the table lacks an entry for any
    /// enumerated value the forms or records use.
    pub fn new(vocabulary: VocabularyTable) -> NotificationResult<Self> {
        vocabulary
            .ensure_mapped::<Gender>()
            .and_then(|_| vocabulary.ensure_mapped::<Interpretation>())
            .and_then(|_| vocabulary.ensure_mapped::<EncounterClass>())
            .and_then(|_| vocabulary.ensure_mapped::<NotificationType>())
            .and_then(|_| vocabulary.ensure_mapped::<SectionKind>())
            .map_err(NotificationError::VocabularyTable)?;

        Ok(Self {
            vocabulary: Arc::new(vocabulary),
        })
    }

    /// Configuration using the vocabulary table shipped with the `fhir` crate.
    pub fn builtin() -> NotificationResult<Self> {
        Self::new(resolve_vocabulary_table(None)?)
    }

    pub fn vocabulary_table(&self) -> &VocabularyTable {
        &self.vocabulary
    }

    /// A resolver sharing this configuration's table.
    pub fn resolver(&self) -> VocabularyResolver {
        VocabularyResolver::new(Arc::clone(&self.vocabulary))
    }
}

/// Load the vocabulary table without reading environment variables.
///
/// If `override_path` is provided the table is read from that YAML file; otherwise the built-in
/// table is used.
pub fn resolve_vocabulary_table(
    override_path: Option<PathBuf>,
) -> NotificationResult<VocabularyTable> {
    let table = match override_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading vocabulary table override");
            VocabularyTable::from_path(&path)
        }
        None => VocabularyTable::builtin(),
    };
    table.map_err(NotificationError::VocabularyTable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhir::vocabulary::{Category, VocabularyError};
    use std::io::Write;

    const BUILTIN: &str = include_str!("../../fhir/src/vocabulary/default.yaml");

    #[test]
    fn builtin_config_maps_every_enumerated_value() {
        let cfg = CoreConfig::builtin().expect("builtin config");
        assert!(cfg.vocabulary_table().entry_count(Category::Gender) >= 4);
    }

    #[test]
    fn override_path_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let yaml = BUILTIN.replace("display: Germany", "display: Deutschland");
        file.write_all(yaml.as_bytes()).expect("write table");

        let table = resolve_vocabulary_table(Some(file.path().to_path_buf()))
            .expect("table");
        let cfg = CoreConfig::new(table).expect("config");
        let coding = cfg
            .resolver()
            .resolve(Category::GeographicRegion, "DE")
            .expect("DE");
        assert_eq!(coding.display(), Some("Deutschland"));
    }

    #[test]
    fn missing_override_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = resolve_vocabulary_table(Some(dir.path().join("missing.yaml")))
            .expect_err("missing file");
        assert!(matches!(
            err,
            NotificationError::VocabularyTable(VocabularyError::Io(_))
        ));
    }

    #[test]
    fn rejects_tables_missing_enumerated_values() {
        let yaml = BUILTIN.replace("      - { key: diverse, code: other, display: Other }\n", "");
        let table = VocabularyTable::parse_yaml(&yaml).expect("table still parses");
        let err = CoreConfig::new(table).expect_err("gender unmapped");
        match err {
            NotificationError::VocabularyTable(VocabularyError::Unmapped { category, key }) => {
                assert_eq!(category, Category::Gender);
                assert_eq!(key, "diverse");
            }
            other => panic!("expected Unmapped, got {other:?}"),
        }
    }
}
