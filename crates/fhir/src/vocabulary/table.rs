//! YAML-backed vocabulary table.

use super::{Category, VocabularyError, VocabularyKey};
use crate::Coding;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

const BUILTIN_TABLE: &str = include_str!("default.yaml");

/// Immutable lookup table, one [`CategoryTable`] per [`Category`].
#[derive(Clone, Debug)]
pub struct VocabularyTable {
    categories: HashMap<Category, CategoryTable>,
}

/// Entries of one category.
#[derive(Clone, Debug)]
pub(crate) struct CategoryTable {
    system: String,
    primary: HashMap<String, Coding>,
    special: HashMap<String, Coding>,
}

impl CategoryTable {
    pub(crate) fn system(&self) -> &str {
        &self.system
    }

    pub(crate) fn primary(&self, key: &str) -> Option<&Coding> {
        self.primary.get(key)
    }

    pub(crate) fn special(&self, key: &str) -> Option<&Coding> {
        self.special.get(key)
    }
}

impl VocabularyTable {
    /// Parses the table shipped with this crate.
    pub fn builtin() -> Result<Self, VocabularyError> {
        Self::parse_yaml(BUILTIN_TABLE)
    }

    /// Reads and parses a table from a YAML file.
    pub fn from_path(path: &Path) -> Result<Self, VocabularyError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse_yaml(&text)
    }

    /// Parses a table from YAML text.
    ///
    /// This uses `serde_path_to_error` so a schema mismatch reports the failing path (e.g.
    /// `categories.disease.entries[3].display`).
    ///
    /// # Errors
    ///
    /// Returns [`VocabularyError`] if:
    /// - the YAML does not match the table schema or has unknown keys,
    /// - a category name is unknown or a known category is missing,
    /// - a category declares a blank system or the same key twice.
    pub fn parse_yaml(yaml_text: &str) -> Result<Self, VocabularyError> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, TableWire>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>".to_string()
                } else {
                    path
                };
                return Err(VocabularyError::Schema {
                    path,
                    message: source.to_string(),
                });
            }
        };

        wire_to_domain(wire)
    }

    pub(crate) fn category(&self, category: Category) -> &CategoryTable {
        // Construction guarantees every category is present.
        &self.categories[&category]
    }

    /// Checks that every value of `K` has an entry.
    ///
    /// # Errors
    ///
    /// Returns [`VocabularyError::Unmapped`] for the first value without an entry.
    pub fn ensure_mapped<K: VocabularyKey>(&self) -> Result<(), VocabularyError> {
        let entries = self.category(K::CATEGORY);
        for value in K::variants() {
            if entries.primary(value.key()).is_none() {
                return Err(VocabularyError::Unmapped {
                    category: K::CATEGORY,
                    key: value.key().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Number of primary entries in `category`.
    pub fn entry_count(&self, category: Category) -> usize {
        self.category(category).primary.len()
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableWire {
    categories: BTreeMap<String, CategoryWire>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CategoryWire {
    system: String,
    #[serde(default)]
    entries: Vec<EntryWire>,
    #[serde(default)]
    special: Vec<SpecialWire>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntryWire {
    code: String,
    display: String,
    #[serde(default)]
    key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpecialWire {
    system: String,
    code: String,
    display: String,
    #[serde(default)]
    key: Option<String>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(wire: TableWire) -> Result<VocabularyTable, VocabularyError> {
    let mut categories = HashMap::with_capacity(wire.categories.len());

    for (name, category_wire) in wire.categories {
        let category = Category::from_table_name(&name).ok_or_else(|| {
            VocabularyError::InvalidTable(format!("unknown vocabulary category '{name}'"))
        })?;

        if category_wire.system.trim().is_empty() {
            return Err(VocabularyError::InvalidTable(format!(
                "category '{name}' has a blank system"
            )));
        }

        let mut primary = HashMap::with_capacity(category_wire.entries.len());
        for entry in category_wire.entries {
            let key = entry.key.unwrap_or_else(|| entry.code.clone());
            let coding = Coding::new(&category_wire.system, entry.code, Some(entry.display));
            if primary.insert(key.clone(), coding).is_some() {
                return Err(VocabularyError::InvalidTable(format!(
                    "category '{name}' declares key '{key}' twice"
                )));
            }
        }

        let mut special = HashMap::with_capacity(category_wire.special.len());
        for entry in category_wire.special {
            let key = entry.key.unwrap_or_else(|| entry.code.clone());
            let coding = Coding::new(entry.system, entry.code, Some(entry.display));
            if special.insert(key.clone(), coding).is_some() {
                return Err(VocabularyError::InvalidTable(format!(
                    "category '{name}' declares special key '{key}' twice"
                )));
            }
        }

        categories.insert(
            category,
            CategoryTable {
                system: category_wire.system,
                primary,
                special,
            },
        );
    }

    if let Some(missing) = Category::ALL
        .into_iter()
        .find(|c| !categories.contains_key(c))
    {
        return Err(VocabularyError::InvalidTable(format!(
            "missing vocabulary category '{}'",
            missing.table_name()
        )));
    }

    Ok(VocabularyTable { categories })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_table_with(extra: &str) -> String {
        let mut yaml = String::from("categories:\n");
        for category in Category::ALL {
            yaml.push_str(&format!(
                "  {}:\n    system: urn:test:{}\n",
                category.table_name(),
                category.table_name()
            ));
        }
        yaml.push_str(extra);
        yaml
    }

    #[test]
    fn builtin_table_parses() {
        let table = VocabularyTable::builtin().expect("builtin table");
        assert!(table.entry_count(Category::GeographicRegion) > 0);
        assert!(table.entry_count(Category::Vaccine) > 0);
    }

    #[test]
    fn accepts_categories_without_entries() {
        let table = VocabularyTable::parse_yaml(&minimal_table_with("")).expect("minimal");
        assert_eq!(table.entry_count(Category::Disease), 0);
    }

    #[test]
    fn rejects_unknown_category() {
        let yaml = minimal_table_with("  blood_type:\n    system: urn:test:blood\n");
        let err = VocabularyTable::parse_yaml(&yaml).expect_err("unknown category");
        match err {
            VocabularyError::InvalidTable(msg) => assert!(msg.contains("blood_type")),
            other => panic!("expected InvalidTable, got {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_category() {
        let yaml = "categories:\n  disease:\n    system: urn:test:disease\n";
        let err = VocabularyTable::parse_yaml(yaml).expect_err("missing categories");
        match err {
            VocabularyError::InvalidTable(msg) => assert!(msg.contains("missing")),
            other => panic!("expected InvalidTable, got {other:?}"),
        }
    }

    #[test]
    fn schema_errors_report_the_path() {
        let yaml = concat!(
            "categories:\n",
            "  disease:\n",
            "    system: urn:test:disease\n",
            "    entries:\n",
            "      - code: msld\n",
        );
        let err = VocabularyTable::parse_yaml(yaml).expect_err("missing display");
        match err {
            VocabularyError::Schema { path, message } => {
                assert!(path.contains("disease"), "path was {path}");
                assert!(message.contains("display"), "message was {message}");
            }
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_keys() {
        let yaml = "categories:\n  disease:\n    system: urn:test:disease\n    colour: red\n";
        let err = VocabularyTable::parse_yaml(yaml).expect_err("unknown key");
        match err {
            VocabularyError::Schema { message, .. } => assert!(message.contains("colour")),
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_keys() {
        let duplicated = concat!(
            "  disease:\n",
            "    system: urn:test:disease\n",
            "    entries:\n",
            "      - { code: a, display: A, key: same }\n",
            "      - { code: b, display: B, key: same }\n",
        );
        let yaml = minimal_table_with("")
            .replace("  disease:\n    system: urn:test:disease\n", duplicated);
        let err = VocabularyTable::parse_yaml(&yaml).expect_err("duplicate key");
        match err {
            VocabularyError::InvalidTable(msg) => assert!(msg.contains("same")),
            other => panic!("expected InvalidTable, got {other:?}"),
        }
    }

    #[test]
    fn rejects_blank_system() {
        let yaml = minimal_table_with("").replace("system: urn:test:disease", "system: '  '");
        let err = VocabularyTable::parse_yaml(&yaml).expect_err("blank system");
        assert!(matches!(err, VocabularyError::InvalidTable(msg) if msg.contains("blank system")));
    }
}
