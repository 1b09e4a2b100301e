//! Controlled-vocabulary table and resolver.
//!
//! Every [`Coding`] in an assembled document comes from here. Two mechanisms exist:
//!
//! - the fixed four-state answer mapping ([`VocabularyResolver::resolve_tri_state`]), which
//!   needs no table at all;
//! - category lookups against a [`VocabularyTable`] loaded once at startup.
//!
//! ## Lookup order
//!
//! A key is looked up in the category's primary entries first, then in its *special* entries
//! (for example null-flavor codes accepted as region values). When both miss, the category's
//! [`Strictness`] decides what happens:
//!
//! - [`Strictness::Strict`]: [`VocabularyError::NotFound`], surfaced to the caller as a bad
//!   request.
//! - [`Strictness::Lenient`]: a coding is synthesized from the category system and the raw
//!   key, without display text.
//! - [`Strictness::Enumerated`]: [`VocabularyError::Unmapped`]. These categories are keyed by
//!   Rust enums ([`VocabularyKey`]), so a miss means the table is out of step with the code.
//!
//! ## Table format
//!
//! ```yaml
//! categories:
//!   geographic_region:
//!     system: urn:iso:std:iso:3166
//!     entries:
//!       - { code: DE, display: Germany }
//!     special:
//!       - { system: http://terminology.hl7.org/CodeSystem/v3-NullFlavor, code: ASKU, display: asked but unknown }
//! ```
//!
//! An entry may carry a `key` when the form value differs from the code.

mod keys;
mod table;

pub use keys::{EncounterClass, NotificationType, SectionKind};
pub use table::VocabularyTable;

use crate::Coding;
use ndb_types::Answer;
use std::fmt;
use std::sync::Arc;

/// Code system of the `yes`/`no` answers.
pub const YES_NO_SYSTEM: &str = "https://demis.rki.de/fhir/CodeSystem/yesOrNoAnswer";

/// Code system of the HL7 null flavors (`ASKU`, `NASK`, ...).
pub const NULL_FLAVOR_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v3-NullFlavor";

/// Errors raised by vocabulary loading and lookups.
#[derive(Debug, thiserror::Error)]
pub enum VocabularyError {
    /// A strict category has no entry for the key.
    #[error("invalid {category}: {key}")]
    NotFound { category: Category, key: String },

    /// An enum-keyed category has no entry for an enum value.
    #[error("no vocabulary mapping for {category} value '{key}'")]
    Unmapped { category: Category, key: String },

    #[error("vocabulary table schema mismatch at {path}: {message}")]
    Schema { path: String, message: String },

    #[error("invalid vocabulary table: {0}")]
    InvalidTable(String),

    #[error("failed to read vocabulary table: {0}")]
    Io(#[from] std::io::Error),
}

/// What happens when a key is in neither the primary nor the special entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strictness {
    Strict,
    Lenient,
    Enumerated,
}

/// Named vocabulary categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    GeographicRegion,
    OrganizationType,
    MilitaryAffiliation,
    Disease,
    Symptom,
    Vaccine,
    InfectionProtectionRole,
    InfectionEnvironment,
    Pathogen,
    SpecimenMaterial,
    TestMethod,
    Substance,
    Conclusion,
    Gender,
    Interpretation,
    EncounterClass,
    NotificationType,
    Section,
}

impl Category {
    pub const ALL: [Category; 18] = [
        Category::GeographicRegion,
        Category::OrganizationType,
        Category::MilitaryAffiliation,
        Category::Disease,
        Category::Symptom,
        Category::Vaccine,
        Category::InfectionProtectionRole,
        Category::InfectionEnvironment,
        Category::Pathogen,
        Category::SpecimenMaterial,
        Category::TestMethod,
        Category::Substance,
        Category::Conclusion,
        Category::Gender,
        Category::Interpretation,
        Category::EncounterClass,
        Category::NotificationType,
        Category::Section,
    ];

    /// Name of the category in the YAML table.
    pub fn table_name(self) -> &'static str {
        match self {
            Category::GeographicRegion => "geographic_region",
            Category::OrganizationType => "organization_type",
            Category::MilitaryAffiliation => "military_affiliation",
            Category::Disease => "disease",
            Category::Symptom => "symptom",
            Category::Vaccine => "vaccine",
            Category::InfectionProtectionRole => "infection_protection_role",
            Category::InfectionEnvironment => "infection_environment",
            Category::Pathogen => "pathogen",
            Category::SpecimenMaterial => "specimen_material",
            Category::TestMethod => "test_method",
            Category::Substance => "substance",
            Category::Conclusion => "conclusion",
            Category::Gender => "gender",
            Category::Interpretation => "interpretation",
            Category::EncounterClass => "encounter_class",
            Category::NotificationType => "notification_type",
            Category::Section => "section",
        }
    }

    fn from_table_name(name: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.table_name() == name)
    }

    pub fn strictness(self) -> Strictness {
        match self {
            Category::GeographicRegion
            | Category::MilitaryAffiliation
            | Category::Disease
            | Category::Symptom
            | Category::Vaccine
            | Category::InfectionProtectionRole
            | Category::Pathogen
            | Category::Conclusion => Strictness::Strict,
            Category::OrganizationType
            | Category::InfectionEnvironment
            | Category::SpecimenMaterial
            | Category::TestMethod
            | Category::Substance => Strictness::Lenient,
            Category::Gender
            | Category::Interpretation
            | Category::EncounterClass
            | Category::NotificationType
            | Category::Section => Strictness::Enumerated,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::GeographicRegion => "geographic region",
            Category::OrganizationType => "organization type",
            Category::MilitaryAffiliation => "military affiliation",
            Category::Disease => "disease",
            Category::Symptom => "symptom",
            Category::Vaccine => "vaccine",
            Category::InfectionProtectionRole => "infection protection facility role",
            Category::InfectionEnvironment => "infection environment",
            Category::Pathogen => "pathogen",
            Category::SpecimenMaterial => "specimen material",
            Category::TestMethod => "test method",
            Category::Substance => "resistance substance",
            Category::Conclusion => "laboratory conclusion",
            Category::Gender => "gender",
            Category::Interpretation => "interpretation",
            Category::EncounterClass => "encounter class",
            Category::NotificationType => "notification type",
            Category::Section => "document section",
        };
        f.write_str(name)
    }
}

/// A Rust enum whose values map onto an enumerated vocabulary category.
pub trait VocabularyKey: Copy + 'static {
    const CATEGORY: Category;

    /// Table key for this value.
    fn key(self) -> &'static str;

    /// Every value of the enum, used to check a table covers them all.
    fn variants() -> &'static [Self];
}

/// Which table answered a lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Primary,
    Special,
    Synthesized,
}

/// A resolved coding together with its [`Origin`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub coding: Coding,
    pub origin: Origin,
}

/// Read-only resolver over a shared [`VocabularyTable`].
///
/// Cloning is cheap and clones share the table; the resolver holds no mutable state and may be
/// used from any number of threads at once.
#[derive(Clone, Debug)]
pub struct VocabularyResolver {
    table: Arc<VocabularyTable>,
}

impl VocabularyResolver {
    pub fn new(table: Arc<VocabularyTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &VocabularyTable {
        &self.table
    }

    /// Maps a four-state answer onto its coding.
    ///
    /// `Yes`/`No` come from the yes/no answer system; `Indeterminate` is `ASKU` (asked but
    /// unknown) and `Unknown` is `NASK` (not asked), both from the null-flavor system.
    pub fn resolve_tri_state(&self, answer: Answer) -> Coding {
        tri_state_coding(answer)
    }

    /// Looks `key` up in `category`, applying the fallback and strictness rules.
    ///
    /// # Errors
    ///
    /// - [`VocabularyError::NotFound`] for a strict category miss.
    /// - [`VocabularyError::Unmapped`] for an enumerated category miss.
    pub fn resolve(&self, category: Category, key: &str) -> Result<Coding, VocabularyError> {
        self.resolve_entry(category, key)
            .map(|resolved| resolved.coding)
    }

    /// Same as [`Self::resolve`] but also reports which table answered.
    pub fn resolve_entry(
        &self,
        category: Category,
        key: &str,
    ) -> Result<Resolved, VocabularyError> {
        let key = key.trim();
        let entries = self.table.category(category);

        if let Some(coding) = entries.primary(key) {
            return Ok(Resolved {
                coding: coding.clone(),
                origin: Origin::Primary,
            });
        }

        if let Some(coding) = entries.special(key) {
            return Ok(Resolved {
                coding: coding.clone(),
                origin: Origin::Special,
            });
        }

        match category.strictness() {
            Strictness::Strict => Err(VocabularyError::NotFound {
                category,
                key: key.to_string(),
            }),
            Strictness::Enumerated => Err(VocabularyError::Unmapped {
                category,
                key: key.to_string(),
            }),
            Strictness::Lenient if key.is_empty() => Err(VocabularyError::NotFound {
                category,
                key: String::new(),
            }),
            Strictness::Lenient => {
                tracing::warn!(%category, key, "no vocabulary entry, synthesizing coding");
                Ok(Resolved {
                    coding: Coding::new(entries.system(), key, None),
                    origin: Origin::Synthesized,
                })
            }
        }
    }

    /// Resolves an enum value of an enumerated category.
    ///
    /// # Errors
    ///
    /// Returns [`VocabularyError::Unmapped`] when the table has no entry for the value.
    pub fn resolve_key<K: VocabularyKey>(&self, value: K) -> Result<Coding, VocabularyError> {
        self.resolve(K::CATEGORY, value.key())
    }
}

fn tri_state_coding(answer: Answer) -> Coding {
    match answer {
        Answer::Yes => Coding::new(YES_NO_SYSTEM, "yes", Some("Yes".to_string())),
        Answer::No => Coding::new(YES_NO_SYSTEM, "no", Some("No".to_string())),
        Answer::Indeterminate => Coding::new(
            NULL_FLAVOR_SYSTEM,
            "ASKU",
            Some("asked but unknown".to_string()),
        ),
        Answer::Unknown => {
            Coding::new(NULL_FLAVOR_SYSTEM, "NASK", Some("not asked".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> VocabularyResolver {
        let table = VocabularyTable::builtin().expect("builtin table parses");
        VocabularyResolver::new(Arc::new(table))
    }

    #[test]
    fn tri_state_mapping_is_fixed() {
        let resolver = resolver();
        let codes: Vec<(String, String)> = Answer::ALL
            .into_iter()
            .map(|a| {
                let coding = resolver.resolve_tri_state(a);
                (coding.system().to_string(), coding.code().to_string())
            })
            .collect();

        assert_eq!(
            codes,
            vec![
                (YES_NO_SYSTEM.to_string(), "yes".to_string()),
                (YES_NO_SYSTEM.to_string(), "no".to_string()),
                (NULL_FLAVOR_SYSTEM.to_string(), "ASKU".to_string()),
                (NULL_FLAVOR_SYSTEM.to_string(), "NASK".to_string()),
            ]
        );
    }

    #[test]
    fn tri_state_mapping_is_pure() {
        let resolver = resolver();
        for answer in Answer::ALL {
            assert_eq!(
                resolver.resolve_tri_state(answer),
                resolver.resolve_tri_state(answer)
            );
        }
    }

    #[test]
    fn primary_lookup_wins() {
        let resolved = resolver()
            .resolve_entry(Category::GeographicRegion, "DE")
            .expect("known region");
        assert_eq!(resolved.origin, Origin::Primary);
        assert_eq!(resolved.coding.system(), "urn:iso:std:iso:3166");
        assert_eq!(resolved.coding.display(), Some("Germany"));
    }

    #[test]
    fn falls_back_to_special_values() {
        let resolved = resolver()
            .resolve_entry(Category::GeographicRegion, "ASKU")
            .expect("null flavor accepted as region");
        assert_eq!(resolved.origin, Origin::Special);
        assert_eq!(resolved.coding.system(), NULL_FLAVOR_SYSTEM);
    }

    #[test]
    fn strict_category_miss_names_category_and_key() {
        let err = resolver()
            .resolve(Category::GeographicRegion, "invalid")
            .expect_err("unknown region");
        match &err {
            VocabularyError::NotFound { category, key } => {
                assert_eq!(*category, Category::GeographicRegion);
                assert_eq!(key, "invalid");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert_eq!(err.to_string(), "invalid geographic region: invalid");
    }

    #[test]
    fn lenient_category_synthesizes_without_display() {
        let resolved = resolver()
            .resolve_entry(Category::OrganizationType, "mobileTestingUnit")
            .expect("lenient category");
        assert_eq!(resolved.origin, Origin::Synthesized);
        assert_eq!(resolved.coding.code(), "mobileTestingUnit");
        assert_eq!(resolved.coding.display(), None);
        assert_eq!(
            resolved.coding.system(),
            "https://demis.rki.de/fhir/CodeSystem/organizationType"
        );
    }

    #[test]
    fn lenient_category_still_rejects_blank_keys() {
        let err = resolver()
            .resolve(Category::OrganizationType, "   ")
            .expect_err("blank key");
        assert!(matches!(err, VocabularyError::NotFound { .. }));
    }

    #[test]
    fn enumerated_category_miss_is_unmapped() {
        let err = resolver()
            .resolve(Category::Gender, "robot")
            .expect_err("unmapped gender");
        assert!(matches!(err, VocabularyError::Unmapped { .. }));
    }

    #[test]
    fn keys_are_trimmed() {
        let coding = resolver()
            .resolve(Category::GeographicRegion, "  AT ")
            .expect("trimmed key");
        assert_eq!(coding.code(), "AT");
    }

    #[test]
    fn entry_keys_may_differ_from_codes() {
        let coding = resolver()
            .resolve(Category::Symptom, "fever")
            .expect("keyed symptom");
        assert_eq!(coding.code(), "386661006");
    }

    #[test]
    fn category_names_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_table_name(category.table_name()), Some(category));
        }
    }
}
