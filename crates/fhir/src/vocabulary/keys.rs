//! Enumerated keys used by the record model itself.

use super::{Category, VocabularyKey};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncounterClass {
    Inpatient,
    IntensiveCare,
}

impl VocabularyKey for EncounterClass {
    const CATEGORY: Category = Category::EncounterClass;

    fn key(self) -> &'static str {
        match self {
            EncounterClass::Inpatient => "inpatient",
            EncounterClass::IntensiveCare => "intensiveCare",
        }
    }

    fn variants() -> &'static [Self] {
        &[EncounterClass::Inpatient, EncounterClass::IntensiveCare]
    }
}

/// The three notification flows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NotificationType {
    Disease,
    Hospitalization,
    Pathogen,
}

impl VocabularyKey for NotificationType {
    const CATEGORY: Category = Category::NotificationType;

    fn key(self) -> &'static str {
        match self {
            NotificationType::Disease => "disease",
            NotificationType::Hospitalization => "hospitalization",
            NotificationType::Pathogen => "pathogen",
        }
    }

    fn variants() -> &'static [Self] {
        &[
            NotificationType::Disease,
            NotificationType::Hospitalization,
            NotificationType::Pathogen,
        ]
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Sections of a notification composition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionKind {
    Diagnosis,
    CommonInformation,
    SpecificInformation,
    LaboratoryReport,
    LaboratoryContext,
}

impl SectionKind {
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Diagnosis => "Diagnose",
            SectionKind::CommonInformation => {
                "Meldetatbestandsübergreifende klinische und epidemiologische Angaben"
            }
            SectionKind::SpecificInformation => {
                "Meldetatbestandsspezifische klinische und epidemiologische Angaben"
            }
            SectionKind::LaboratoryReport => "Erregernachweis",
            SectionKind::LaboratoryContext => "Klinischer Kontext des Erregernachweises",
        }
    }
}

impl VocabularyKey for SectionKind {
    const CATEGORY: Category = Category::Section;

    fn key(self) -> &'static str {
        match self {
            SectionKind::Diagnosis => "diagnosis",
            SectionKind::CommonInformation => "commonInformation",
            SectionKind::SpecificInformation => "specificInformation",
            SectionKind::LaboratoryReport => "laboratoryReport",
            SectionKind::LaboratoryContext => "laboratoryContext",
        }
    }

    fn variants() -> &'static [Self] {
        &[
            SectionKind::Diagnosis,
            SectionKind::CommonInformation,
            SectionKind::SpecificInformation,
            SectionKind::LaboratoryReport,
            SectionKind::LaboratoryContext,
        ]
    }
}
