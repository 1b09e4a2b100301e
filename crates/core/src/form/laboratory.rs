//! Pathogen (laboratory report) notification form.

use super::{ExposurePlace, NotifiedPerson, Notifier};
use fhir::record::ReportStatus;
use fhir::vocabulary::{Category, VocabularyKey};
use ndb_types::{Answer, PartialDate};
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PathogenForm {
    pub notifier: Notifier,
    /// Facility that sent the specimen. Required for assembly.
    #[serde(default)]
    pub submitter: Option<Notifier>,
    pub notified_person: NotifiedPerson,
    /// Pathogen key, e.g. `cvdp`.
    pub pathogen: String,
    pub report: LaboratoryReportInput,
    #[serde(default)]
    pub specimens: Vec<SpecimenInput>,
    #[serde(default)]
    pub context: Option<LaboratoryContext>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LaboratoryReportInput {
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default, deserialize_with = "ndb_types::date::deserialize_optional")]
    pub issued: Option<PartialDate>,
    /// Conclusion key, e.g. `pathogenDetected`.
    pub conclusion: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpecimenInput {
    pub material: String,
    #[serde(default, deserialize_with = "ndb_types::date::deserialize_optional")]
    pub collected: Option<PartialDate>,
    #[serde(default, deserialize_with = "ndb_types::date::deserialize_optional")]
    pub received: Option<PartialDate>,
    #[serde(default)]
    pub results: Vec<TestResult>,
    #[serde(default)]
    pub resistances: Vec<ResistanceInput>,
}

/// One detection test run on a specimen.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TestResult {
    pub method: String,
    pub interpretation: Interpretation,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResistanceInput {
    pub substance: String,
    pub interpretation: Interpretation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Interpretation {
    Positive,
    Negative,
    Susceptible,
    Intermediate,
    Resistant,
}

impl VocabularyKey for Interpretation {
    const CATEGORY: Category = Category::Interpretation;

    fn key(self) -> &'static str {
        match self {
            Interpretation::Positive => "positive",
            Interpretation::Negative => "negative",
            Interpretation::Susceptible => "susceptible",
            Interpretation::Intermediate => "intermediate",
            Interpretation::Resistant => "resistant",
        }
    }

    fn variants() -> &'static [Self] {
        &[
            Interpretation::Positive,
            Interpretation::Negative,
            Interpretation::Susceptible,
            Interpretation::Intermediate,
            Interpretation::Resistant,
        ]
    }
}

/// Clinical context reported alongside a laboratory result.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LaboratoryContext {
    #[serde(default)]
    pub hospitalized: Answer,
    #[serde(default)]
    pub immunization_status: Answer,
    #[serde(default)]
    pub infection_protection_facility: Answer,
    #[serde(default)]
    pub place_exposure: Answer,
    #[serde(default)]
    pub place_exposure_detail: Option<ExposurePlace>,
}
