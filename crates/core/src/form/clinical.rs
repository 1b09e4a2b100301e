//! Disease and hospitalization notification forms.

use super::{ExposurePlace, Facility, NotifiedPerson, Notifier};
use ndb_types::{Answer, PartialDate};
use serde::Deserialize;

/// Body shared by the disease and hospitalization flows.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClinicalForm {
    pub notifier: Notifier,
    pub notified_person: NotifiedPerson,
    pub condition: ConditionInput,
    #[serde(default)]
    pub common: CommonInformation,
    #[serde(default)]
    pub specific: SpecificInformation,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConditionInput {
    /// Disease key, e.g. `cvdd`.
    pub disease: String,
    #[serde(default, deserialize_with = "ndb_types::date::deserialize_optional")]
    pub onset: Option<PartialDate>,
    #[serde(default, deserialize_with = "ndb_types::date::deserialize_optional")]
    pub recorded: Option<PartialDate>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Clinical and epidemiological information asked for every disease.
///
/// Each trigger answer gates the detail block next to it; a detail block without an affirmative
/// trigger is ignored.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CommonInformation {
    #[serde(default)]
    pub died: Answer,
    #[serde(default)]
    pub death: Option<DeathDetail>,
    #[serde(default)]
    pub military_affiliation: Option<String>,
    #[serde(default)]
    pub lab_assigned: Answer,
    #[serde(default)]
    pub lab: Option<Facility>,
    #[serde(default)]
    pub hospitalized: Answer,
    #[serde(default)]
    pub hospitalization: Option<HospitalizationDetail>,
    #[serde(default)]
    pub infection_protection_facility: Answer,
    #[serde(default)]
    pub infection_protection_facility_stay: Option<InfectionProtectionStay>,
    #[serde(default)]
    pub place_exposure: Answer,
    #[serde(default)]
    pub place_exposure_detail: Option<ExposurePlace>,
    #[serde(default)]
    pub organ_donation: Answer,
    #[serde(default)]
    pub additional_information: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeathDetail {
    #[serde(default, deserialize_with = "ndb_types::date::deserialize_optional")]
    pub date: Option<PartialDate>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Stay {
    #[serde(default, deserialize_with = "ndb_types::date::deserialize_optional")]
    pub begin: Option<PartialDate>,
    #[serde(default, deserialize_with = "ndb_types::date::deserialize_optional")]
    pub end: Option<PartialDate>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HospitalizationDetail {
    #[serde(default, deserialize_with = "ndb_types::date::deserialize_optional")]
    pub begin: Option<PartialDate>,
    #[serde(default, deserialize_with = "ndb_types::date::deserialize_optional")]
    pub end: Option<PartialDate>,
    pub hospital: Facility,
    #[serde(default)]
    pub intensive_care: Answer,
    #[serde(default)]
    pub intensive_care_stay: Option<Stay>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InfectionProtectionStay {
    pub facility: Facility,
    /// Infection-protection role key, e.g. `employment`.
    pub role: String,
    #[serde(default, deserialize_with = "ndb_types::date::deserialize_optional")]
    pub begin: Option<PartialDate>,
    #[serde(default, deserialize_with = "ndb_types::date::deserialize_optional")]
    pub end: Option<PartialDate>,
}

/// Disease-specific information.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpecificInformation {
    #[serde(default)]
    pub infection_source: Answer,
    #[serde(default)]
    pub infection_source_detail: Option<InfectionSourceDetail>,
    #[serde(default)]
    pub infection_environment: Option<String>,
    #[serde(default)]
    pub immunization_status: Answer,
    #[serde(default)]
    pub vaccinations: Vec<Vaccination>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InfectionSourceDetail {
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Vaccination {
    /// Vaccine key: a community-register number such as `EU/1/20/1528`, or a special value.
    pub vaccine: String,
    #[serde(default, deserialize_with = "ndb_types::date::deserialize_optional")]
    pub date: Option<PartialDate>,
    #[serde(default)]
    pub note: Option<String>,
}
