//! Input notification forms.
//!
//! A [`NotificationForm`] is the read-only input of one assembly call. Forms arrive as JSON
//! with camelCase keys and a `notificationType` tag:
//!
//! - `disease` and `hospitalization` share the [`ClinicalForm`] shape,
//! - `pathogen` carries a [`PathogenForm`] (laboratory report).
//!
//! Unknown keys are rejected. Vocabulary keys (regions, diseases, vaccines, ...) stay plain
//! strings here; they are resolved, and rejected when unknown, during assembly where the error
//! can name the part of the form they came from.

mod clinical;
mod laboratory;

pub use clinical::{
    ClinicalForm, CommonInformation, ConditionInput, DeathDetail, HospitalizationDetail,
    InfectionProtectionStay, InfectionSourceDetail, SpecificInformation, Stay, Vaccination,
};
pub use laboratory::{
    Interpretation, LaboratoryContext, LaboratoryReportInput, PathogenForm, ResistanceInput,
    SpecimenInput, TestResult,
};

use crate::{NotificationError, NotificationResult};
use fhir::vocabulary::{Category, NotificationType, VocabularyKey};
use ndb_types::PartialDate;
use serde::Deserialize;

// ============================================================================
// Public domain-level types
// ============================================================================

/// One notification, in one of the three flow shapes.
#[derive(Clone, Debug, PartialEq)]
pub enum NotificationForm {
    Disease(ClinicalForm),
    Hospitalization(ClinicalForm),
    Pathogen(PathogenForm),
}

impl NotificationForm {
    /// Parse a notification form from JSON text.
    ///
    /// This uses `serde_path_to_error` so a schema mismatch names the failing field (e.g.
    /// `common.placeExposureDetail.region`).
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::InputValidation`] if:
    /// - the text is not JSON or not an object,
    /// - `notificationType` is missing or unknown,
    /// - any field has an unexpected type or an unknown key is present.
    pub fn parse_json(json_text: &str) -> NotificationResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json_text).map_err(|e| {
            NotificationError::InputValidation(format!("notification form is not valid JSON: {e}"))
        })?;
        Self::from_value(value)
    }

    /// Same as [`Self::parse_json`] for an already-parsed JSON value.
    pub fn from_value(mut value: serde_json::Value) -> NotificationResult<Self> {
        let object = value.as_object_mut().ok_or_else(|| {
            NotificationError::InputValidation("notification form must be a JSON object".into())
        })?;

        let tag = match object.remove("notificationType") {
            Some(serde_json::Value::String(tag)) => tag,
            Some(other) => {
                return Err(NotificationError::InputValidation(format!(
                    "notificationType must be a string, got {other}"
                )))
            }
            None => {
                return Err(NotificationError::InputValidation(
                    "notificationType is required".into(),
                ))
            }
        };

        match tag.as_str() {
            "disease" => Ok(NotificationForm::Disease(deserialize_body(value)?)),
            "hospitalization" => Ok(NotificationForm::Hospitalization(deserialize_body(value)?)),
            "pathogen" => Ok(NotificationForm::Pathogen(deserialize_body(value)?)),
            other => Err(NotificationError::InputValidation(format!(
                "unknown notificationType '{other}'"
            ))),
        }
    }

    pub fn notification_type(&self) -> NotificationType {
        match self {
            NotificationForm::Disease(_) => NotificationType::Disease,
            NotificationForm::Hospitalization(_) => NotificationType::Hospitalization,
            NotificationForm::Pathogen(_) => NotificationType::Pathogen,
        }
    }
}

/// A facility: notifier, laboratory, hospital, and so on.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Facility {
    pub name: String,
    pub organization_type: String,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub address: Option<AddressInput>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A contact person at a facility.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Contact {
    #[serde(default)]
    pub salutation: Option<String>,
    pub given: String,
    pub family: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Who submits the notification (or, for laboratory reports, the specimen).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Notifier {
    pub facility: Facility,
    pub contact: Contact,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddressInput {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub house_number: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    /// Geographic region key, e.g. `DE`.
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Gender {
    Male,
    Female,
    Diverse,
    Unknown,
}

impl VocabularyKey for Gender {
    const CATEGORY: Category = Category::Gender;

    fn key(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Diverse => "diverse",
            Gender::Unknown => "unknown",
        }
    }

    fn variants() -> &'static [Self] {
        &[Gender::Male, Gender::Female, Gender::Diverse, Gender::Unknown]
    }
}

/// Where the notified person currently stays, when that differs from the residence.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "addressType", rename_all = "camelCase", deny_unknown_fields)]
pub enum CurrentAddress {
    Ordinary { address: AddressInput },
    NotifierFacility,
    OtherFacility { facility: Facility },
    /// Only valid in laboratory reports.
    SubmittingFacility,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NotifiedPerson {
    pub given: String,
    pub family: String,
    pub gender: Gender,
    #[serde(default, deserialize_with = "ndb_types::date::deserialize_optional")]
    pub birth_date: Option<PartialDate>,
    #[serde(default)]
    pub residence: Option<AddressInput>,
    #[serde(default)]
    pub current_address: Option<CurrentAddress>,
}

/// Place the notified person was probably exposed.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExposurePlace {
    pub region: String,
    #[serde(default, deserialize_with = "ndb_types::date::deserialize_optional")]
    pub begin: Option<PartialDate>,
    #[serde(default, deserialize_with = "ndb_types::date::deserialize_optional")]
    pub end: Option<PartialDate>,
    #[serde(default)]
    pub note: Option<String>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn deserialize_body<T>(value: serde_json::Value) -> NotificationResult<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| {
        let path = err.path().to_string();
        let source = err.into_inner();
        let path = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        NotificationError::InputValidation(format!(
            "notification form schema mismatch at {path}: {source}"
        ))
    })
}
