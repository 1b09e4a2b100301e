//! Canonical profile URLs stamped on records and bundles.

pub const NOTIFIED_PERSON: &str = "https://demis.rki.de/fhir/StructureDefinition/NotifiedPerson";
pub const NOTIFIER_ROLE: &str = "https://demis.rki.de/fhir/StructureDefinition/NotifierRole";
pub const SUBMITTING_ROLE: &str = "https://demis.rki.de/fhir/StructureDefinition/SubmittingRole";

pub const NOTIFIER_FACILITY: &str =
    "https://demis.rki.de/fhir/StructureDefinition/NotifierFacility";
pub const SUBMITTING_FACILITY: &str =
    "https://demis.rki.de/fhir/StructureDefinition/SubmittingFacility";
pub const NOTIFIED_PERSON_FACILITY: &str =
    "https://demis.rki.de/fhir/StructureDefinition/NotifiedPersonFacility";

pub const HOSPITALIZATION: &str = "https://demis.rki.de/fhir/StructureDefinition/Hospitalization";
pub const DISEASE: &str = "https://demis.rki.de/fhir/StructureDefinition/Disease";
pub const SPECIMEN: &str = "https://demis.rki.de/fhir/StructureDefinition/NotifiedSpecimen";
pub const PATHOGEN_DETECTION: &str =
    "https://demis.rki.de/fhir/StructureDefinition/PathogenDetection";
pub const RESISTANCE_RESULT: &str =
    "https://demis.rki.de/fhir/StructureDefinition/ResistanceResult";
pub const IMMUNIZATION: &str =
    "https://demis.rki.de/fhir/StructureDefinition/ImmunizationInformationDisease";
pub const QUESTIONNAIRE_RESPONSE: &str =
    "https://demis.rki.de/fhir/StructureDefinition/NotificationQuestionnaireResponse";
pub const LABORATORY_REPORT: &str =
    "https://demis.rki.de/fhir/StructureDefinition/LaboratoryReport";
pub const NOTIFICATION: &str = "https://demis.rki.de/fhir/StructureDefinition/Notification";

pub const BUNDLE_DISEASE: &str =
    "https://demis.rki.de/fhir/StructureDefinition/NotificationBundleDisease";
pub const BUNDLE_LABORATORY: &str =
    "https://demis.rki.de/fhir/StructureDefinition/NotificationBundleLaboratory";

/// Canonical URL of a questionnaire, e.g. `questionnaire("DiseaseQuestionsCommon")`.
pub fn questionnaire(name: &str) -> String {
    format!("https://demis.rki.de/fhir/Questionnaire/{name}")
}
