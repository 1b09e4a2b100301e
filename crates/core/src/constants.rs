//! Constants used throughout the notification core crate.

/// Questionnaire answered by the common clinical information of disease notifications.
pub const QUESTIONNAIRE_DISEASE_COMMON: &str = "DiseaseQuestionsCommon";

/// Questionnaire answered by the disease-specific information.
pub const QUESTIONNAIRE_DISEASE_SPECIFIC: &str = "DiseaseQuestionsSpecific";

/// Questionnaire answered by the clinical context of a laboratory report.
pub const QUESTIONNAIRE_LABORATORY_CONTEXT: &str = "LaboratoryContextQuestions";

/// Composition titles per flow.
pub const TITLE_DISEASE: &str = "Meldung gemäß §6 Abs. 1 IfSG";
pub const TITLE_HOSPITALIZATION: &str = "Meldung einer Hospitalisierung gemäß §6 Abs. 1 IfSG";
pub const TITLE_PATHOGEN: &str = "Erregernachweismeldung gemäß §7 Abs. 1 IfSG";

/// Suffix of the group item nested under an affirmative trigger answer.
pub const GROUP_SUFFIX: &str = "Group";
