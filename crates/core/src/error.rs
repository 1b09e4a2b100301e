use fhir::vocabulary::{Category, VocabularyError};
use fhir::FhirError;

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("invalid input: {0}")]
    InputValidation(String),

    #[error("invalid {category} for {context}: {key}")]
    VocabularyLookup {
        category: Category,
        context: &'static str,
        key: String,
    },

    #[error("internal defect: {0}")]
    Defect(String),

    #[error("failed to load vocabulary table: {0}")]
    VocabularyTable(#[source] VocabularyError),

    #[error("document construction failed: {0}")]
    Fhir(#[from] FhirError),
}

impl NotificationError {
    /// Whether the error was caused by the submitted form rather than by this system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            NotificationError::InputValidation(_) | NotificationError::VocabularyLookup { .. }
        )
    }

    /// Maps a lookup failure, naming where in the form the key came from.
    pub(crate) fn from_lookup(err: VocabularyError, context: &'static str) -> Self {
        match err {
            VocabularyError::NotFound { category, key } => NotificationError::VocabularyLookup {
                category,
                context,
                key,
            },
            other => NotificationError::Defect(format!("{context}: {other}")),
        }
    }
}

pub type NotificationResult<T> = std::result::Result<T, NotificationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_message_names_category_context_and_key() {
        let err = NotificationError::from_lookup(
            VocabularyError::NotFound {
                category: Category::GeographicRegion,
                key: "invalid".into(),
            },
            "place exposure",
        );
        assert_eq!(
            err.to_string(),
            "invalid geographic region for place exposure: invalid"
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn unmapped_enum_values_are_defects() {
        let err = NotificationError::from_lookup(
            VocabularyError::Unmapped {
                category: Category::Gender,
                key: "diverse".into(),
            },
            "notified person",
        );
        assert!(matches!(err, NotificationError::Defect(_)));
        assert!(!err.is_client_error());
    }
}
