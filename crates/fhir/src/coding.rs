//! Controlled-vocabulary codings.

use serde::Serialize;

/// One controlled-vocabulary value: `{system, code, display}`.
///
/// Codings are only minted by [`crate::vocabulary::VocabularyResolver`]; the constructor is
/// crate-private so every coded value in an assembled document is traceable to the vocabulary
/// table or to the fixed four-state answer mapping.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Coding {
    system: String,
    code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    display: Option<String>,
}

impl Coding {
    pub(crate) fn new(
        system: impl Into<String>,
        code: impl Into<String>,
        display: Option<String>,
    ) -> Self {
        Self {
            system: system.into(),
            code: code.into(),
            display,
        }
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }
}
