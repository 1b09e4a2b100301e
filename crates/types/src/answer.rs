use serde::{Deserialize, Serialize};

/// Four-state answer to a yes/no question on a notification form.
///
/// `Indeterminate` means the question was asked but nobody knew the answer; `Unknown` means
/// the question was never asked. Fields that a form omits default to `Unknown`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Answer {
    Yes,
    No,
    Indeterminate,
    #[default]
    Unknown,
}

impl Answer {
    /// Every answer state, in declaration order.
    pub const ALL: [Answer; 4] = [
        Answer::Yes,
        Answer::No,
        Answer::Indeterminate,
        Answer::Unknown,
    ];

    /// Returns `true` only for an affirmative answer.
    pub fn is_yes(self) -> bool {
        matches!(self, Answer::Yes)
    }
}
