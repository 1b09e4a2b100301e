//! Implementation of local ids and the id sources that mint them.

use std::fmt;
use uuid::Uuid;

/// Identifier of one record within one assembly run.
///
/// [`fmt::Display`] always yields the canonical hyphenated lowercase form.
///
/// # Construction
/// - [`LocalId::new`] generates a fresh random id.
/// - [`LocalId::from_u128`] builds a predictable id, used by [`SequentialIds`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalId(Uuid);

impl Default for LocalId {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalId {
    /// Generates a new random (version 4) id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Builds an id from a raw 128-bit value.
    pub fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Returns the `urn:uuid:` form used for bundle entry URLs and references.
    pub fn urn(&self) -> String {
        format!("urn:uuid:{}", self.0.hyphenated())
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Source of fresh ids for one assembly run.
///
/// An id source is owned by a single run and never shared, so implementations may keep
/// plain mutable state.
pub trait IdSource {
    /// Returns an id not previously returned by this source.
    fn next_id(&mut self) -> LocalId;
}

/// Random version 4 ids.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self) -> LocalId {
        LocalId::new()
    }
}

/// Predictable ids counting up from 1.
///
/// Two runs over the same input with fresh `SequentialIds` produce identical ids, which makes
/// rendered documents directly comparable.
#[derive(Clone, Debug, Default)]
pub struct SequentialIds {
    issued: u128,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> LocalId {
        self.issued += 1;
        LocalId::from_u128(self.issued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn is_canonical(input: &str) -> bool {
        input.len() == 36
            && input.bytes().enumerate().all(|(i, b)| match i {
                8 | 13 | 18 | 23 => b == b'-',
                _ => matches!(b, b'0'..=b'9' | b'a'..=b'f'),
            })
    }

    #[test]
    fn new_ids_are_canonical() {
        let id = LocalId::new();
        assert!(is_canonical(&id.to_string()));
    }

    #[test]
    fn urn_wraps_the_canonical_form() {
        let id = LocalId::from_u128(0x550e8400_e29b_41d4_a716_446655440000);
        assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(id.urn(), "urn:uuid:550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn sequential_ids_count_from_one() {
        let mut ids = SequentialIds::new();
        assert_eq!(
            ids.next_id().to_string(),
            "00000000-0000-0000-0000-000000000001"
        );
        assert_eq!(
            ids.next_id().to_string(),
            "00000000-0000-0000-0000-000000000002"
        );
    }

    #[test]
    fn sequential_runs_are_reproducible() {
        let first: Vec<LocalId> = {
            let mut ids = SequentialIds::new();
            (0..5).map(|_| ids.next_id()).collect()
        };
        let second: Vec<LocalId> = {
            let mut ids = SequentialIds::new();
            (0..5).map(|_| ids.next_id()).collect()
        };
        assert_eq!(first, second);
    }

    #[test]
    fn random_ids_do_not_repeat() {
        let mut ids = RandomIds;
        let issued: HashSet<LocalId> = (0..256).map(|_| ids.next_id()).collect();
        assert_eq!(issued.len(), 256);
        assert!(issued.iter().all(|id| is_canonical(&id.to_string())));
    }
}
