//! References between records and the arena that hands them out.
//!
//! A [`Reference`] can only be obtained by inserting a finished [`Record`] into a
//! [`RecordArena`]. Code that needs to point at a record therefore has to construct it first,
//! which keeps every reference backward-pointing and every target present in the final bundle.

use crate::record::{Record, RecordKind};
use crate::{FhirError, FhirResult};
use ndb_uuid::LocalId;
use std::collections::{HashMap, HashSet};

/// Typed pointer to a record constructed earlier in the same assembly run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Reference {
    kind: RecordKind,
    id: LocalId,
}

impl Reference {
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn id(&self) -> LocalId {
        self.id
    }

    /// `urn:uuid:` form used in rendered documents.
    pub fn urn(&self) -> String {
        self.id.urn()
    }
}

/// Append-only store of the records built during one assembly run.
#[derive(Debug, Default)]
pub struct RecordArena {
    records: Vec<Record>,
    index: HashMap<LocalId, usize>,
}

impl RecordArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record and returns the only handle through which it can be referenced.
    ///
    /// # Errors
    ///
    /// - [`FhirError::DuplicateLocalId`] if another record already uses the same id.
    /// - [`FhirError::DanglingReference`] if the record points at anything not already in
    ///   this arena.
    pub fn insert(&mut self, record: Record) -> FhirResult<Reference> {
        let id = record.id();
        if self.index.contains_key(&id) {
            return Err(FhirError::DuplicateLocalId(id.to_string()));
        }

        if let Some(dangling) = record
            .references()
            .into_iter()
            .find(|target| !self.index.contains_key(&target.id()))
        {
            return Err(FhirError::DanglingReference {
                from: id.to_string(),
                to: dangling.id().to_string(),
            });
        }

        let reference = Reference {
            kind: record.kind(),
            id,
        };
        self.index.insert(id, self.records.len());
        self.records.push(record);
        Ok(reference)
    }

    pub fn get(&self, reference: &Reference) -> Option<&Record> {
        self.index.get(&reference.id).map(|&i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consumes the arena, returning records in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidOrder`] unless `order` names every stored record exactly
    /// once.
    pub fn into_ordered(self, order: &[Reference]) -> FhirResult<Vec<Record>> {
        if order.len() != self.records.len() {
            return Err(FhirError::InvalidOrder(format!(
                "order lists {} records but {} were built",
                order.len(),
                self.records.len()
            )));
        }

        let mut seen = HashSet::with_capacity(order.len());
        for reference in order {
            if !self.index.contains_key(&reference.id) {
                return Err(FhirError::InvalidOrder(format!(
                    "record {} was not built in this run",
                    reference.id
                )));
            }
            if !seen.insert(reference.id) {
                return Err(FhirError::InvalidOrder(format!(
                    "record {} is listed twice",
                    reference.id
                )));
            }
        }

        let mut slots: Vec<Option<Record>> = self.records.into_iter().map(Some).collect();
        let mut ordered = Vec::with_capacity(slots.len());
        for reference in order {
            let slot = self.index[&reference.id];
            if let Some(record) = slots[slot].take() {
                ordered.push(record);
            }
        }
        Ok(ordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Address, FacilityRole, Organization, RecordBody};
    use crate::vocabulary::{Category, VocabularyResolver, VocabularyTable};
    use ndb_types::NonEmptyText;
    use std::sync::Arc;

    fn organization(id: u128) -> Record {
        let resolver = VocabularyResolver::new(Arc::new(
            VocabularyTable::builtin().expect("builtin table"),
        ));
        Record::new(
            LocalId::from_u128(id),
            RecordBody::Organization(Organization {
                role: FacilityRole::NotifierFacility,
                name: NonEmptyText::new("Kreiskrankenhaus").expect("name"),
                organization_type: resolver
                    .resolve(Category::OrganizationType, "hospital")
                    .expect("type"),
                identifier: None,
                address: Some(Address::default()),
                telecom: vec![],
                contact: None,
            }),
        )
    }

    #[test]
    fn insert_returns_reference_to_the_record() {
        let mut arena = RecordArena::new();
        let reference = arena.insert(organization(1)).expect("insert");
        assert_eq!(reference.kind(), RecordKind::Organization);
        assert_eq!(reference.id(), LocalId::from_u128(1));
        assert!(arena.get(&reference).is_some());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut arena = RecordArena::new();
        arena.insert(organization(1)).expect("first insert");
        let err = arena.insert(organization(1)).expect_err("duplicate id");
        assert!(matches!(err, FhirError::DuplicateLocalId(_)));
    }

    #[test]
    fn rejects_references_from_another_run() {
        let mut other = RecordArena::new();
        let foreign = other.insert(organization(7)).expect("insert");

        let mut arena = RecordArena::new();
        let record = Record::new(
            LocalId::from_u128(2),
            RecordBody::Person(crate::record::Person::practitioner(
                crate::record::PersonRole::Notifier,
                crate::record::HumanName {
                    prefix: None,
                    given: NonEmptyText::new("Ada").expect("given"),
                    family: NonEmptyText::new("Lovelace").expect("family"),
                },
                vec![],
                foreign,
            )),
        );
        let err = arena.insert(record).expect_err("dangling reference");
        match err {
            FhirError::DanglingReference { to, .. } => {
                assert_eq!(to, LocalId::from_u128(7).to_string())
            }
            other => panic!("expected DanglingReference, got {other:?}"),
        }
    }

    #[test]
    fn into_ordered_requires_a_permutation() {
        let mut arena = RecordArena::new();
        let first = arena.insert(organization(1)).expect("insert");
        let second = arena.insert(organization(2)).expect("insert");

        let ordered = arena.into_ordered(&[second, first]).expect("ordered");
        let ids: Vec<LocalId> = ordered.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![LocalId::from_u128(2), LocalId::from_u128(1)]);
    }

    #[test]
    fn into_ordered_rejects_missing_and_repeated_records() {
        let mut arena = RecordArena::new();
        let first = arena.insert(organization(1)).expect("insert");
        arena.insert(organization(2)).expect("insert");
        let err = arena.into_ordered(&[first]).expect_err("missing record");
        assert!(matches!(err, FhirError::InvalidOrder(_)));

        let mut arena = RecordArena::new();
        let first = arena.insert(organization(1)).expect("insert");
        arena.insert(organization(2)).expect("insert");
        let err = arena
            .into_ordered(&[first, first])
            .expect_err("repeated record");
        assert!(matches!(err, FhirError::InvalidOrder(msg) if msg.contains("twice")));
    }
}
