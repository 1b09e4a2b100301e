//! The assembled document.

use crate::record::{Record, RecordKind};
use crate::wire::{self, BundleWire, EntryWire, IdentifierWire, MetaWire};
use crate::{FhirError, FhirResult};
use chrono::{DateTime, SecondsFormat, Utc};
use ndb_uuid::LocalId;
use std::collections::HashSet;

/// Ordered, referentially complete document of records.
///
/// A bundle can only be built through [`Bundle::document`], which re-checks that local ids are
/// unique and that every reference resolves to a record in the same bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bundle {
    id: LocalId,
    timestamp: DateTime<Utc>,
    profile: &'static str,
    records: Vec<Record>,
}

impl Bundle {
    /// Builds a `document` bundle from records in their final order.
    ///
    /// # Arguments
    ///
    /// * `id` - Fresh identifier of the bundle.
    /// * `timestamp` - Assembly time.
    /// * `profile` - Bundle profile URL of the notification flow.
    /// * `records` - Records in output order.
    ///
    /// # Errors
    ///
    /// - [`FhirError::DuplicateLocalId`] if two records share a local id, or a record reuses
    ///   the bundle id.
    /// - [`FhirError::DanglingReference`] if a record points outside the bundle.
    pub fn document(
        id: LocalId,
        timestamp: DateTime<Utc>,
        profile: &'static str,
        records: Vec<Record>,
    ) -> FhirResult<Self> {
        let mut ids = HashSet::with_capacity(records.len() + 1);
        ids.insert(id);
        for record in &records {
            if !ids.insert(record.id()) {
                return Err(FhirError::DuplicateLocalId(record.id().to_string()));
            }
        }

        for record in &records {
            if let Some(target) = record
                .references()
                .into_iter()
                .find(|target| target.id() == id || !ids.contains(&target.id()))
            {
                return Err(FhirError::DanglingReference {
                    from: record.id().to_string(),
                    to: target.id().to_string(),
                });
            }
        }

        Ok(Self {
            id,
            timestamp,
            profile,
            records,
        })
    }

    pub fn id(&self) -> LocalId {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn profile(&self) -> &'static str {
        self.profile
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Kinds of the records in output order.
    pub fn kinds(&self) -> Vec<RecordKind> {
        self.records.iter().map(Record::kind).collect()
    }

    /// Renders the bundle as a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Translation`] if serialization fails.
    pub fn to_json_value(&self) -> FhirResult<serde_json::Value> {
        serde_json::to_value(self.to_wire())
            .map_err(|e| FhirError::Translation(format!("failed to render bundle: {e}")))
    }

    /// Renders the bundle as pretty-printed JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Translation`] if serialization fails.
    pub fn render_json(&self) -> FhirResult<String> {
        serde_json::to_string_pretty(&self.to_wire())
            .map_err(|e| FhirError::Translation(format!("failed to render bundle: {e}")))
    }

    fn to_wire(&self) -> BundleWire {
        let timestamp = self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
        BundleWire {
            resource_type: "Bundle",
            id: self.id.to_string(),
            meta: MetaWire {
                last_updated: Some(timestamp.clone()),
                profile: vec![self.profile.to_string()],
            },
            identifier: IdentifierWire {
                system: Some(wire::BUNDLE_ID_SYSTEM.to_string()),
                value: self.id.to_string(),
            },
            bundle_type: "document",
            timestamp,
            entry: self
                .records
                .iter()
                .map(|record| EntryWire {
                    full_url: record.id().urn(),
                    resource: wire::resource(record),
                })
                .collect(),
        }
    }
}
