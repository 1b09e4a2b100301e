//! Output records of a notification document.
//!
//! A [`Record`] is one node of the assembled document: a kind-specific [`RecordBody`], a local
//! id unique within the assembly run, and the profile URL of its kind. Records are built once
//! from fully-resolved values and never mutated afterwards; codings come from the vocabulary
//! resolver and references from [`crate::RecordArena`].
//!
//! Person and organization records are further distinguished by role, which selects their
//! profile and how they render.

use crate::answer::AnswerItem;
use crate::profile;
use crate::{Coding, Reference};
use chrono::{DateTime, Utc};
use ndb_types::{NonEmptyText, PartialDate};
use ndb_uuid::LocalId;
use serde::Deserialize;
use std::fmt;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Kind tag of a [`Record`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Person,
    Organization,
    Encounter,
    Condition,
    Specimen,
    Observation,
    Immunization,
    QuestionnaireResponse,
    DiagnosticReport,
    Composition,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Person => "Person",
            RecordKind::Organization => "Organization",
            RecordKind::Encounter => "Encounter",
            RecordKind::Condition => "Condition",
            RecordKind::Specimen => "Specimen",
            RecordKind::Observation => "Observation",
            RecordKind::Immunization => "Immunization",
            RecordKind::QuestionnaireResponse => "QuestionnaireResponse",
            RecordKind::DiagnosticReport => "DiagnosticReport",
            RecordKind::Composition => "Composition",
        };
        f.write_str(name)
    }
}

/// A human name. Given and family names are mandatory on every person record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HumanName {
    pub prefix: Option<NonEmptyText>,
    pub given: NonEmptyText,
    pub family: NonEmptyText,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Telecom {
    Phone(NonEmptyText),
    Email(NonEmptyText),
}

/// Postal address. The country is a geographic-region coding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Address {
    pub street: Option<NonEmptyText>,
    pub house_number: Option<NonEmptyText>,
    pub postal_code: Option<NonEmptyText>,
    pub city: Option<NonEmptyText>,
    pub country: Option<Coding>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PersonRole {
    NotifiedPerson,
    Notifier,
    Submitter,
}

/// An address of the notified person.
///
/// The current address is either written out or given as the address of a facility record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PersonAddress {
    Residence(Address),
    Current(Address),
    CurrentAt(Reference),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Person {
    pub role: PersonRole,
    pub name: HumanName,
    pub gender: Option<Coding>,
    pub birth_date: Option<PartialDate>,
    pub telecom: Vec<Telecom>,
    pub addresses: Vec<PersonAddress>,
    /// Facility a notifier or submitter acts for.
    pub organization: Option<Reference>,
}

impl Person {
    /// The person the notification is about.
    pub fn notified(
        name: HumanName,
        gender: Coding,
        birth_date: Option<PartialDate>,
        addresses: Vec<PersonAddress>,
    ) -> Self {
        Self {
            role: PersonRole::NotifiedPerson,
            name,
            gender: Some(gender),
            birth_date,
            telecom: Vec::new(),
            addresses,
            organization: None,
        }
    }

    /// A notifier or submitter acting for `organization`.
    pub fn practitioner(
        role: PersonRole,
        name: HumanName,
        telecom: Vec<Telecom>,
        organization: Reference,
    ) -> Self {
        Self {
            role,
            name,
            gender: None,
            birth_date: None,
            telecom,
            addresses: Vec::new(),
            organization: Some(organization),
        }
    }
}

/// Why an organization appears in the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FacilityRole {
    NotifierFacility,
    SubmittingFacility,
    Laboratory,
    Hospital,
    InfectionProtection,
    OtherFacility,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Organization {
    pub role: FacilityRole,
    pub name: NonEmptyText,
    pub organization_type: Coding,
    pub identifier: Option<NonEmptyText>,
    pub address: Option<Address>,
    pub telecom: Vec<Telecom>,
    pub contact: Option<HumanName>,
}

/// Start and end of a stay. Either bound may be unknown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Period {
    pub start: Option<PartialDate>,
    pub end: Option<PartialDate>,
}

impl Period {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Encounter {
    pub class: Coding,
    pub subject: Reference,
    pub period: Period,
    pub service_provider: Option<Reference>,
    /// Enclosing stay, set on intensive-care encounters.
    pub part_of: Option<Reference>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Condition {
    pub code: Coding,
    pub subject: Reference,
    pub onset: Option<PartialDate>,
    pub recorded: Option<PartialDate>,
    pub evidence: Vec<Coding>,
    pub note: Option<NonEmptyText>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Specimen {
    pub material: Coding,
    pub subject: Reference,
    pub collected: Option<PartialDate>,
    pub received: Option<PartialDate>,
    pub collector: Option<Reference>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObservationKind {
    /// Detection of the notifiable pathogen.
    Detection,
    /// Susceptibility of the pathogen to a substance.
    Resistance,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Observation {
    pub kind: ObservationKind,
    pub code: Coding,
    pub value: Option<NonEmptyText>,
    pub interpretation: Coding,
    pub method: Option<Coding>,
    pub subject: Reference,
    pub specimen: Reference,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Immunization {
    pub vaccine: Coding,
    pub subject: Reference,
    pub occurrence: Option<PartialDate>,
    pub note: Option<NonEmptyText>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionnaireResponse {
    pub questionnaire: String,
    pub subject: Reference,
    pub items: Vec<AnswerItem>,
}

impl QuestionnaireResponse {
    /// Finds an item anywhere in the response by link id.
    pub fn find(&self, link_id: &str) -> Option<&AnswerItem> {
        self.items.iter().find_map(|item| item.find(link_id))
    }
}

/// Status of a laboratory report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Final,
    Preliminary,
    Amended,
}

impl ReportStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Final => "final",
            ReportStatus::Preliminary => "preliminary",
            ReportStatus::Amended => "amended",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticReport {
    pub code: Coding,
    pub status: ReportStatus,
    pub subject: Reference,
    pub issued: Option<PartialDate>,
    pub specimens: Vec<Reference>,
    pub results: Vec<Reference>,
    pub conclusion_code: Coding,
    pub conclusion: Option<NonEmptyText>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub code: Coding,
    pub entries: Vec<Reference>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Composition {
    pub notification_type: Coding,
    pub subject: Reference,
    pub author: Reference,
    pub date: DateTime<Utc>,
    pub title: String,
    pub identifier: LocalId,
    pub sections: Vec<Section>,
}

/// Kind-specific content of a [`Record`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordBody {
    Person(Person),
    Organization(Organization),
    Encounter(Encounter),
    Condition(Condition),
    Specimen(Specimen),
    Observation(Observation),
    Immunization(Immunization),
    QuestionnaireResponse(QuestionnaireResponse),
    DiagnosticReport(DiagnosticReport),
    Composition(Composition),
}

impl RecordBody {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordBody::Person(_) => RecordKind::Person,
            RecordBody::Organization(_) => RecordKind::Organization,
            RecordBody::Encounter(_) => RecordKind::Encounter,
            RecordBody::Condition(_) => RecordKind::Condition,
            RecordBody::Specimen(_) => RecordKind::Specimen,
            RecordBody::Observation(_) => RecordKind::Observation,
            RecordBody::Immunization(_) => RecordKind::Immunization,
            RecordBody::QuestionnaireResponse(_) => RecordKind::QuestionnaireResponse,
            RecordBody::DiagnosticReport(_) => RecordKind::DiagnosticReport,
            RecordBody::Composition(_) => RecordKind::Composition,
        }
    }

    fn profile(&self) -> &'static str {
        match self {
            RecordBody::Person(person) => match person.role {
                PersonRole::NotifiedPerson => profile::NOTIFIED_PERSON,
                PersonRole::Notifier => profile::NOTIFIER_ROLE,
                PersonRole::Submitter => profile::SUBMITTING_ROLE,
            },
            RecordBody::Organization(organization) => match organization.role {
                FacilityRole::NotifierFacility => profile::NOTIFIER_FACILITY,
                FacilityRole::SubmittingFacility => profile::SUBMITTING_FACILITY,
                FacilityRole::Laboratory
                | FacilityRole::Hospital
                | FacilityRole::InfectionProtection
                | FacilityRole::OtherFacility => profile::NOTIFIED_PERSON_FACILITY,
            },
            RecordBody::Encounter(_) => profile::HOSPITALIZATION,
            RecordBody::Condition(_) => profile::DISEASE,
            RecordBody::Specimen(_) => profile::SPECIMEN,
            RecordBody::Observation(observation) => match observation.kind {
                ObservationKind::Detection => profile::PATHOGEN_DETECTION,
                ObservationKind::Resistance => profile::RESISTANCE_RESULT,
            },
            RecordBody::Immunization(_) => profile::IMMUNIZATION,
            RecordBody::QuestionnaireResponse(_) => profile::QUESTIONNAIRE_RESPONSE,
            RecordBody::DiagnosticReport(_) => profile::LABORATORY_REPORT,
            RecordBody::Composition(_) => profile::NOTIFICATION,
        }
    }
}

/// One node of an assembled document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    id: LocalId,
    profile: &'static str,
    body: RecordBody,
}

impl Record {
    /// Wraps `body` with its local id, stamping the profile of its kind and role.
    pub fn new(id: LocalId, body: RecordBody) -> Self {
        Self {
            id,
            profile: body.profile(),
            body,
        }
    }

    pub fn id(&self) -> LocalId {
        self.id
    }

    pub fn kind(&self) -> RecordKind {
        self.body.kind()
    }

    pub fn profile(&self) -> &'static str {
        self.profile
    }

    pub fn body(&self) -> &RecordBody {
        &self.body
    }

    /// Every record this one points at, in field order.
    pub fn references(&self) -> Vec<Reference> {
        let mut out = Vec::new();
        match &self.body {
            RecordBody::Person(person) => {
                for address in &person.addresses {
                    if let PersonAddress::CurrentAt(facility) = address {
                        out.push(*facility);
                    }
                }
                out.extend(person.organization);
            }
            RecordBody::Organization(_) => {}
            RecordBody::Encounter(encounter) => {
                out.push(encounter.subject);
                out.extend(encounter.service_provider);
                out.extend(encounter.part_of);
            }
            RecordBody::Condition(condition) => out.push(condition.subject),
            RecordBody::Specimen(specimen) => {
                out.push(specimen.subject);
                out.extend(specimen.collector);
            }
            RecordBody::Observation(observation) => {
                out.push(observation.subject);
                out.push(observation.specimen);
            }
            RecordBody::Immunization(immunization) => out.push(immunization.subject),
            RecordBody::QuestionnaireResponse(response) => {
                out.push(response.subject);
                for item in &response.items {
                    out.extend(item.references());
                }
            }
            RecordBody::DiagnosticReport(report) => {
                out.push(report.subject);
                out.extend(report.specimens.iter().copied());
                out.extend(report.results.iter().copied());
            }
            RecordBody::Composition(composition) => {
                out.push(composition.subject);
                out.push(composition.author);
                for section in &composition.sections {
                    out.extend(section.entries.iter().copied());
                }
            }
        }
        out
    }
}
