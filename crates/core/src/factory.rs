//! Typed record constructors.
//!
//! [`RecordFactory`] owns the [`RecordArena`] and the id source of one assembly run. Every
//! constructor takes already-resolved codings and references, validates the free-text parts
//! that must carry content (person and organization names), stamps a fresh local id and stores
//! the record. The returned [`Reference`] is the only handle later records can use to point at
//! it.

use crate::form::{AddressInput, Contact, Facility};
use crate::{NotificationError, NotificationResult};
use chrono::{DateTime, Utc};
use fhir::record::{
    Address, Composition, Condition, DiagnosticReport, Encounter, FacilityRole, HumanName,
    Immunization, Observation, ObservationKind, Organization, Period, Person, PersonAddress,
    PersonRole, QuestionnaireResponse, ReportStatus, Section, Specimen, Telecom,
};
use fhir::{AnswerItem, Coding, Record, RecordArena, RecordBody, Reference};
use ndb_types::{NonEmptyText, PartialDate};
use ndb_uuid::{IdSource, LocalId};

/// Resolved inputs of an observation.
#[derive(Clone, Debug)]
pub struct ObservationParts {
    pub kind: ObservationKind,
    pub code: Coding,
    pub value: Option<String>,
    pub interpretation: Coding,
    pub method: Option<Coding>,
}

/// Resolved inputs of a laboratory report.
#[derive(Clone, Debug)]
pub struct ReportParts {
    pub code: Coding,
    pub status: ReportStatus,
    pub issued: Option<PartialDate>,
    pub conclusion_code: Coding,
    pub conclusion: Option<String>,
}

pub struct RecordFactory<'a> {
    ids: &'a mut dyn IdSource,
    arena: RecordArena,
}

impl<'a> RecordFactory<'a> {
    pub fn new(ids: &'a mut dyn IdSource) -> Self {
        Self {
            ids,
            arena: RecordArena::new(),
        }
    }

    /// A fresh id that is not attached to a record (bundle and composition identifiers).
    pub fn fresh_id(&mut self) -> LocalId {
        self.ids.next_id()
    }

    pub fn record(&self, reference: &Reference) -> Option<&Record> {
        self.arena.get(reference)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Releases the built records in `order`, which must list each of them exactly once.
    pub fn finish(self, order: &[Reference]) -> NotificationResult<Vec<Record>> {
        Ok(self.arena.into_ordered(order)?)
    }

    fn store(&mut self, body: RecordBody) -> NotificationResult<Reference> {
        let record = Record::new(self.ids.next_id(), body);
        Ok(self.arena.insert(record)?)
    }

    /// A facility record.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::InputValidation`] if the facility name is blank.
    pub fn organization(
        &mut self,
        role: FacilityRole,
        facility: &Facility,
        organization_type: Coding,
        country: Option<Coding>,
        contact: Option<&Contact>,
    ) -> NotificationResult<Reference> {
        let name = required_text(&facility.name, "facility name")?;
        let contact = contact.map(human_name).transpose()?;

        self.store(RecordBody::Organization(Organization {
            role,
            name,
            organization_type,
            identifier: NonEmptyText::optional(facility.identifier.as_deref()),
            address: facility
                .address
                .as_ref()
                .map(|address| to_address(address, country)),
            telecom: telecom(facility.phone.as_deref(), facility.email.as_deref()),
            contact,
        }))
    }

    /// A notifier or submitter acting for `organization`.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::InputValidation`] if the given or family name is blank.
    pub fn practitioner(
        &mut self,
        role: PersonRole,
        contact: &Contact,
        organization: Reference,
    ) -> NotificationResult<Reference> {
        let name = human_name(contact)?;
        let telecom = telecom(contact.phone.as_deref(), contact.email.as_deref());
        self.store(RecordBody::Person(Person::practitioner(
            role,
            name,
            telecom,
            organization,
        )))
    }

    /// The person the notification is about.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::InputValidation`] if the given or family name is blank.
    pub fn notified_person(
        &mut self,
        given: &str,
        family: &str,
        gender: Coding,
        birth_date: Option<PartialDate>,
        addresses: Vec<PersonAddress>,
    ) -> NotificationResult<Reference> {
        let name = HumanName {
            prefix: None,
            given: required_text(given, "notified person given name")?,
            family: required_text(family, "notified person family name")?,
        };
        self.store(RecordBody::Person(Person::notified(
            name, gender, birth_date, addresses,
        )))
    }

    pub fn encounter(
        &mut self,
        class: Coding,
        subject: Reference,
        period: Period,
        service_provider: Option<Reference>,
        part_of: Option<Reference>,
    ) -> NotificationResult<Reference> {
        self.store(RecordBody::Encounter(Encounter {
            class,
            subject,
            period,
            service_provider,
            part_of,
        }))
    }

    pub fn condition(
        &mut self,
        code: Coding,
        subject: Reference,
        onset: Option<PartialDate>,
        recorded: Option<PartialDate>,
        evidence: Vec<Coding>,
        note: Option<&str>,
    ) -> NotificationResult<Reference> {
        self.store(RecordBody::Condition(Condition {
            code,
            subject,
            onset,
            recorded,
            evidence,
            note: NonEmptyText::optional(note),
        }))
    }

    pub fn specimen(
        &mut self,
        material: Coding,
        subject: Reference,
        collected: Option<PartialDate>,
        received: Option<PartialDate>,
        collector: Option<Reference>,
    ) -> NotificationResult<Reference> {
        self.store(RecordBody::Specimen(Specimen {
            material,
            subject,
            collected,
            received,
            collector,
        }))
    }

    pub fn observation(
        &mut self,
        parts: ObservationParts,
        subject: Reference,
        specimen: Reference,
    ) -> NotificationResult<Reference> {
        self.store(RecordBody::Observation(Observation {
            kind: parts.kind,
            code: parts.code,
            value: NonEmptyText::optional(parts.value.as_deref()),
            interpretation: parts.interpretation,
            method: parts.method,
            subject,
            specimen,
        }))
    }

    pub fn immunization(
        &mut self,
        vaccine: Coding,
        subject: Reference,
        occurrence: Option<PartialDate>,
        note: Option<&str>,
    ) -> NotificationResult<Reference> {
        self.store(RecordBody::Immunization(Immunization {
            vaccine,
            subject,
            occurrence,
            note: NonEmptyText::optional(note),
        }))
    }

    pub fn questionnaire_response(
        &mut self,
        questionnaire: String,
        subject: Reference,
        items: Vec<AnswerItem>,
    ) -> NotificationResult<Reference> {
        self.store(RecordBody::QuestionnaireResponse(QuestionnaireResponse {
            questionnaire,
            subject,
            items,
        }))
    }

    pub fn diagnostic_report(
        &mut self,
        parts: ReportParts,
        subject: Reference,
        specimens: Vec<Reference>,
        results: Vec<Reference>,
    ) -> NotificationResult<Reference> {
        self.store(RecordBody::DiagnosticReport(DiagnosticReport {
            code: parts.code,
            status: parts.status,
            subject,
            issued: parts.issued,
            specimens,
            results,
            conclusion_code: parts.conclusion_code,
            conclusion: NonEmptyText::optional(parts.conclusion.as_deref()),
        }))
    }

    pub fn composition(
        &mut self,
        notification_type: Coding,
        subject: Reference,
        author: Reference,
        date: DateTime<Utc>,
        title: &str,
        sections: Vec<Section>,
    ) -> NotificationResult<Reference> {
        let identifier = self.fresh_id();
        self.store(RecordBody::Composition(Composition {
            notification_type,
            subject,
            author,
            date,
            title: title.to_string(),
            identifier,
            sections,
        }))
    }
}

fn required_text(value: &str, field: &str) -> NotificationResult<NonEmptyText> {
    NonEmptyText::new(value)
        .map_err(|_| NotificationError::InputValidation(format!("{field} cannot be blank")))
}

fn human_name(contact: &Contact) -> NotificationResult<HumanName> {
    Ok(HumanName {
        prefix: NonEmptyText::optional(contact.salutation.as_deref()),
        given: required_text(&contact.given, "contact given name")?,
        family: required_text(&contact.family, "contact family name")?,
    })
}

fn telecom(phone: Option<&str>, email: Option<&str>) -> Vec<Telecom> {
    NonEmptyText::optional(phone)
        .map(Telecom::Phone)
        .into_iter()
        .chain(NonEmptyText::optional(email).map(Telecom::Email))
        .collect()
}

/// Converts a form address; `country` is the already-resolved region coding.
pub(crate) fn to_address(address: &AddressInput, country: Option<Coding>) -> Address {
    Address {
        street: NonEmptyText::optional(address.street.as_deref()),
        house_number: NonEmptyText::optional(address.house_number.as_deref()),
        postal_code: NonEmptyText::optional(address.postal_code.as_deref()),
        city: NonEmptyText::optional(address.city.as_deref()),
        country,
    }
}
