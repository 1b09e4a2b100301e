//! Per-flow document assembly.
//!
//! Each flow runs one linear pass over its form:
//!
//! 1. facilities and the people acting for them,
//! 2. the notified person, whose current address may point at a facility from step 1,
//! 3. clinical or laboratory records,
//! 4. questionnaire responses referencing steps 1 to 3,
//! 5. the composition, then the bundle in the flow's record order.
//!
//! Records are constructed in dependency order through [`RecordFactory`], so every reference
//! points backwards. The output order is chosen separately per flow. Any failure aborts the
//! whole call; there is no partial output.

mod clinical;
mod disease;
mod hospitalization;
mod pathogen;

use crate::answers::AnswerTreeBuilder;
use crate::factory::{to_address, RecordFactory};
use crate::form::{
    AddressInput, Contact, CurrentAddress, ExposurePlace, Facility, NotificationForm,
    NotifiedPerson, Notifier,
};
use crate::{NotificationError, NotificationResult};
use chrono::{DateTime, Utc};
use fhir::record::{FacilityRole, PersonAddress, PersonRole, Section};
use fhir::vocabulary::{
    Category, NotificationType, Resolved, SectionKind, VocabularyError, VocabularyKey,
};
use fhir::{AnswerItem, Bundle, Coding, Reference, VocabularyResolver};
use ndb_uuid::IdSource;

/// Assembles `form` into a bundle.
pub(crate) fn assemble(
    assembly: Assembly<'_>,
    form: &NotificationForm,
) -> NotificationResult<Bundle> {
    match form {
        NotificationForm::Disease(body) => disease::assemble(assembly, body),
        NotificationForm::Hospitalization(body) => hospitalization::assemble(assembly, body),
        NotificationForm::Pathogen(body) => pathogen::assemble(assembly, body),
    }
}

/// Facilities a current address may point at.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct AddressTargets {
    pub notifier_facility: Option<Reference>,
    pub other_facility: Option<Reference>,
    pub submitting_facility: Option<Reference>,
}

/// State of one assembly run.
pub(crate) struct Assembly<'a> {
    vocabulary: &'a VocabularyResolver,
    answers: AnswerTreeBuilder<'a>,
    factory: RecordFactory<'a>,
    timestamp: DateTime<Utc>,
}

impl<'a> Assembly<'a> {
    pub(crate) fn new(
        vocabulary: &'a VocabularyResolver,
        ids: &'a mut dyn IdSource,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            vocabulary,
            answers: AnswerTreeBuilder::new(vocabulary),
            factory: RecordFactory::new(ids),
            timestamp,
        }
    }

    pub(crate) fn answers(&self) -> AnswerTreeBuilder<'a> {
        self.answers
    }

    pub(crate) fn factory(&mut self) -> &mut RecordFactory<'a> {
        &mut self.factory
    }

    /// Looks `key` up, naming `context` in the error when the category rejects it.
    pub(crate) fn resolve(
        &self,
        category: Category,
        context: &'static str,
        key: &str,
    ) -> NotificationResult<Coding> {
        self.resolve_entry(category, context, key)
            .map(|resolved| resolved.coding)
    }

    pub(crate) fn resolve_entry(
        &self,
        category: Category,
        context: &'static str,
        key: &str,
    ) -> NotificationResult<Resolved> {
        if key.trim().is_empty() {
            return Err(NotificationError::InputValidation(format!(
                "{context} {category} cannot be blank"
            )));
        }
        self.vocabulary
            .resolve_entry(category, key)
            .map_err(|err| NotificationError::from_lookup(err, context))
    }

    pub(crate) fn resolve_optional(
        &self,
        category: Category,
        context: &'static str,
        key: Option<&str>,
    ) -> NotificationResult<Option<Coding>> {
        key.filter(|k| !k.trim().is_empty())
            .map(|k| self.resolve(category, context, k))
            .transpose()
    }

    /// Resolves an enum value; a missing mapping is a defect, never a client error.
    pub(crate) fn resolve_key<K: VocabularyKey>(&self, value: K) -> NotificationResult<Coding> {
        self.vocabulary.resolve_key(value).map_err(|err| match err {
            VocabularyError::Unmapped { category, key }
            | VocabularyError::NotFound { category, key } => NotificationError::Defect(format!(
                "no vocabulary entry for {category} value '{key}'"
            )),
            other => NotificationError::Defect(other.to_string()),
        })
    }

    pub(crate) fn address(
        &self,
        address: &AddressInput,
        context: &'static str,
    ) -> NotificationResult<fhir::record::Address> {
        let country = self.resolve_optional(
            Category::GeographicRegion,
            context,
            address.country.as_deref(),
        )?;
        Ok(to_address(address, country))
    }

    /// Builds an organization record for `facility`.
    pub(crate) fn facility(
        &mut self,
        role: FacilityRole,
        facility: &Facility,
        context: &'static str,
        contact: Option<&Contact>,
    ) -> NotificationResult<Reference> {
        let organization_type =
            self.resolve(Category::OrganizationType, context, &facility.organization_type)?;
        let country = match &facility.address {
            Some(address) => self.resolve_optional(
                Category::GeographicRegion,
                context,
                address.country.as_deref(),
            )?,
            None => None,
        };
        self.factory
            .organization(role, facility, organization_type, country, contact)
    }

    /// Builds the facility and then the person acting for it; returns `(facility, person)`.
    pub(crate) fn acting_person(
        &mut self,
        notifier: &Notifier,
        facility_role: FacilityRole,
        person_role: PersonRole,
        context: &'static str,
    ) -> NotificationResult<(Reference, Reference)> {
        let facility = self.facility(
            facility_role,
            &notifier.facility,
            context,
            Some(&notifier.contact),
        )?;
        let person = self
            .factory
            .practitioner(person_role, &notifier.contact, facility)?;
        Ok((facility, person))
    }

    /// Builds the facility named as the notified person's current address, if any.
    pub(crate) fn other_facility(
        &mut self,
        person: &NotifiedPerson,
    ) -> NotificationResult<Option<Reference>> {
        match &person.current_address {
            Some(CurrentAddress::OtherFacility { facility }) => self
                .facility(FacilityRole::OtherFacility, facility, "current address facility", None)
                .map(Some),
            _ => Ok(None),
        }
    }

    pub(crate) fn notified_person(
        &mut self,
        person: &NotifiedPerson,
        targets: AddressTargets,
    ) -> NotificationResult<Reference> {
        let gender = self.resolve_key(person.gender)?;

        let mut addresses = Vec::new();
        if let Some(residence) = &person.residence {
            addresses.push(PersonAddress::Residence(
                self.address(residence, "residence")?,
            ));
        }
        if let Some(current) = &person.current_address {
            addresses.push(self.current_address(current, targets)?);
        }

        self.factory.notified_person(
            &person.given,
            &person.family,
            gender,
            person.birth_date,
            addresses,
        )
    }

    fn current_address(
        &self,
        current: &CurrentAddress,
        targets: AddressTargets,
    ) -> NotificationResult<PersonAddress> {
        let target = match current {
            CurrentAddress::Ordinary { address } => {
                return Ok(PersonAddress::Current(
                    self.address(address, "current address")?,
                ))
            }
            CurrentAddress::NotifierFacility => targets.notifier_facility,
            CurrentAddress::OtherFacility { .. } => targets.other_facility,
            CurrentAddress::SubmittingFacility => targets.submitting_facility,
        };

        target.map(PersonAddress::CurrentAt).ok_or_else(|| {
            NotificationError::InputValidation(format!(
                "current address type {current_kind} is not available for this notification",
                current_kind = address_type_name(current)
            ))
        })
    }

    /// Detail items of a place-exposure answer.
    pub(crate) fn place_exposure_items(
        &self,
        detail: &ExposurePlace,
    ) -> NotificationResult<Vec<AnswerItem>> {
        let answers = self.answers;
        let region = self.resolve(Category::GeographicRegion, "place exposure", &detail.region)?;

        let mut items = Vec::new();
        items.extend(answers.date("placeExposureBegin", detail.begin));
        items.extend(answers.date("placeExposureEnd", detail.end));
        items.push(answers.coding("placeExposureRegion", region));
        items.extend(answers.text("placeExposureHint", detail.note.as_deref()));
        Ok(items)
    }

    pub(crate) fn section(
        &self,
        kind: SectionKind,
        entries: Vec<Reference>,
    ) -> NotificationResult<Section> {
        Ok(Section {
            title: kind.title().to_string(),
            code: self.resolve_key(kind)?,
            entries,
        })
    }

    pub(crate) fn composition(
        &mut self,
        notification_type: NotificationType,
        subject: Reference,
        author: Reference,
        title: &str,
        sections: Vec<Section>,
    ) -> NotificationResult<Reference> {
        let code = self.resolve_key(notification_type)?;
        let timestamp = self.timestamp;
        self.factory
            .composition(code, subject, author, timestamp, title, sections)
    }

    /// Releases the records in `order` as a bundle.
    pub(crate) fn finish(
        mut self,
        notification_type: NotificationType,
        profile: &'static str,
        order: &[Reference],
    ) -> NotificationResult<Bundle> {
        let id = self.factory.fresh_id();
        let records = self.factory.finish(order)?;
        let bundle = Bundle::document(id, self.timestamp, profile, records)?;
        tracing::info!(
            flow = %notification_type,
            records = bundle.len(),
            bundle_id = %bundle.id(),
            "assembled notification bundle"
        );
        Ok(bundle)
    }
}

fn address_type_name(current: &CurrentAddress) -> &'static str {
    match current {
        CurrentAddress::Ordinary { .. } => "ordinary",
        CurrentAddress::NotifierFacility => "notifierFacility",
        CurrentAddress::OtherFacility { .. } => "otherFacility",
        CurrentAddress::SubmittingFacility => "submittingFacility",
    }
}
