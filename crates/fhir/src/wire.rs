//! JSON wire shapes of assembled documents.
//!
//! These structs only exist to be serialized; they are built from the domain records on demand
//! by [`resource`] and never leave the crate. References render as `urn:uuid:<localId>` so they
//! resolve against the `fullUrl` of the bundle entries.

use crate::answer::{AnswerItem, AnswerValue};
use crate::record::{
    Address, Composition, Condition, DiagnosticReport, Encounter, HumanName, Immunization,
    Observation, Organization, Period, Person, PersonAddress, PersonRole, QuestionnaireResponse,
    Record, RecordBody, Specimen, Telecom,
};
use crate::{Coding, Reference};
use ndb_types::{DatePrecision, PartialDate};
use serde::Serialize;

const COMPOSITION_ID_SYSTEM: &str = "https://demis.rki.de/fhir/NamingSystem/NotificationId";
pub(crate) const BUNDLE_ID_SYSTEM: &str =
    "https://demis.rki.de/fhir/NamingSystem/NotificationBundleId";
const FACILITY_ADDRESS_EXTENSION: &str =
    "https://demis.rki.de/fhir/StructureDefinition/FacilityAddressNotifiedPerson";
const CONTAINED_PRACTITIONER_ID: &str = "practitioner";

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(tag = "resourceType")]
pub(crate) enum ResourceWire {
    Patient(PatientWire),
    PractitionerRole(PractitionerRoleWire),
    Organization(OrganizationWire),
    Encounter(EncounterWire),
    Condition(ConditionWire),
    Specimen(SpecimenWire),
    Observation(ObservationWire),
    Immunization(ImmunizationWire),
    QuestionnaireResponse(QuestionnaireResponseWire),
    DiagnosticReport(DiagnosticReportWire),
    Composition(CompositionWire),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MetaWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) last_updated: Option<String>,
    pub(crate) profile: Vec<String>,
}

impl MetaWire {
    fn profile(profile: &str) -> Self {
        Self {
            last_updated: None,
            profile: vec![profile.to_string()],
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ReferenceWire {
    reference: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CodeableConceptWire {
    coding: Vec<Coding>,
}

#[derive(Debug, Serialize)]
pub(crate) struct IdentifierWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) system: Option<String>,
    pub(crate) value: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct HumanNameWire {
    #[serde(rename = "use")]
    name_use: &'static str,
    family: String,
    given: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    prefix: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ContactPointWire {
    system: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExtensionWire {
    url: &'static str,
    value_reference: ReferenceWire,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddressWire {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    extension: Vec<ExtensionWire>,
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    address_use: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    line: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    country: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PeriodWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnnotationWire {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PatientWire {
    id: String,
    meta: MetaWire,
    name: Vec<HumanNameWire>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    birth_date: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    address: Vec<AddressWire>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContainedPractitionerWire {
    resource_type: &'static str,
    id: &'static str,
    name: Vec<HumanNameWire>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    telecom: Vec<ContactPointWire>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PractitionerRoleWire {
    id: String,
    meta: MetaWire,
    contained: Vec<ContainedPractitionerWire>,
    practitioner: ReferenceWire,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization: Option<ReferenceWire>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrganizationContactWire {
    name: HumanNameWire,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrganizationWire {
    id: String,
    meta: MetaWire,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    identifier: Vec<IdentifierWire>,
    #[serde(rename = "type")]
    organization_type: Vec<CodeableConceptWire>,
    name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    telecom: Vec<ContactPointWire>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    address: Vec<AddressWire>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    contact: Vec<OrganizationContactWire>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EncounterWire {
    id: String,
    meta: MetaWire,
    status: &'static str,
    class: Coding,
    subject: ReferenceWire,
    #[serde(skip_serializing_if = "Option::is_none")]
    period: Option<PeriodWire>,
    #[serde(skip_serializing_if = "Option::is_none")]
    service_provider: Option<ReferenceWire>,
    #[serde(skip_serializing_if = "Option::is_none")]
    part_of: Option<ReferenceWire>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EvidenceWire {
    code: Vec<CodeableConceptWire>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConditionWire {
    id: String,
    meta: MetaWire,
    code: CodeableConceptWire,
    subject: ReferenceWire,
    #[serde(skip_serializing_if = "Option::is_none")]
    onset_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recorded_date: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    evidence: Vec<EvidenceWire>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    note: Vec<AnnotationWire>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CollectionWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    collector: Option<ReferenceWire>,
    #[serde(skip_serializing_if = "Option::is_none")]
    collected_date_time: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SpecimenWire {
    id: String,
    meta: MetaWire,
    status: &'static str,
    #[serde(rename = "type")]
    specimen_type: CodeableConceptWire,
    subject: ReferenceWire,
    #[serde(skip_serializing_if = "Option::is_none")]
    received_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    collection: Option<CollectionWire>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ObservationWire {
    id: String,
    meta: MetaWire,
    status: &'static str,
    code: CodeableConceptWire,
    subject: ReferenceWire,
    #[serde(skip_serializing_if = "Option::is_none")]
    value_string: Option<String>,
    interpretation: Vec<CodeableConceptWire>,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<CodeableConceptWire>,
    specimen: ReferenceWire,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImmunizationWire {
    id: String,
    meta: MetaWire,
    status: &'static str,
    vaccine_code: CodeableConceptWire,
    patient: ReferenceWire,
    #[serde(skip_serializing_if = "Option::is_none")]
    occurrence_date_time: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    note: Vec<AnnotationWire>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ItemAnswerWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    value_coding: Option<Coding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value_reference: Option<ReferenceWire>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    item: Vec<ItemWire>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ItemWire {
    link_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    answer: Vec<ItemAnswerWire>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    item: Vec<ItemWire>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionnaireResponseWire {
    id: String,
    meta: MetaWire,
    questionnaire: String,
    status: &'static str,
    subject: ReferenceWire,
    item: Vec<ItemWire>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DiagnosticReportWire {
    id: String,
    meta: MetaWire,
    status: &'static str,
    code: CodeableConceptWire,
    subject: ReferenceWire,
    #[serde(skip_serializing_if = "Option::is_none")]
    issued: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    specimen: Vec<ReferenceWire>,
    result: Vec<ReferenceWire>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conclusion: Option<String>,
    conclusion_code: Vec<CodeableConceptWire>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SectionWire {
    title: String,
    code: CodeableConceptWire,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    entry: Vec<ReferenceWire>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompositionWire {
    id: String,
    meta: MetaWire,
    identifier: IdentifierWire,
    status: &'static str,
    #[serde(rename = "type")]
    composition_type: CodeableConceptWire,
    subject: ReferenceWire,
    date: String,
    author: Vec<ReferenceWire>,
    title: String,
    section: Vec<SectionWire>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EntryWire {
    pub(crate) full_url: String,
    pub(crate) resource: ResourceWire,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BundleWire {
    pub(crate) resource_type: &'static str,
    pub(crate) id: String,
    pub(crate) meta: MetaWire,
    pub(crate) identifier: IdentifierWire,
    #[serde(rename = "type")]
    pub(crate) bundle_type: &'static str,
    pub(crate) timestamp: String,
    pub(crate) entry: Vec<EntryWire>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

/// Renders one record into its wire shape.
pub(crate) fn resource(record: &Record) -> ResourceWire {
    let id = record.id().to_string();
    let meta = MetaWire::profile(record.profile());

    match record.body() {
        RecordBody::Person(person) => match person.role {
            PersonRole::NotifiedPerson => ResourceWire::Patient(patient(id, meta, person)),
            PersonRole::Notifier | PersonRole::Submitter => {
                ResourceWire::PractitionerRole(practitioner_role(id, meta, person))
            }
        },
        RecordBody::Organization(organization) => {
            ResourceWire::Organization(organization_wire(id, meta, organization))
        }
        RecordBody::Encounter(encounter) => {
            ResourceWire::Encounter(encounter_wire(id, meta, encounter))
        }
        RecordBody::Condition(condition) => {
            ResourceWire::Condition(condition_wire(id, meta, condition))
        }
        RecordBody::Specimen(specimen) => ResourceWire::Specimen(specimen_wire(id, meta, specimen)),
        RecordBody::Observation(observation) => {
            ResourceWire::Observation(observation_wire(id, meta, observation))
        }
        RecordBody::Immunization(immunization) => {
            ResourceWire::Immunization(immunization_wire(id, meta, immunization))
        }
        RecordBody::QuestionnaireResponse(response) => {
            ResourceWire::QuestionnaireResponse(questionnaire_response_wire(id, meta, response))
        }
        RecordBody::DiagnosticReport(report) => {
            ResourceWire::DiagnosticReport(diagnostic_report_wire(id, meta, report))
        }
        RecordBody::Composition(composition) => {
            ResourceWire::Composition(composition_wire(id, meta, composition))
        }
    }
}

pub(crate) fn reference(target: &Reference) -> ReferenceWire {
    ReferenceWire {
        reference: target.urn(),
    }
}

fn concept(coding: &Coding) -> CodeableConceptWire {
    CodeableConceptWire {
        coding: vec![coding.clone()],
    }
}

fn text(value: &impl AsRef<str>) -> String {
    value.as_ref().to_string()
}

fn date(value: &Option<PartialDate>) -> Option<String> {
    value.as_ref().map(PartialDate::to_string)
}

fn name_wire(name: &HumanName) -> HumanNameWire {
    HumanNameWire {
        name_use: "official",
        family: text(&name.family),
        given: vec![text(&name.given)],
        prefix: name.prefix.iter().map(text).collect(),
    }
}

fn telecom_wire(telecom: &[Telecom]) -> Vec<ContactPointWire> {
    telecom
        .iter()
        .map(|entry| match entry {
            Telecom::Phone(value) => ContactPointWire {
                system: "phone",
                value: text(value),
            },
            Telecom::Email(value) => ContactPointWire {
                system: "email",
                value: text(value),
            },
        })
        .collect()
}

fn address_wire(address: &Address, address_use: Option<&'static str>) -> AddressWire {
    let line = match (&address.street, &address.house_number) {
        (Some(street), Some(number)) => vec![format!("{street} {number}")],
        (Some(street), None) => vec![text(street)],
        _ => Vec::new(),
    };
    AddressWire {
        extension: Vec::new(),
        address_use,
        line,
        city: address.city.as_ref().map(text),
        postal_code: address.postal_code.as_ref().map(text),
        country: address.country.as_ref().map(|c| c.code().to_string()),
    }
}

fn patient(id: String, meta: MetaWire, person: &Person) -> PatientWire {
    let address = person
        .addresses
        .iter()
        .map(|entry| match entry {
            PersonAddress::Residence(address) => address_wire(address, Some("home")),
            PersonAddress::Current(address) => address_wire(address, Some("temp")),
            PersonAddress::CurrentAt(facility) => AddressWire {
                extension: vec![ExtensionWire {
                    url: FACILITY_ADDRESS_EXTENSION,
                    value_reference: reference(facility),
                }],
                address_use: Some("temp"),
                line: Vec::new(),
                city: None,
                postal_code: None,
                country: None,
            },
        })
        .collect();

    PatientWire {
        id,
        meta,
        name: vec![name_wire(&person.name)],
        gender: person.gender.as_ref().map(|g| g.code().to_string()),
        birth_date: date(&person.birth_date),
        address,
    }
}

fn practitioner_role(id: String, meta: MetaWire, person: &Person) -> PractitionerRoleWire {
    PractitionerRoleWire {
        id,
        meta,
        contained: vec![ContainedPractitionerWire {
            resource_type: "Practitioner",
            id: CONTAINED_PRACTITIONER_ID,
            name: vec![name_wire(&person.name)],
            telecom: telecom_wire(&person.telecom),
        }],
        practitioner: ReferenceWire {
            reference: format!("#{CONTAINED_PRACTITIONER_ID}"),
        },
        organization: person.organization.as_ref().map(reference),
    }
}

fn organization_wire(id: String, meta: MetaWire, organization: &Organization) -> OrganizationWire {
    OrganizationWire {
        id,
        meta,
        identifier: organization
            .identifier
            .iter()
            .map(|value| IdentifierWire {
                system: None,
                value: text(value),
            })
            .collect(),
        organization_type: vec![concept(&organization.organization_type)],
        name: text(&organization.name),
        telecom: telecom_wire(&organization.telecom),
        address: organization
            .address
            .iter()
            .map(|address| address_wire(address, None))
            .collect(),
        contact: organization
            .contact
            .iter()
            .map(|name| OrganizationContactWire {
                name: name_wire(name),
            })
            .collect(),
    }
}

fn period_wire(period: &Period) -> Option<PeriodWire> {
    if period.is_empty() {
        return None;
    }
    Some(PeriodWire {
        start: date(&period.start),
        end: date(&period.end),
    })
}

fn encounter_wire(id: String, meta: MetaWire, encounter: &Encounter) -> EncounterWire {
    EncounterWire {
        id,
        meta,
        status: if encounter.period.end.is_some() {
            "finished"
        } else {
            "in-progress"
        },
        class: encounter.class.clone(),
        subject: reference(&encounter.subject),
        period: period_wire(&encounter.period),
        service_provider: encounter.service_provider.as_ref().map(reference),
        part_of: encounter.part_of.as_ref().map(reference),
    }
}

fn condition_wire(id: String, meta: MetaWire, condition: &Condition) -> ConditionWire {
    ConditionWire {
        id,
        meta,
        code: concept(&condition.code),
        subject: reference(&condition.subject),
        onset_date_time: date(&condition.onset),
        recorded_date: date(&condition.recorded),
        evidence: condition
            .evidence
            .iter()
            .map(|symptom| EvidenceWire {
                code: vec![concept(symptom)],
            })
            .collect(),
        note: condition
            .note
            .iter()
            .map(|note| AnnotationWire { text: text(note) })
            .collect(),
    }
}

fn specimen_wire(id: String, meta: MetaWire, specimen: &Specimen) -> SpecimenWire {
    let collection = if specimen.collector.is_some() || specimen.collected.is_some() {
        Some(CollectionWire {
            collector: specimen.collector.as_ref().map(reference),
            collected_date_time: date(&specimen.collected),
        })
    } else {
        None
    };

    SpecimenWire {
        id,
        meta,
        status: "available",
        specimen_type: concept(&specimen.material),
        subject: reference(&specimen.subject),
        received_time: date(&specimen.received),
        collection,
    }
}

fn observation_wire(id: String, meta: MetaWire, observation: &Observation) -> ObservationWire {
    ObservationWire {
        id,
        meta,
        status: "final",
        code: concept(&observation.code),
        subject: reference(&observation.subject),
        value_string: observation.value.as_ref().map(text),
        interpretation: vec![concept(&observation.interpretation)],
        method: observation.method.as_ref().map(concept),
        specimen: reference(&observation.specimen),
    }
}

fn immunization_wire(id: String, meta: MetaWire, immunization: &Immunization) -> ImmunizationWire {
    ImmunizationWire {
        id,
        meta,
        status: "completed",
        vaccine_code: concept(&immunization.vaccine),
        patient: reference(&immunization.subject),
        occurrence_date_time: date(&immunization.occurrence),
        note: immunization
            .note
            .iter()
            .map(|note| AnnotationWire { text: text(note) })
            .collect(),
    }
}

fn item_wire(item: &AnswerItem) -> ItemWire {
    let children: Vec<ItemWire> = item.children().iter().map(item_wire).collect();

    match item.value() {
        None => ItemWire {
            link_id: item.link_id().to_string(),
            answer: Vec::new(),
            item: children,
        },
        Some(value) => {
            let mut answer = ItemAnswerWire {
                item: children,
                ..ItemAnswerWire::default()
            };
            match value {
                AnswerValue::Coding(coding) => answer.value_coding = Some(coding.clone()),
                AnswerValue::Text(value) => answer.value_string = Some(text(value)),
                AnswerValue::Date(value) if value.precision() == DatePrecision::DateTime => {
                    answer.value_date_time = Some(value.to_string())
                }
                AnswerValue::Date(value) => answer.value_date = Some(value.to_string()),
                AnswerValue::Reference(target) => answer.value_reference = Some(reference(target)),
            }
            ItemWire {
                link_id: item.link_id().to_string(),
                answer: vec![answer],
                item: Vec::new(),
            }
        }
    }
}

fn questionnaire_response_wire(
    id: String,
    meta: MetaWire,
    response: &QuestionnaireResponse,
) -> QuestionnaireResponseWire {
    QuestionnaireResponseWire {
        id,
        meta,
        questionnaire: response.questionnaire.clone(),
        status: "completed",
        subject: reference(&response.subject),
        item: response.items.iter().map(item_wire).collect(),
    }
}

fn diagnostic_report_wire(
    id: String,
    meta: MetaWire,
    report: &DiagnosticReport,
) -> DiagnosticReportWire {
    DiagnosticReportWire {
        id,
        meta,
        status: report.status.as_str(),
        code: concept(&report.code),
        subject: reference(&report.subject),
        issued: date(&report.issued),
        specimen: report.specimens.iter().map(reference).collect(),
        result: report.results.iter().map(reference).collect(),
        conclusion: report.conclusion.as_ref().map(text),
        conclusion_code: vec![concept(&report.conclusion_code)],
    }
}

fn composition_wire(id: String, meta: MetaWire, composition: &Composition) -> CompositionWire {
    CompositionWire {
        id,
        meta,
        identifier: IdentifierWire {
            system: Some(COMPOSITION_ID_SYSTEM.to_string()),
            value: composition.identifier.to_string(),
        },
        status: "final",
        composition_type: concept(&composition.notification_type),
        subject: reference(&composition.subject),
        date: composition.date.to_rfc3339(),
        author: vec![reference(&composition.author)],
        title: composition.title.clone(),
        section: composition
            .sections
            .iter()
            .map(|section| SectionWire {
                title: section.title.clone(),
                code: concept(&section.code),
                entry: section.entries.iter().map(reference).collect(),
            })
            .collect(),
    }
}
