//! Records shared by the disease and hospitalization flows.

use super::{AddressTargets, Assembly};
use crate::form::{ClinicalForm, Vaccination};
use crate::questionnaires::{self, CommonReferences};
use crate::NotificationResult;
use fhir::profile;
use fhir::record::{FacilityRole, Period, PersonRole};
use fhir::vocabulary::{Category, EncounterClass, NotificationType, Origin, SectionKind};
use fhir::Reference;

/// Whether the hospital of a stay becomes an organization record of its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum HospitalRecord {
    Emit,
    Omit,
}

/// References to everything built for a clinical notification, before the composition.
#[derive(Clone, Debug)]
pub(super) struct ClinicalRecords {
    pub notifier_facility: Reference,
    pub notifier: Reference,
    pub lab: Option<Reference>,
    pub infection_protection: Option<Reference>,
    pub other_facility: Option<Reference>,
    pub notified_person: Reference,
    pub condition: Reference,
    pub hospital: Option<Reference>,
    pub hospitalization: Option<Reference>,
    pub intensive_care: Option<Reference>,
    pub immunizations: Vec<Reference>,
    pub common: Reference,
    pub specific: Reference,
}

/// Builds every record of a clinical notification except the composition.
pub(super) fn build(
    assembly: &mut Assembly<'_>,
    form: &ClinicalForm,
    hospital_record: HospitalRecord,
) -> NotificationResult<ClinicalRecords> {
    let common = &form.common;
    let specific = &form.specific;

    tracing::debug!("building facilities");
    let (notifier_facility, notifier) = assembly.acting_person(
        &form.notifier,
        FacilityRole::NotifierFacility,
        PersonRole::Notifier,
        "notifier facility",
    )?;

    let lab = match (common.lab_assigned.is_yes(), &common.lab) {
        (true, Some(lab)) => {
            Some(assembly.facility(FacilityRole::Laboratory, lab, "laboratory", None)?)
        }
        _ => None,
    };

    let infection_protection = match (
        common.infection_protection_facility.is_yes(),
        &common.infection_protection_facility_stay,
    ) {
        (true, Some(stay)) => Some(assembly.facility(
            FacilityRole::InfectionProtection,
            &stay.facility,
            "infection protection facility",
            None,
        )?),
        _ => None,
    };

    let other_facility = assembly.other_facility(&form.notified_person)?;

    tracing::debug!("building notified person");
    let notified_person = assembly.notified_person(
        &form.notified_person,
        AddressTargets {
            notifier_facility: Some(notifier_facility),
            other_facility,
            submitting_facility: None,
        },
    )?;

    tracing::debug!("building clinical records");
    let condition = {
        let code = assembly.resolve(Category::Disease, "condition", &form.condition.disease)?;
        let evidence = form
            .condition
            .symptoms
            .iter()
            .map(|symptom| assembly.resolve(Category::Symptom, "condition symptom", symptom))
            .collect::<NotificationResult<Vec<_>>>()?;
        assembly.factory().condition(
            code,
            notified_person,
            form.condition.onset,
            form.condition.recorded,
            evidence,
            form.condition.note.as_deref(),
        )?
    };

    let stay = common
        .hospitalization
        .as_ref()
        .filter(|_| common.hospitalized.is_yes());

    let hospital = match (hospital_record, stay) {
        (HospitalRecord::Emit, Some(stay)) => Some(assembly.facility(
            FacilityRole::Hospital,
            &stay.hospital,
            "hospital",
            None,
        )?),
        _ => None,
    };

    let (hospitalization, intensive_care) = match stay {
        Some(stay) => {
            let inpatient = assembly.resolve_key(EncounterClass::Inpatient)?;
            let hospitalization = assembly.factory().encounter(
                inpatient,
                notified_person,
                Period {
                    start: stay.begin,
                    end: stay.end,
                },
                hospital,
                None,
            )?;

            let intensive_care = match (stay.intensive_care.is_yes(), &stay.intensive_care_stay) {
                (true, Some(icu)) => {
                    let class = assembly.resolve_key(EncounterClass::IntensiveCare)?;
                    Some(assembly.factory().encounter(
                        class,
                        notified_person,
                        Period {
                            start: icu.begin,
                            end: icu.end,
                        },
                        hospital,
                        Some(hospitalization),
                    )?)
                }
                _ => None,
            };
            (Some(hospitalization), intensive_care)
        }
        None => (None, None),
    };

    let immunizations = if specific.immunization_status.is_yes() {
        immunizations(assembly, &specific.vaccinations, notified_person)?
    } else {
        Vec::new()
    };

    tracing::debug!("building questionnaire responses");
    let common_items = questionnaires::disease_common(
        assembly,
        common,
        CommonReferences {
            lab,
            hospitalization,
            intensive_care,
            infection_protection,
        },
    )?;
    let common = assembly.factory().questionnaire_response(
        profile::questionnaire(crate::constants::QUESTIONNAIRE_DISEASE_COMMON),
        notified_person,
        common_items,
    )?;

    let specific_items = questionnaires::disease_specific(assembly, specific, &immunizations)?;
    let specific = assembly.factory().questionnaire_response(
        profile::questionnaire(crate::constants::QUESTIONNAIRE_DISEASE_SPECIFIC),
        notified_person,
        specific_items,
    )?;

    Ok(ClinicalRecords {
        notifier_facility,
        notifier,
        lab,
        infection_protection,
        other_facility,
        notified_person,
        condition,
        hospital,
        hospitalization,
        intensive_care,
        immunizations,
        common,
        specific,
    })
}

/// Builds the composition of a clinical notification.
pub(super) fn composition(
    assembly: &mut Assembly<'_>,
    notification_type: NotificationType,
    title: &str,
    records: &ClinicalRecords,
) -> NotificationResult<Reference> {
    let sections = vec![
        assembly.section(SectionKind::Diagnosis, vec![records.condition])?,
        assembly.section(SectionKind::CommonInformation, vec![records.common])?,
        assembly.section(SectionKind::SpecificInformation, vec![records.specific])?,
    ];
    assembly.composition(
        notification_type,
        records.notified_person,
        records.notifier,
        title,
        sections,
    )
}

/// One immunization per vaccination, except vaccines outside the community register that
/// come without a date; those are dropped.
fn immunizations(
    assembly: &mut Assembly<'_>,
    vaccinations: &[Vaccination],
    subject: Reference,
) -> NotificationResult<Vec<Reference>> {
    let mut out = Vec::with_capacity(vaccinations.len());
    for vaccination in vaccinations {
        let vaccine =
            assembly.resolve_entry(Category::Vaccine, "vaccination", &vaccination.vaccine)?;
        if vaccine.origin != Origin::Primary && vaccination.date.is_none() {
            tracing::debug!(
                vaccine = vaccination.vaccine.as_str(),
                "dropping undated vaccination outside the community register"
            );
            continue;
        }
        out.push(assembly.factory().immunization(
            vaccine.coding,
            subject,
            vaccination.date,
            vaccination.note.as_deref(),
        )?);
    }
    Ok(out)
}
