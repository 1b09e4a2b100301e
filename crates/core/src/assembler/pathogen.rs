//! Pathogen (laboratory report) notification flow.

use super::{AddressTargets, Assembly};
use crate::constants::{QUESTIONNAIRE_LABORATORY_CONTEXT, TITLE_PATHOGEN};
use crate::factory::{ObservationParts, ReportParts};
use crate::form::{LaboratoryContext, PathogenForm};
use crate::questionnaires;
use crate::{NotificationError, NotificationResult};
use fhir::profile;
use fhir::record::{FacilityRole, ObservationKind, PersonRole};
use fhir::vocabulary::{Category, NotificationType, SectionKind};
use fhir::{Bundle, Reference};

pub(super) fn assemble(
    mut assembly: Assembly<'_>,
    form: &PathogenForm,
) -> NotificationResult<Bundle> {
    let submitter = form.submitter.as_ref().ok_or_else(|| {
        NotificationError::InputValidation(
            "submitter is required for laboratory reports".into(),
        )
    })?;
    if form.specimens.is_empty() {
        return Err(NotificationError::InputValidation(
            "laboratory reports need at least one specimen".into(),
        ));
    }

    tracing::debug!("building facilities");
    let (notifier_facility, notifier) = assembly.acting_person(
        &form.notifier,
        FacilityRole::NotifierFacility,
        PersonRole::Notifier,
        "notifier facility",
    )?;
    let (submitting_facility, submitter) = assembly.acting_person(
        submitter,
        FacilityRole::SubmittingFacility,
        PersonRole::Submitter,
        "submitting facility",
    )?;
    let other_facility = assembly.other_facility(&form.notified_person)?;

    tracing::debug!("building notified person");
    let notified_person = assembly.notified_person(
        &form.notified_person,
        AddressTargets {
            notifier_facility: Some(notifier_facility),
            other_facility,
            submitting_facility: Some(submitting_facility),
        },
    )?;

    tracing::debug!(specimens = form.specimens.len(), "building laboratory records");
    let pathogen = assembly.resolve(Category::Pathogen, "laboratory report", &form.pathogen)?;

    let mut specimens = Vec::with_capacity(form.specimens.len());
    for specimen in &form.specimens {
        let material =
            assembly.resolve(Category::SpecimenMaterial, "specimen", &specimen.material)?;
        specimens.push(assembly.factory().specimen(
            material,
            notified_person,
            specimen.collected,
            specimen.received,
            Some(submitter),
        )?);
    }

    let mut observations = Vec::new();
    for (specimen, specimen_ref) in form.specimens.iter().zip(specimens.iter().copied()) {
        for result in &specimen.results {
            let method = assembly.resolve(Category::TestMethod, "test result", &result.method)?;
            let parts = ObservationParts {
                kind: ObservationKind::Detection,
                code: pathogen.clone(),
                value: result.value.clone(),
                interpretation: assembly.resolve_key(result.interpretation)?,
                method: Some(method),
            };
            let observation = assembly
                .factory()
                .observation(parts, notified_person, specimen_ref)?;
            observations.push(observation);
        }
        for resistance in &specimen.resistances {
            let parts = ObservationParts {
                kind: ObservationKind::Resistance,
                code: assembly.resolve(Category::Substance, "resistance", &resistance.substance)?,
                value: None,
                interpretation: assembly.resolve_key(resistance.interpretation)?,
                method: None,
            };
            let observation = assembly
                .factory()
                .observation(parts, notified_person, specimen_ref)?;
            observations.push(observation);
        }
    }

    let report = ReportParts {
        code: pathogen,
        status: form.report.status,
        issued: form.report.issued,
        conclusion_code: assembly.resolve(
            Category::Conclusion,
            "laboratory report",
            &form.report.conclusion,
        )?,
        conclusion: form.report.note.clone(),
    };
    let diagnostic_report = assembly.factory().diagnostic_report(
        report,
        notified_person,
        specimens.clone(),
        observations.clone(),
    )?;

    tracing::debug!("building questionnaire responses");
    let default_context = LaboratoryContext::default();
    let context = form.context.as_ref().unwrap_or(&default_context);
    let context_items = questionnaires::laboratory_context(&assembly, context)?;
    let laboratory_context = assembly.factory().questionnaire_response(
        profile::questionnaire(QUESTIONNAIRE_LABORATORY_CONTEXT),
        notified_person,
        context_items,
    )?;

    let sections = vec![
        assembly.section(SectionKind::LaboratoryReport, vec![diagnostic_report])?,
        assembly.section(SectionKind::LaboratoryContext, vec![laboratory_context])?,
    ];
    let composition = assembly.composition(
        NotificationType::Pathogen,
        notified_person,
        notifier,
        TITLE_PATHOGEN,
        sections,
    )?;

    let mut order: Vec<Reference> = vec![
        composition,
        notified_person,
        notifier,
        notifier_facility,
        submitter,
        submitting_facility,
    ];
    order.extend(other_facility);
    order.extend(specimens);
    order.extend(observations);
    order.push(diagnostic_report);
    order.push(laboratory_context);

    assembly.finish(NotificationType::Pathogen, profile::BUNDLE_LABORATORY, &order)
}
