//! Item sets of the questionnaire responses.
//!
//! Item order is fixed per questionnaire and follows the order of the questions below.

use crate::assembler::Assembly;
use crate::form::{CommonInformation, LaboratoryContext, SpecificInformation};
use crate::NotificationResult;
use fhir::vocabulary::Category;
use fhir::{AnswerItem, Reference};

/// Records the common questionnaire points at, when they were built.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct CommonReferences {
    pub lab: Option<Reference>,
    pub hospitalization: Option<Reference>,
    pub intensive_care: Option<Reference>,
    pub infection_protection: Option<Reference>,
}

/// Common clinical and epidemiological questions of disease notifications.
pub(crate) fn disease_common(
    assembly: &Assembly<'_>,
    common: &CommonInformation,
    refs: CommonReferences,
) -> NotificationResult<Vec<AnswerItem>> {
    let answers = assembly.answers();
    let mut items = Vec::new();

    items.push(answers.conditional_group(
        "isDead",
        common.died,
        common.death.as_ref(),
        |death| Ok(answers.date("deathDate", death.date).into_iter().collect()),
    )?);

    if let Some(affiliation) = assembly.resolve_optional(
        Category::MilitaryAffiliation,
        "military affiliation",
        common.military_affiliation.as_deref(),
    )? {
        items.push(answers.coding("militaryAffiliation", affiliation));
    }

    items.push(answers.conditional_group(
        "labSpecimenTaken",
        common.lab_assigned,
        refs.lab,
        |lab| Ok(vec![answers.reference("labSpecimenLab", lab)]),
    )?);

    let stay = common.hospitalization.as_ref().zip(refs.hospitalization);
    items.push(answers.conditional_group(
        "hospitalized",
        common.hospitalized,
        stay,
        |(stay, encounter)| {
            let intensive_care = answers.conditional_group(
                "intensiveCare",
                stay.intensive_care,
                refs.intensive_care,
                |icu| Ok(vec![answers.reference("intensiveCareEncounter", icu)]),
            )?;
            Ok(vec![
                answers.reference("hospitalizedEncounter", encounter),
                intensive_care,
            ])
        },
    )?);

    let facility_stay = common
        .infection_protection_facility_stay
        .as_ref()
        .zip(refs.infection_protection);
    items.push(answers.conditional_group(
        "infectProtectFacility",
        common.infection_protection_facility,
        facility_stay,
        |(stay, organization)| {
            let role = assembly.resolve(
                Category::InfectionProtectionRole,
                "infection protection facility",
                &stay.role,
            )?;
            let mut children = Vec::new();
            children.extend(answers.date("infectProtectFacilityBegin", stay.begin));
            children.extend(answers.date("infectProtectFacilityEnd", stay.end));
            children.push(answers.coding("infectProtectFacilityRole", role));
            children.push(
                answers.reference("infectProtectFacilityOrganization", organization),
            );
            Ok(children)
        },
    )?);

    items.push(answers.conditional_group(
        "placeExposure",
        common.place_exposure,
        common.place_exposure_detail.as_ref(),
        |detail| assembly.place_exposure_items(detail),
    )?);

    items.push(answers.tri_state("organDonation", common.organ_donation));
    items.extend(answers.text(
        "additionalInformation",
        common.additional_information.as_deref(),
    ));

    Ok(items)
}

/// Disease-specific questions.
pub(crate) fn disease_specific(
    assembly: &Assembly<'_>,
    specific: &SpecificInformation,
    immunizations: &[Reference],
) -> NotificationResult<Vec<AnswerItem>> {
    let answers = assembly.answers();
    let mut items = Vec::new();

    items.push(answers.conditional_group(
        "infectionSource",
        specific.infection_source,
        specific.infection_source_detail.as_ref(),
        |detail| {
            let mut children = Vec::new();
            if let Some(environment) = assembly.resolve_optional(
                Category::InfectionEnvironment,
                "infection source",
                detail.environment.as_deref(),
            )? {
                children.push(answers.coding("infectionSourceEnvironment", environment));
            }
            children.extend(answers.text("infectionSourceNote", detail.note.as_deref()));
            Ok(children)
        },
    )?);

    if let Some(environment) = assembly.resolve_optional(
        Category::InfectionEnvironment,
        "infection environment",
        specific.infection_environment.as_deref(),
    )? {
        items.push(answers.coding("infectionEnvironmentSetting", environment));
    }

    let recorded = (!immunizations.is_empty()).then_some(immunizations);
    items.push(answers.conditional_group(
        "immunization",
        specific.immunization_status,
        recorded,
        |immunizations| {
            Ok(immunizations
                .iter()
                .map(|immunization| answers.reference("immunizationRef", *immunization))
                .collect())
        },
    )?);

    Ok(items)
}

/// Clinical context of a laboratory report.
pub(crate) fn laboratory_context(
    assembly: &Assembly<'_>,
    context: &LaboratoryContext,
) -> NotificationResult<Vec<AnswerItem>> {
    let answers = assembly.answers();
    Ok(vec![
        answers.tri_state("hospitalized", context.hospitalized),
        answers.tri_state("immunizationStatus", context.immunization_status),
        answers.tri_state("infectProtectFacility", context.infection_protection_facility),
        answers.conditional_group(
            "placeExposure",
            context.place_exposure,
            context.place_exposure_detail.as_ref(),
            |detail| assembly.place_exposure_items(detail),
        )?,
    ])
}
