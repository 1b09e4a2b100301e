//! Disease notification flow.
//!
//! The composition comes first, followed by the people, the facilities and then the clinical
//! records in the order they support the composition's sections.

use super::clinical::{self, HospitalRecord};
use super::Assembly;
use crate::constants::TITLE_DISEASE;
use crate::form::ClinicalForm;
use crate::NotificationResult;
use fhir::profile;
use fhir::vocabulary::NotificationType;
use fhir::Bundle;

pub(super) fn assemble(
    mut assembly: Assembly<'_>,
    form: &ClinicalForm,
) -> NotificationResult<Bundle> {
    let records = clinical::build(&mut assembly, form, HospitalRecord::Omit)?;
    let composition = clinical::composition(
        &mut assembly,
        NotificationType::Disease,
        TITLE_DISEASE,
        &records,
    )?;

    let mut order = vec![
        composition,
        records.notified_person,
        records.notifier,
        records.notifier_facility,
    ];
    order.extend(records.other_facility);
    order.extend(records.lab);
    order.extend(records.infection_protection);
    order.push(records.condition);
    order.extend(records.hospitalization);
    order.extend(records.intensive_care);
    order.extend(records.immunizations.iter().copied());
    order.push(records.common);
    order.push(records.specific);

    assembly.finish(NotificationType::Disease, profile::BUNDLE_DISEASE, &order)
}
