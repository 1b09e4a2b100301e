//! Hospitalization notification flow.
//!
//! Unlike the disease flow, the hospital becomes an organization record of its own and the
//! encounters name it as their service provider. Records are emitted in construction order,
//! so the composition comes last.

use super::clinical::{self, HospitalRecord};
use super::Assembly;
use crate::constants::TITLE_HOSPITALIZATION;
use crate::form::ClinicalForm;
use crate::NotificationResult;
use fhir::profile;
use fhir::vocabulary::NotificationType;
use fhir::Bundle;

pub(super) fn assemble(
    mut assembly: Assembly<'_>,
    form: &ClinicalForm,
) -> NotificationResult<Bundle> {
    let records = clinical::build(&mut assembly, form, HospitalRecord::Emit)?;
    let composition = clinical::composition(
        &mut assembly,
        NotificationType::Hospitalization,
        TITLE_HOSPITALIZATION,
        &records,
    )?;

    let mut order = vec![records.notifier_facility, records.notifier];
    order.extend(records.lab);
    order.extend(records.infection_protection);
    order.extend(records.other_facility);
    order.push(records.notified_person);
    order.push(records.condition);
    order.extend(records.hospital);
    order.extend(records.hospitalization);
    order.extend(records.intensive_care);
    order.extend(records.immunizations.iter().copied());
    order.push(records.common);
    order.push(records.specific);
    order.push(composition);

    assembly.finish(
        NotificationType::Hospitalization,
        profile::BUNDLE_DISEASE,
        &order,
    )
}
