//! # Notification Core
//!
//! Document assembly for notifiable-disease reports.
//!
//! This crate turns a [`NotificationForm`] (disease, hospitalization or pathogen report) into
//! one referentially complete [`Bundle`]:
//! - vocabulary keys are resolved into codings through the configured table,
//! - conditional question/answer trees are built by [`AnswerTreeBuilder`],
//! - records are constructed by [`RecordFactory`] in dependency order,
//! - each flow emits its records in its own fixed order.
//!
//! **No API concerns**: HTTP handling, authentication and delivery of the finished document
//! belong to the caller. Assembly is a synchronous, side-effect-free function of the form and
//! the vocabulary table.

pub mod answers;
pub mod config;
pub mod constants;
pub mod error;
pub mod factory;
pub mod form;

mod assembler;
mod questionnaires;

pub use answers::AnswerTreeBuilder;
pub use config::CoreConfig;
pub use error::{NotificationError, NotificationResult};
pub use factory::RecordFactory;
pub use form::NotificationForm;

pub use fhir::Bundle;
pub use ndb_uuid::{IdSource, RandomIds, SequentialIds};

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Assembles notification forms into bundles.
///
/// The service holds only the shared configuration; it is cheap to clone and may be used from
/// any number of threads at once.
#[derive(Clone, Debug)]
pub struct NotificationService {
    cfg: Arc<CoreConfig>,
}

impl NotificationService {
    /// Creates a new notification service.
    ///
    /// # Arguments
    ///
    /// * `cfg` - Core configuration holding the vocabulary table
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Assembles `form` with random ids, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] if:
    /// - a required value is blank or missing ([`NotificationError::InputValidation`]),
    /// - a vocabulary key is unknown ([`NotificationError::VocabularyLookup`]),
    /// - the document violates its own invariants (defect variants).
    pub fn assemble(&self, form: &NotificationForm) -> NotificationResult<Bundle> {
        let mut ids = RandomIds;
        self.assemble_with(form, &mut ids, Utc::now())
    }

    /// Assembles `form` with ids drawn from `ids` and the given timestamp.
    ///
    /// Two calls over the same form with equivalent id sources and timestamps produce equal
    /// bundles.
    pub fn assemble_with(
        &self,
        form: &NotificationForm,
        ids: &mut dyn IdSource,
        timestamp: DateTime<Utc>,
    ) -> NotificationResult<Bundle> {
        let vocabulary = self.cfg.resolver();
        tracing::debug!(flow = %form.notification_type(), "assembling notification");
        let assembly = assembler::Assembly::new(&vocabulary, ids, timestamp);
        assembler::assemble(assembly, form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fhir::record::{Encounter, Immunization, QuestionnaireResponse, RecordKind};
    use fhir::{AnswerValue, RecordBody};
    use std::collections::HashSet;

    const DISEASE_MINIMAL: &str = include_str!("../fixtures/disease_minimal.json");
    const DISEASE_VACCINATIONS: &str = include_str!("../fixtures/disease_vaccinations.json");
    const HOSPITALIZATION_MAXIMAL: &str = include_str!("../fixtures/hospitalization_maximal.json");
    const PATHOGEN_BASIC: &str = include_str!("../fixtures/pathogen_basic.json");

    fn service() -> NotificationService {
        NotificationService::new(Arc::new(CoreConfig::builtin().expect("builtin config")))
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn assemble_json(json: &str) -> NotificationResult<Bundle> {
        let form = NotificationForm::parse_json(json)?;
        service().assemble_with(&form, &mut SequentialIds::new(), fixed_time())
    }

    fn assemble_value(value: serde_json::Value) -> NotificationResult<Bundle> {
        let form = NotificationForm::from_value(value)?;
        service().assemble_with(&form, &mut SequentialIds::new(), fixed_time())
    }

    fn fixture_value(json: &str) -> serde_json::Value {
        serde_json::from_str(json).expect("fixture json")
    }

    fn questionnaire<'b>(bundle: &'b Bundle, name: &str) -> &'b QuestionnaireResponse {
        bundle
            .records()
            .iter()
            .find_map(|record| match record.body() {
                RecordBody::QuestionnaireResponse(qr) if qr.questionnaire.ends_with(name) => {
                    Some(qr)
                }
                _ => None,
            })
            .unwrap_or_else(|| panic!("no questionnaire response for {name}"))
    }

    fn immunizations(bundle: &Bundle) -> Vec<&Immunization> {
        bundle
            .records()
            .iter()
            .filter_map(|record| match record.body() {
                RecordBody::Immunization(immunization) => Some(immunization),
                _ => None,
            })
            .collect()
    }

    fn assert_complete(bundle: &Bundle) {
        let ids: HashSet<_> = bundle.records().iter().map(|record| record.id()).collect();
        assert_eq!(ids.len(), bundle.len(), "local ids must be unique");
        assert!(!ids.contains(&bundle.id()));
        for record in bundle.records() {
            for reference in record.references() {
                assert!(
                    ids.contains(&reference.id()),
                    "{} points outside the bundle",
                    record.kind()
                );
            }
        }
    }

    #[test]
    fn minimal_disease_form_yields_seven_records() {
        let bundle = assemble_json(DISEASE_MINIMAL).expect("minimal disease bundle");

        assert_eq!(
            bundle.kinds(),
            vec![
                RecordKind::Composition,
                RecordKind::Person,
                RecordKind::Person,
                RecordKind::Organization,
                RecordKind::Condition,
                RecordKind::QuestionnaireResponse,
                RecordKind::QuestionnaireResponse,
            ]
        );
        assert_eq!(bundle.profile(), fhir::profile::BUNDLE_DISEASE);
        assert_eq!(bundle.timestamp(), fixed_time());
        assert_complete(&bundle);
    }

    #[test]
    fn maximal_hospitalization_form_follows_construction_order() {
        let bundle = assemble_json(HOSPITALIZATION_MAXIMAL).expect("hospitalization bundle");

        let mut expected = vec![
            RecordKind::Organization,
            RecordKind::Person,
            RecordKind::Organization,
            RecordKind::Organization,
            RecordKind::Person,
            RecordKind::Condition,
            RecordKind::Organization,
            RecordKind::Encounter,
            RecordKind::Encounter,
        ];
        expected.extend([RecordKind::Immunization; 4]);
        expected.extend([
            RecordKind::QuestionnaireResponse,
            RecordKind::QuestionnaireResponse,
            RecordKind::Composition,
        ]);
        assert_eq!(bundle.kinds(), expected);
        assert_eq!(bundle.len(), 16);
        assert_complete(&bundle);
    }

    #[test]
    fn intensive_care_stay_is_part_of_the_hospital_stay() {
        let bundle = assemble_json(HOSPITALIZATION_MAXIMAL).expect("hospitalization bundle");
        let records = bundle.records();

        let encounters: Vec<(&fhir::Record, &Encounter)> = records
            .iter()
            .filter_map(|record| match record.body() {
                RecordBody::Encounter(encounter) => Some((record, encounter)),
                _ => None,
            })
            .collect();
        let [(stay_record, stay), (_, icu)] = encounters.as_slice() else {
            panic!("expected two encounters, got {}", encounters.len());
        };

        assert_eq!(stay.class.code(), "IMP");
        assert_eq!(icu.class.code(), "ACUTE");
        assert_eq!(icu.part_of.map(|r| r.id()), Some(stay_record.id()));
        assert!(stay.service_provider.is_some());
        assert_eq!(stay.service_provider, icu.service_provider);
    }

    #[test]
    fn common_questionnaire_points_at_built_records() {
        let bundle = assemble_json(HOSPITALIZATION_MAXIMAL).expect("hospitalization bundle");
        let common = questionnaire(&bundle, crate::constants::QUESTIONNAIRE_DISEASE_COMMON);

        let hospitalized = common.find("hospitalized").expect("hospitalized item");
        assert!(hospitalized.find("hospitalizedGroup").is_some());
        assert!(matches!(
            common.find("hospitalizedEncounter").and_then(|i| i.value()),
            Some(AnswerValue::Reference(r)) if r.kind() == RecordKind::Encounter
        ));
        let intensive_care = common.find("intensiveCareEncounter");
        assert!(matches!(
            intensive_care.and_then(|i| i.value()),
            Some(AnswerValue::Reference(r)) if r.kind() == RecordKind::Encounter
        ));
        assert!(matches!(
            common.find("labSpecimenLab").and_then(|i| i.value()),
            Some(AnswerValue::Reference(r)) if r.kind() == RecordKind::Organization
        ));
        assert!(matches!(
            common.find("placeExposureRegion").and_then(|i| i.value()),
            Some(AnswerValue::Coding(coding)) if coding.code() == "AT"
        ));

        let specific = questionnaire(&bundle, crate::constants::QUESTIONNAIRE_DISEASE_SPECIFIC);
        let immunization = specific.find("immunization").expect("immunization item");
        let group = immunization
            .find("immunizationGroup")
            .expect("immunization group");
        assert_eq!(group.children().len(), 4);
    }

    #[test]
    fn unknown_exposure_region_names_the_context() {
        let mut value = fixture_value(DISEASE_MINIMAL);
        value["common"] = serde_json::json!({
            "placeExposure": "YES",
            "placeExposureDetail": { "region": "invalid" }
        });

        let err = assemble_value(value).expect_err("unknown region");
        assert_eq!(
            err.to_string(),
            "invalid geographic region for place exposure: invalid"
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn undated_vaccine_outside_the_register_is_dropped() {
        let bundle = assemble_json(DISEASE_VACCINATIONS).expect("vaccination bundle");

        let vaccines: Vec<&str> = immunizations(&bundle)
            .iter()
            .map(|immunization| immunization.vaccine.code())
            .collect();
        assert_eq!(vaccines, vec!["EU/1/06/337", "EU/1/06/337"]);

        let specific = questionnaire(&bundle, crate::constants::QUESTIONNAIRE_DISEASE_SPECIFIC);
        let group = specific
            .find("immunizationGroup")
            .expect("immunization group");
        assert_eq!(group.children().len(), 2);
        assert_complete(&bundle);
    }

    #[test]
    fn dated_vaccine_outside_the_register_is_kept() {
        let mut value = fixture_value(DISEASE_VACCINATIONS);
        value["specific"]["vaccinations"] =
            serde_json::json!([{ "vaccine": "otherVaccine", "date": "2022-03-01" }]);

        let bundle = assemble_value(value).expect("vaccination bundle");
        let kept = immunizations(&bundle);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].vaccine.code(), "otherVaccine");
        assert_eq!(
            kept[0].occurrence.map(|date| date.to_string()).as_deref(),
            Some("2022-03-01")
        );

        let specific = questionnaire(&bundle, crate::constants::QUESTIONNAIRE_DISEASE_SPECIFIC);
        let group = specific
            .find("immunizationGroup")
            .expect("immunization group");
        assert_eq!(group.children().len(), 1);
        assert_complete(&bundle);
    }

    #[test]
    fn vaccinations_are_ignored_unless_immunized() {
        let mut value = fixture_value(DISEASE_VACCINATIONS);
        value["specific"]["immunizationStatus"] = serde_json::json!("NO");

        let bundle = assemble_value(value).expect("bundle");
        assert!(immunizations(&bundle).is_empty());
    }

    #[test]
    fn affirmative_answer_without_detail_has_no_children() {
        let mut value = fixture_value(DISEASE_MINIMAL);
        value["common"] = serde_json::json!({ "hospitalized": "YES", "labAssigned": "YES" });

        let bundle = assemble_value(value).expect("bundle");
        assert_eq!(bundle.len(), 7);

        let common = questionnaire(&bundle, crate::constants::QUESTIONNAIRE_DISEASE_COMMON);
        let hospitalized = common.find("hospitalized").expect("hospitalized item");
        assert!(hospitalized.children().is_empty());
        assert!(common.find("labSpecimenLab").is_none());
    }

    #[test]
    fn assembly_is_deterministic_for_fixed_ids_and_time() {
        let first = assemble_json(HOSPITALIZATION_MAXIMAL).expect("first run");
        let second = assemble_json(HOSPITALIZATION_MAXIMAL).expect("second run");

        assert_eq!(first, second);
        assert_eq!(
            first.render_json().expect("render first"),
            second.render_json().expect("render second")
        );
    }

    #[test]
    fn random_ids_differ_between_runs() {
        let form = NotificationForm::parse_json(DISEASE_MINIMAL).expect("form");
        let service = service();
        let first = service.assemble(&form).expect("first");
        let second = service.assemble(&form).expect("second");
        assert_ne!(first.id(), second.id());
        assert_eq!(first.kinds(), second.kinds());
    }

    #[test]
    fn pathogen_form_yields_laboratory_bundle() {
        let bundle = assemble_json(PATHOGEN_BASIC).expect("pathogen bundle");

        let mut expected = vec![
            RecordKind::Composition,
            RecordKind::Person,
            RecordKind::Person,
            RecordKind::Organization,
            RecordKind::Person,
            RecordKind::Organization,
            RecordKind::Specimen,
            RecordKind::Specimen,
        ];
        expected.extend([RecordKind::Observation; 4]);
        expected.extend([
            RecordKind::DiagnosticReport,
            RecordKind::QuestionnaireResponse,
        ]);
        assert_eq!(bundle.kinds(), expected);
        assert_eq!(bundle.profile(), fhir::profile::BUNDLE_LABORATORY);
        assert_complete(&bundle);
    }

    #[test]
    fn pathogen_form_requires_a_submitter() {
        let mut value = fixture_value(PATHOGEN_BASIC);
        value
            .as_object_mut()
            .expect("object")
            .remove("submitter");

        let err = assemble_value(value).expect_err("missing submitter");
        match err {
            NotificationError::InputValidation(msg) => assert!(msg.contains("submitter")),
            other => panic!("expected InputValidation, got {other:?}"),
        }
    }

    #[test]
    fn submitting_facility_address_is_rejected_outside_laboratory_reports() {
        let mut value = fixture_value(DISEASE_MINIMAL);
        value["notifiedPerson"]["currentAddress"] =
            serde_json::json!({ "addressType": "submittingFacility" });

        let err = assemble_value(value).expect_err("no submitting facility");
        match err {
            NotificationError::InputValidation(msg) => {
                assert!(msg.contains("submittingFacility"), "message was {msg}")
            }
            other => panic!("expected InputValidation, got {other:?}"),
        }
    }

    #[test]
    fn other_facility_address_adds_an_organization() {
        let mut value = fixture_value(DISEASE_MINIMAL);
        value["notifiedPerson"]["currentAddress"] = serde_json::json!({
            "addressType": "otherFacility",
            "facility": { "name": "Seniorenresidenz Am See", "organizationType": "nursingHome" }
        });

        let bundle = assemble_value(value).expect("bundle");
        assert_eq!(bundle.len(), 8);
        assert_eq!(bundle.kinds()[4], RecordKind::Organization);
        assert_complete(&bundle);
    }

    #[test]
    fn unknown_disease_is_a_client_error() {
        let mut value = fixture_value(DISEASE_MINIMAL);
        value["condition"]["disease"] = serde_json::json!("flu");

        let err = assemble_value(value).expect_err("unknown disease");
        assert!(err.is_client_error());
        assert!(matches!(err, NotificationError::VocabularyLookup { .. }));
    }

    #[test]
    fn blank_organization_type_is_an_input_error() {
        let mut value = fixture_value(DISEASE_MINIMAL);
        value["notifier"]["facility"]["organizationType"] = serde_json::json!("  ");

        let err = assemble_value(value).expect_err("blank organization type");
        match err {
            NotificationError::InputValidation(msg) => {
                assert_eq!(msg, "notifier facility organization type cannot be blank")
            }
            other => panic!("expected InputValidation, got {other:?}"),
        }
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn service_and_config_are_send_and_sync() {
        assert_send_sync::<NotificationService>();
        assert_send_sync::<CoreConfig>();
        assert_send_sync::<Bundle>();
    }

    #[test]
    fn concurrent_assembly_shares_one_vocabulary_table() {
        let service = service();
        let fixtures = [
            DISEASE_MINIMAL,
            HOSPITALIZATION_MAXIMAL,
            PATHOGEN_BASIC,
            DISEASE_VACCINATIONS,
        ];
        let forms: Vec<NotificationForm> = fixtures
            .iter()
            .map(|json| NotificationForm::parse_json(json).expect("form"))
            .collect();
        let sequential: Vec<Bundle> = forms
            .iter()
            .map(|form| {
                service
                    .assemble_with(form, &mut SequentialIds::new(), fixed_time())
                    .expect("sequential run")
            })
            .collect();

        let concurrent: Vec<Bundle> = std::thread::scope(|scope| {
            let handles: Vec<_> = forms
                .iter()
                .map(|form| {
                    let service = service.clone();
                    scope.spawn(move || {
                        service.assemble_with(form, &mut SequentialIds::new(), fixed_time())
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .expect("assembly thread")
                        .expect("concurrent run")
                })
                .collect()
        });

        assert_eq!(concurrent, sequential);
    }
}
