//! Conditional question/answer trees.
//!
//! Questionnaire records answer a fixed list of questions. Many questions are a trigger (a
//! four-state answer) followed by detail questions that only make sense when the trigger is
//! affirmative, for example "hospitalized?" followed by the stay.
//!
//! [`AnswerTreeBuilder::conditional_group`] is the one place that decides whether such detail
//! is materialized:
//!
//! - trigger `YES` and detail present: the trigger item carries a nested `<linkId>Group` with the
//!   detail items,
//! - anything else: the trigger item alone.
//!
//! A `YES` trigger without detail is not an error; the detail is omitted and the omission is
//! logged at debug level.

use crate::constants::GROUP_SUFFIX;
use crate::NotificationResult;
use fhir::{AnswerItem, AnswerValue, Coding, Reference, VocabularyResolver};
use ndb_types::{Answer, NonEmptyText, PartialDate};

/// Builds [`AnswerItem`] trees from form values.
#[derive(Clone, Copy, Debug)]
pub struct AnswerTreeBuilder<'a> {
    vocabulary: &'a VocabularyResolver,
}

impl<'a> AnswerTreeBuilder<'a> {
    pub fn new(vocabulary: &'a VocabularyResolver) -> Self {
        Self { vocabulary }
    }

    /// An answered item without children.
    pub fn leaf(&self, link_id: &str, value: AnswerValue) -> AnswerItem {
        AnswerItem::leaf(link_id, value)
    }

    /// A four-state answer, coded through the fixed answer mapping.
    pub fn tri_state(&self, link_id: &str, answer: Answer) -> AnswerItem {
        self.leaf(
            link_id,
            AnswerValue::Coding(self.vocabulary.resolve_tri_state(answer)),
        )
    }

    pub fn coding(&self, link_id: &str, coding: Coding) -> AnswerItem {
        self.leaf(link_id, AnswerValue::Coding(coding))
    }

    pub fn reference(&self, link_id: &str, target: Reference) -> AnswerItem {
        self.leaf(link_id, AnswerValue::Reference(target))
    }

    /// A date item, or nothing when the date is unknown.
    pub fn date(&self, link_id: &str, date: Option<PartialDate>) -> Option<AnswerItem> {
        date.map(|d| self.leaf(link_id, AnswerValue::Date(d)))
    }

    /// A free-text item, or nothing when the text is absent or blank.
    pub fn text(&self, link_id: &str, text: Option<&str>) -> Option<AnswerItem> {
        NonEmptyText::optional(text)
            .map(|t| self.leaf(link_id, AnswerValue::Text(t)))
    }

    /// The trigger item for `link_id`, with the detail group when it applies.
    ///
    /// # Arguments
    ///
    /// * `link_id` - Link id of the trigger question.
    /// * `trigger` - Answer to the trigger question.
    /// * `detail` - Optional detail block gated by the trigger.
    /// * `children` - Builds the detail items; only called when the group is materialized.
    ///
    /// # Errors
    ///
    /// Propagates any error from `children`.
    pub fn conditional_group<D, F>(
        &self,
        link_id: &str,
        trigger: Answer,
        detail: Option<D>,
        children: F,
    ) -> NotificationResult<AnswerItem>
    where
        F: FnOnce(D) -> NotificationResult<Vec<AnswerItem>>,
    {
        let value = AnswerValue::Coding(self.vocabulary.resolve_tri_state(trigger));

        match (trigger.is_yes(), detail) {
            (true, Some(detail)) => {
                let group =
                    AnswerItem::group(format!("{link_id}{GROUP_SUFFIX}"), children(detail)?);
                Ok(AnswerItem::answered(link_id, value, vec![group]))
            }
            (true, None) => {
                tracing::debug!(link_id, "affirmative answer without detail, omitting group");
                Ok(AnswerItem::leaf(link_id, value))
            }
            (false, _) => Ok(AnswerItem::leaf(link_id, value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NotificationError;
    use fhir::VocabularyTable;
    use std::sync::Arc;

    fn resolver() -> VocabularyResolver {
        VocabularyResolver::new(Arc::new(VocabularyTable::builtin().expect("builtin table")))
    }

    fn hint_items(builder: &AnswerTreeBuilder<'_>, hint: &str) -> Vec<AnswerItem> {
        builder
            .text("placeExposureHint", Some(hint))
            .into_iter()
            .collect()
    }

    #[test]
    fn affirmative_trigger_with_detail_nests_a_group() {
        let vocabulary = resolver();
        let builder = AnswerTreeBuilder::new(&vocabulary);

        let item = builder
            .conditional_group("placeExposure", Answer::Yes, Some("camping"), |hint| {
                Ok(hint_items(&builder, hint))
            })
            .expect("group");

        assert_eq!(item.children().len(), 1);
        let group = &item.children()[0];
        assert_eq!(group.link_id(), "placeExposureGroup");
        assert!(group.value().is_none());
        assert_eq!(group.children()[0].link_id(), "placeExposureHint");
    }

    #[test]
    fn affirmative_trigger_without_detail_has_no_children() {
        let vocabulary = resolver();
        let builder = AnswerTreeBuilder::new(&vocabulary);

        let item = builder
            .conditional_group("placeExposure", Answer::Yes, None::<&str>, |_| {
                panic!("children must not be built without detail")
            })
            .expect("suppressed group");

        assert!(item.children().is_empty());
        assert_eq!(
            item.value(),
            Some(&AnswerValue::Coding(vocabulary.resolve_tri_state(Answer::Yes)))
        );
    }

    #[test]
    fn non_affirmative_triggers_ignore_detail() {
        let vocabulary = resolver();
        let builder = AnswerTreeBuilder::new(&vocabulary);

        for trigger in [Answer::No, Answer::Indeterminate, Answer::Unknown] {
            let item = builder
                .conditional_group("placeExposure", trigger, Some("camping"), |hint| {
                    Ok(hint_items(&builder, hint))
                })
                .expect("leaf");
            assert!(item.children().is_empty(), "{trigger:?} should not nest");
        }
    }

    #[test]
    fn child_failures_propagate() {
        let vocabulary = resolver();
        let builder = AnswerTreeBuilder::new(&vocabulary);

        let err = builder
            .conditional_group("placeExposure", Answer::Yes, Some(()), |_| {
                Err(NotificationError::InputValidation("boom".into()))
            })
            .expect_err("child error");
        assert!(matches!(err, NotificationError::InputValidation(msg) if msg == "boom"));
    }

    #[test]
    fn blank_text_is_omitted() {
        let vocabulary = resolver();
        let builder = AnswerTreeBuilder::new(&vocabulary);
        assert!(builder.text("additionalInformation", Some("   ")).is_none());
        assert!(builder.text("additionalInformation", None).is_none());
        assert!(builder.date("deathDate", None).is_none());
    }
}
