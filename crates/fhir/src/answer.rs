//! Question/answer items of questionnaire-style records.

use crate::{Coding, Reference};
use ndb_types::{NonEmptyText, PartialDate};

/// Value carried by an answered item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerValue {
    Coding(Coding),
    Text(NonEmptyText),
    Date(PartialDate),
    Reference(Reference),
}

/// One node of a question/answer tree.
///
/// An item either carries an answer (a leaf, possibly with follow-up items nested under that
/// answer) or is a pure group with only children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerItem {
    link_id: String,
    value: Option<AnswerValue>,
    children: Vec<AnswerItem>,
}

impl AnswerItem {
    /// An answered item without follow-ups.
    pub fn leaf(link_id: impl Into<String>, value: AnswerValue) -> Self {
        Self {
            link_id: link_id.into(),
            value: Some(value),
            children: Vec::new(),
        }
    }

    /// A group with no answer of its own.
    pub fn group(link_id: impl Into<String>, children: Vec<AnswerItem>) -> Self {
        Self {
            link_id: link_id.into(),
            value: None,
            children,
        }
    }

    /// An answered item with follow-up items nested under the answer.
    pub fn answered(
        link_id: impl Into<String>,
        value: AnswerValue,
        children: Vec<AnswerItem>,
    ) -> Self {
        Self {
            link_id: link_id.into(),
            value: Some(value),
            children,
        }
    }

    pub fn link_id(&self) -> &str {
        &self.link_id
    }

    pub fn value(&self) -> Option<&AnswerValue> {
        self.value.as_ref()
    }

    pub fn children(&self) -> &[AnswerItem] {
        &self.children
    }

    /// Finds the first item with `link_id` in this subtree, depth first.
    pub fn find(&self, link_id: &str) -> Option<&AnswerItem> {
        if self.link_id == link_id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(link_id))
    }

    /// Every reference carried anywhere in this subtree.
    pub fn references(&self) -> Vec<Reference> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references(&self, out: &mut Vec<Reference>) {
        if let Some(AnswerValue::Reference(reference)) = &self.value {
            out.push(*reference);
        }
        for child in &self.children {
            child.collect_references(out);
        }
    }
}
