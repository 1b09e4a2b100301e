//! FHIR-aligned output model for notification documents.
//!
//! This crate provides the **domain records** of an assembled notification document and their
//! **JSON wire rendering**:
//! - [`Coding`] values, minted only by the [`vocabulary`] resolver,
//! - [`Record`]s with kind-specific [`RecordBody`] content and a profile per kind,
//! - [`Reference`]s, obtainable only from a [`RecordArena`],
//! - question/answer trees ([`AnswerItem`]),
//! - the final [`Bundle`] document.
//!
//! This crate focuses on:
//! - keeping every reference backward-pointing and every coding traceable to the vocabulary
//! - rendering records to FHIR JSON (entries addressed by `urn:uuid:` full URLs)
//!
//! It does not model the full FHIR schema; only the fields notification documents carry.

pub mod answer;
pub mod bundle;
pub mod coding;
pub mod profile;
pub mod record;
pub mod reference;
pub mod vocabulary;

mod wire;

pub use answer::{AnswerItem, AnswerValue};
pub use bundle::Bundle;
pub use coding::Coding;
pub use record::{Record, RecordBody, RecordKind};
pub use reference::{RecordArena, Reference};
pub use vocabulary::{VocabularyError, VocabularyResolver, VocabularyTable};

/// Errors returned by the `fhir` crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("translation error: {0}")]
    Translation(String),

    #[error("duplicate local id: {0}")]
    DuplicateLocalId(String),

    #[error("record {from} references {to}, which is not part of this document")]
    DanglingReference { from: String, to: String },

    #[error("invalid record order: {0}")]
    InvalidOrder(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
