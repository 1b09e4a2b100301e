//! Identifier utilities for assembled notification documents.
//!
//! Every record in an assembled bundle carries a *local id*: a UUID generated fresh for one
//! assembly run and unique within it. Ids are rendered in the hyphenated lowercase form, which
//! is what `urn:uuid:` references expect.
//!
//! This crate provides:
//! - [`LocalId`]: the id itself, always displayed in canonical form.
//! - [`IdSource`]: the seam through which an assembly run draws fresh ids, with
//!   [`RandomIds`] for production use and [`SequentialIds`] for reproducible output.
//!
//! ## Canonical form
//! - Length: 36
//! - Lowercase hex in 8-4-4-4-12 groups
//! - Example: `550e8400-e29b-41d4-a716-446655440000`

mod service;

pub use service::{IdSource, LocalId, RandomIds, SequentialIds};
