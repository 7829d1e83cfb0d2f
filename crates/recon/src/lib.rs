//! `aidrecon-recon`: Reconciliation engine for IATI organisation documents.
//!
//! Compares a parsed document with the locally stored organisation, builds
//! the reviewable field list and coverage summary, tracks the operator's
//! selection and submits it as one commit. All I/O goes through the
//! [`DocumentFetcher`] and [`OrganisationStore`] traits.

pub mod classify;
pub mod commit;
pub mod coverage;
pub mod error;
pub mod label;
pub mod model;
pub mod reference;
pub mod selection;
pub mod session;
pub mod store;
pub mod workflow;

pub use classify::{build_fields, build_fields_with};
pub use commit::{build_request, commit};
pub use coverage::analyze;
pub use error::{ReconError, ValidationError};
pub use model::{
    ArrayItem, CommitRequest, CommitResult, CoverageSummary, FieldCategory, FieldValue,
    ImportField, LocalOrganisation,
};
pub use reference::ReferenceTables;
pub use session::{ReconciliationSession, SessionStatus};
pub use store::{DocumentFetcher, OrganisationStore};
pub use workflow::{DocumentSource, Reconciler};
