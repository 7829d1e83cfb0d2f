use aidrecon_iati::ParseError;

use crate::session::SessionStatus;

/// Operator-input problems caught before any stage starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("no fields selected; select at least one field to import")]
    NoFieldsSelected,
    #[error("no document content provided")]
    NoContentProvided,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReconError {
    /// Document failed validation. Carries every violation.
    #[error("document could not be parsed: {0}")]
    Parse(#[from] ParseError),
    /// Remote document or local snapshot could not be retrieved.
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Persistence boundary rejected the commit.
    #[error("commit rejected: {0}")]
    Commit(String),
    /// Action not allowed in the session's current state (including
    /// re-entrant triggering of a stage that is still running).
    #[error("cannot {action} while session is {status}")]
    InvalidState {
        action: &'static str,
        status: SessionStatus,
    },
    /// Reference table file could not be read or deserialized.
    #[error("reference table error: {0}")]
    ReferenceTable(String),
}
