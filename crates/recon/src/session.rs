//! Reconciliation session: one import attempt of one source document into
//! one target organisation.
//!
//! Status changes go through [`next`], a pure transition table. The session
//! methods only guard, record data and apply transitions, so the whole
//! workflow can be driven headlessly.

use std::fmt;

use aidrecon_iati::OrganisationDocument;
use log::{debug, info};
use serde::Serialize;

use crate::classify::build_fields_with;
use crate::commit::build_request;
use crate::coverage::analyze;
use crate::error::{ReconError, ValidationError};
use crate::model::{
    CommitRequest, CommitResult, CoverageSummary, FieldCategory, ImportField, LocalOrganisation,
};
use crate::reference::ReferenceTables;
use crate::selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Parsing,
    Preview,
    Importing,
    Complete,
    Error,
}

impl SessionStatus {
    /// Rest states can be reset; `Parsing` and `Importing` wait on a
    /// collaborator and have no cancellation.
    pub fn is_at_rest(&self) -> bool {
        !matches!(self, Self::Parsing | Self::Importing)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Parsing => write!(f, "parsing"),
            Self::Preview => write!(f, "preview"),
            Self::Importing => write!(f, "importing"),
            Self::Complete => write!(f, "complete"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    ParseStarted,
    ParseSucceeded,
    ParseFailed,
    CommitRequested,
    CommitSucceeded,
    CommitFailed,
    /// Back to preview after a failed commit, keeping document and selection.
    Resume,
    Reset,
}

impl SessionEvent {
    fn action(&self) -> &'static str {
        match self {
            Self::ParseStarted => "start parsing",
            Self::ParseSucceeded => "finish parsing",
            Self::ParseFailed => "fail parsing",
            Self::CommitRequested => "commit",
            Self::CommitSucceeded => "finish commit",
            Self::CommitFailed => "fail commit",
            Self::Resume => "resume preview",
            Self::Reset => "reset",
        }
    }
}

/// Transition table. `None` means the event is not allowed in `status`.
pub fn next(status: SessionStatus, event: SessionEvent) -> Option<SessionStatus> {
    use SessionEvent as E;
    use SessionStatus as S;

    match (status, event) {
        (S::Idle, E::ParseStarted) => Some(S::Parsing),
        (S::Parsing, E::ParseSucceeded) => Some(S::Preview),
        (S::Parsing, E::ParseFailed) => Some(S::Error),
        (S::Preview, E::CommitRequested) => Some(S::Importing),
        (S::Importing, E::CommitSucceeded) => Some(S::Complete),
        (S::Importing, E::CommitFailed) => Some(S::Error),
        (S::Error, E::Resume) => Some(S::Preview),
        (s, E::Reset) if s.is_at_rest() => Some(S::Idle),
        _ => None,
    }
}

/// State of one import attempt.
#[derive(Debug, Clone)]
pub struct ReconciliationSession {
    status: SessionStatus,
    document: Option<OrganisationDocument>,
    local: Option<LocalOrganisation>,
    fields: Vec<ImportField>,
    coverage: Option<CoverageSummary>,
    error: Option<String>,
    result: Option<CommitResult>,
}

impl Default for ReconciliationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconciliationSession {
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
            document: None,
            local: None,
            fields: Vec::new(),
            coverage: None,
            error: None,
            result: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn document(&self) -> Option<&OrganisationDocument> {
        self.document.as_ref()
    }

    pub fn local(&self) -> Option<&LocalOrganisation> {
        self.local.as_ref()
    }

    pub fn fields(&self) -> &[ImportField] {
        &self.fields
    }

    pub fn coverage(&self) -> Option<&CoverageSummary> {
        self.coverage.as_ref()
    }

    /// Last operator-facing error message, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn result(&self) -> Option<&CommitResult> {
        self.result.as_ref()
    }

    fn apply(&mut self, event: SessionEvent) -> Result<(), ReconError> {
        match next(self.status, event) {
            Some(to) => {
                debug!("session {} -> {} ({:?})", self.status, to, event);
                self.status = to;
                Ok(())
            }
            None => Err(ReconError::InvalidState {
                action: event.action(),
                status: self.status,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Parse stage
    // ------------------------------------------------------------------

    /// Idle → Parsing. Rejected while any other stage owns the session.
    pub fn begin_parse(&mut self) -> Result<(), ReconError> {
        self.apply(SessionEvent::ParseStarted)
    }

    /// Parsing → Preview with freshly built rows and coverage.
    pub fn complete_parse(
        &mut self,
        parsed: OrganisationDocument,
        local: LocalOrganisation,
        home_country: &str,
        refs: &ReferenceTables,
    ) -> Result<(), ReconError> {
        self.apply(SessionEvent::ParseSucceeded)?;
        self.fields = build_fields_with(&local, &parsed, home_country, refs);
        self.coverage = Some(analyze(&parsed, home_country));
        info!(
            "preview ready for {}: {} fields",
            parsed.identifier,
            self.fields.len()
        );
        self.document = Some(parsed);
        self.local = Some(local);
        self.error = None;
        Ok(())
    }

    /// Record a stage failure and move to `Error`. Returns the error so the
    /// caller can propagate it. Outside a running stage the status is left
    /// alone and only the message is recorded.
    pub fn fail(&mut self, error: ReconError) -> ReconError {
        let event = match self.status {
            SessionStatus::Parsing => Some(SessionEvent::ParseFailed),
            SessionStatus::Importing => Some(SessionEvent::CommitFailed),
            _ => None,
        };
        if let Some(event) = event {
            // Both events are valid from their stage.
            let _ = self.apply(event);
        }
        self.error = Some(error.to_string());
        error
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    fn ensure_selectable(&self, action: &'static str) -> Result<(), ReconError> {
        match self.status {
            SessionStatus::Preview | SessionStatus::Error if !self.fields.is_empty() => Ok(()),
            status => Err(ReconError::InvalidState { action, status }),
        }
    }

    /// Select or clear the row at `(iati_path, item_index)`. `Ok(false)` when
    /// no such row exists.
    pub fn toggle(
        &mut self,
        iati_path: &str,
        item_index: Option<usize>,
        checked: bool,
    ) -> Result<bool, ReconError> {
        self.ensure_selectable("change selection")?;
        Ok(selection::toggle(&mut self.fields, iati_path, item_index, checked))
    }

    pub fn select_all(&mut self) -> Result<(), ReconError> {
        self.ensure_selectable("change selection")?;
        selection::select_all(&mut self.fields);
        Ok(())
    }

    pub fn select_none(&mut self) -> Result<(), ReconError> {
        self.ensure_selectable("change selection")?;
        selection::select_none(&mut self.fields);
        Ok(())
    }

    pub fn select_category(
        &mut self,
        category: FieldCategory,
        checked: bool,
    ) -> Result<(), ReconError> {
        self.ensure_selectable("change selection")?;
        selection::select_category(&mut self.fields, category, checked);
        Ok(())
    }

    pub fn selected_count(&self) -> usize {
        selection::selected_count(&self.fields)
    }

    // ------------------------------------------------------------------
    // Commit stage
    // ------------------------------------------------------------------

    /// Preview → Importing, returning the request to submit.
    ///
    /// With nothing selected the session stays in preview, the message is
    /// recorded and `NoFieldsSelected` is returned.
    pub fn begin_commit(&mut self) -> Result<CommitRequest, ReconError> {
        let refused = ReconError::InvalidState {
            action: SessionEvent::CommitRequested.action(),
            status: self.status,
        };
        if self.status != SessionStatus::Preview {
            return Err(refused);
        }
        if self.selected_count() == 0 {
            let err = ReconError::from(ValidationError::NoFieldsSelected);
            self.error = Some(err.to_string());
            return Err(err);
        }
        let request = match &self.document {
            Some(document) => build_request(document, &self.fields),
            None => return Err(refused),
        };
        self.apply(SessionEvent::CommitRequested)?;
        self.error = None;
        Ok(request)
    }

    /// Importing → Complete.
    pub fn complete_commit(&mut self, result: CommitResult) -> Result<(), ReconError> {
        self.apply(SessionEvent::CommitSucceeded)?;
        info!(
            "commit applied {} field(s): {}",
            result.updated_field_count,
            result.updated_field_names.join(", ")
        );
        self.result = Some(result);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Recovery
    // ------------------------------------------------------------------

    /// Error → Preview when a parsed document and its rows are still held,
    /// so the operator can adjust the selection and commit again.
    pub fn resume_preview(&mut self) -> Result<(), ReconError> {
        if self.document.is_none() || self.fields.is_empty() {
            return Err(ReconError::InvalidState {
                action: SessionEvent::Resume.action(),
                status: self.status,
            });
        }
        self.apply(SessionEvent::Resume)?;
        self.error = None;
        Ok(())
    }

    /// Discard everything and return to idle. Only allowed at rest.
    pub fn reset(&mut self) -> Result<(), ReconError> {
        self.apply(SessionEvent::Reset)?;
        *self = Self::new();
        Ok(())
    }
}
