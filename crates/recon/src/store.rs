//! Collaborator seams. The engine never performs I/O itself; callers plug in
//! an HTTP client or a test double.

use crate::error::ReconError;
use crate::model::{CommitRequest, CommitResult, LocalOrganisation};

/// Generic HTTP GET for documents acquired by URL.
pub trait DocumentFetcher {
    /// Body text of `url`. Transport and non-success responses map to
    /// [`ReconError::Fetch`].
    fn fetch_document(&self, url: &str) -> Result<String, ReconError>;
}

/// The external organisation store.
pub trait OrganisationStore {
    /// Current local record. Fields the store leaves out come back as `None`.
    fn fetch_snapshot(&self, organisation_id: &str) -> Result<LocalOrganisation, ReconError>;

    /// Submit one commit. The store applies every selected scalar and
    /// appends every selected item, or applies nothing.
    fn commit(
        &self,
        organisation_id: &str,
        request: &CommitRequest,
    ) -> Result<CommitResult, ReconError>;
}
