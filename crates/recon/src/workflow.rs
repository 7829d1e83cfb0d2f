//! Headless driver tying acquisition, parsing, snapshot read and commit to a
//! [`ReconciliationSession`].

use aidrecon_iati::{parse, validate};
use log::{debug, info};

use crate::commit;
use crate::error::{ReconError, ValidationError};
use crate::model::CommitResult;
use crate::reference::ReferenceTables;
use crate::session::ReconciliationSession;
use crate::store::{DocumentFetcher, OrganisationStore};

/// Where the document text comes from. One source per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// Content of a file the caller already read; `name` is for logs only.
    File { name: String, content: String },
    Pasted(String),
    Url(String),
}

/// Drop a leading UTF-8 byte-order mark.
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

pub struct Reconciler<'a> {
    fetcher: &'a dyn DocumentFetcher,
    store: &'a dyn OrganisationStore,
    home_country: String,
    refs: ReferenceTables,
}

impl<'a> Reconciler<'a> {
    pub fn new(fetcher: &'a dyn DocumentFetcher, store: &'a dyn OrganisationStore) -> Self {
        Self {
            fetcher,
            store,
            home_country: String::new(),
            refs: ReferenceTables::builtin(),
        }
    }

    pub fn with_home_country(mut self, code: &str) -> Self {
        self.home_country = code.trim().to_uppercase();
        self
    }

    pub fn with_reference_tables(mut self, refs: ReferenceTables) -> Self {
        self.refs = refs;
        self
    }

    /// Acquire, validate and parse the document, read the local snapshot of
    /// `organisation_id`, and leave the session in preview.
    ///
    /// Any failure after the session starts parsing lands it in `Error` with
    /// the message recorded. A session that is not idle is refused untouched.
    pub fn load(
        &self,
        session: &mut ReconciliationSession,
        source: DocumentSource,
        organisation_id: &str,
    ) -> Result<(), ReconError> {
        session.begin_parse()?;
        match self.load_inner(session, source, organisation_id) {
            Ok(()) => Ok(()),
            Err(err) => Err(session.fail(err)),
        }
    }

    fn load_inner(
        &self,
        session: &mut ReconciliationSession,
        source: DocumentSource,
        organisation_id: &str,
    ) -> Result<(), ReconError> {
        let text = self.acquire(source)?;
        let text = strip_bom(&text);
        if text.trim().is_empty() {
            return Err(ValidationError::NoContentProvided.into());
        }

        validate(text).into_result()?;
        let parsed = parse(text)?;
        let local = self.store.fetch_snapshot(organisation_id)?;
        session.complete_parse(parsed, local, &self.home_country, &self.refs)
    }

    fn acquire(&self, source: DocumentSource) -> Result<String, ReconError> {
        match source {
            DocumentSource::File { name, content } => {
                debug!("reading document from file {name} ({} bytes)", content.len());
                Ok(content)
            }
            DocumentSource::Pasted(content) => Ok(content),
            DocumentSource::Url(url) => {
                let url = url.trim();
                if url.is_empty() {
                    return Err(ValidationError::NoContentProvided.into());
                }
                info!("fetching document from {url}");
                self.fetcher.fetch_document(url)
            }
        }
    }

    /// Commit the session's selection to `organisation_id`.
    pub fn commit(
        &self,
        session: &mut ReconciliationSession,
        organisation_id: &str,
    ) -> Result<CommitResult, ReconError> {
        commit::commit(session, organisation_id, self.store)
    }
}
