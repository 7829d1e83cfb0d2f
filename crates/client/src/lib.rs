//! Organisation store API client.
//!
//! This crate owns the store wire contract: organisation snapshot read,
//! import commit, remote document fetch, token storage. It implements the
//! engine's `DocumentFetcher` and `OrganisationStore` seams.
//!
//! No retries. Timeouts come from settings.

mod auth;
mod client;

pub use auth::{
    auth_file_path, delete_auth, load_auth, load_auth_from, save_auth, save_auth_to,
    AuthCredentials,
};
pub use client::{rejection_reason, ClientError, StoreClient};
