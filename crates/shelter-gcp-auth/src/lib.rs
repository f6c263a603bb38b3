//! Google credential resolution for ShelterLink.
//!
//! Provides:
//! - [`CredentialConfig`] - every place credentials may come from
//! - [`resolve`] - picks the first configured source, in priority order
//! - [`CredentialBundle`] - parsed service-account / authorized-user JSON
//! - [`TokenProvider`] - cached OAuth2 access tokens for the resolved source
//! - [`CredentialError`] - resolution and token errors

#![forbid(unsafe_code)]

mod bundle;
mod error;
mod resolver;
mod token;

pub use bundle::{
    AuthorizedUserCredentials, CredentialBundle, DEFAULT_TOKEN_URI, ServiceAccountKey,
};
pub use error::{CredentialError, REMEDIATION, Result};
pub use resolver::{
    CredentialConfig, CredentialSource, DEFAULT_METADATA_URL, ResolvedCredentials, resolve,
};
pub use token::{
    AccessToken, AuthorizedUserTokenSource, DATASTORE_SCOPE, MetadataTokenSource,
    ServiceAccountTokenSource, StaticTokenSource, TokenProvider, TokenSource,
};
