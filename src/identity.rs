//! The third-party identity provider that owns email/password credentials.
pub mod firebase;
#[cfg(test)]
pub mod mock;

use crate::twoface::Fallible;
use async_trait::async_trait;

/// Who the provider says the user is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUser {
    /// Stable subject id.
    pub uid: String,
    pub display_name: Option<String>,
}

#[async_trait(?Send)]
pub trait Provider {
    /// Create an account for new credentials.
    async fn sign_up(&self, email: &str, password: &str) -> Fallible<ProviderUser>;
    /// Verify existing credentials.
    async fn sign_in(&self, email: &str, password: &str) -> Fallible<ProviderUser>;
    async fn sign_out(&self) -> Fallible<()>;
}
