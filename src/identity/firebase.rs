use crate::feedapi::http::base_url;
use crate::identity::{Provider, ProviderUser};
use crate::metrics::observe;
use crate::twoface::{externalerror::AUTH_FAILED, DescribeErr, Fallible, TfError, Transport};
use anyhow::anyhow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Firebase Authentication over the Identity Toolkit REST API.
pub struct FirebaseProvider {
    endpoint: Url,
    api_key: String,
    http: awc::Client,
    /// Token for the signed-in user. Nothing in this crate sends it yet; dropping it is what
    /// signing out means for the REST API.
    id_token: RefCell<Option<String>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseProvider {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            endpoint: base_url(endpoint)?,
            api_key: api_key.to_owned(),
            http: awc::Client::builder().timeout(timeout).finish(),
            id_token: RefCell::new(None),
        })
    }

    fn method_url(&self, method: &str) -> Fallible<Url> {
        let mut url = self
            .endpoint
            .join(&format!("v1/accounts:{}", method))
            .describe_err(AUTH_FAILED)?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn password_call(
        &self,
        method: &str,
        email: &str,
        password: &str,
    ) -> Fallible<ProviderUser> {
        let url = self.method_url(method)?;
        let mut resp = self
            .http
            .post(url.as_str())
            .send_json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .await
            .or_network("Couldn't reach the sign-in service")?;
        let body = resp
            .body()
            .await
            .or_network("Couldn't reach the sign-in service")?;

        if !resp.status().is_success() {
            // e.g. EMAIL_EXISTS, INVALID_PASSWORD, EMAIL_NOT_FOUND
            let reason = serde_json::from_slice::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| resp.status().to_string());
            warn!(method, reason = reason.as_str(), "identity provider rejected credentials");
            return Err(TfError {
                internal: anyhow!("identity provider rejected {}: {}", method, reason),
                external: AUTH_FAILED,
            });
        }

        let parsed: PasswordResponse = serde_json::from_slice(&body).describe_err(AUTH_FAILED)?;
        debug!(uid = parsed.local_id.as_str(), "identity provider accepted credentials");
        self.id_token.replace(Some(parsed.id_token));
        Ok(ProviderUser {
            uid: parsed.local_id,
            // Accounts created without a profile report an empty display name.
            display_name: parsed.display_name.filter(|name| !name.is_empty()),
        })
    }
}

#[async_trait(?Send)]
impl Provider for FirebaseProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Fallible<ProviderUser> {
        observe("identity_sign_up", || self.password_call("signUp", email, password)).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Fallible<ProviderUser> {
        observe("identity_sign_in", || {
            self.password_call("signInWithPassword", email, password)
        })
        .await
    }

    async fn sign_out(&self) -> Fallible<()> {
        self.id_token.replace(None);
        Ok(())
    }
}
