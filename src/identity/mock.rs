use crate::identity::ProviderUser;
use crate::twoface::{externalerror::AUTH_FAILED, Fallible, TfError};
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default, Debug)]
struct Inner {
    /// email -> (password, uid)
    accounts: HashMap<String, (String, String)>,
    calls: usize,
    signed_out: usize,
}

/// A mock implementation of identity::Provider with an in-memory account table.
#[derive(Clone, Default, Debug)]
pub struct Provider {
    inner: Arc<Mutex<Inner>>,
}

impl Provider {
    pub fn with_account(self, email: &str, password: &str, uid: &str) -> Self {
        self.inner.lock().unwrap().accounts.insert(
            email.to_owned(),
            (password.to_owned(), uid.to_owned()),
        );
        self
    }

    /// Total sign-up, sign-in and sign-out calls.
    pub fn calls(&self) -> usize {
        self.inner.lock().unwrap().calls
    }

    pub fn sign_outs(&self) -> usize {
        self.inner.lock().unwrap().signed_out
    }
}

fn rejected(reason: &str) -> TfError {
    TfError {
        internal: anyhow!("{}", reason),
        external: AUTH_FAILED,
    }
}

#[async_trait(?Send)]
impl super::Provider for Provider {
    async fn sign_up(&self, email: &str, password: &str) -> Fallible<ProviderUser> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;
        if inner.accounts.contains_key(email) {
            return Err(rejected("EMAIL_EXISTS"));
        }
        let uid = format!("uid-{}", inner.accounts.len() + 1);
        inner
            .accounts
            .insert(email.to_owned(), (password.to_owned(), uid.clone()));
        Ok(ProviderUser {
            uid,
            display_name: None,
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Fallible<ProviderUser> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;
        match inner.accounts.get(email) {
            Some((stored, uid)) if stored == password => Ok(ProviderUser {
                uid: uid.clone(),
                display_name: None,
            }),
            Some(_) => Err(rejected("INVALID_PASSWORD")),
            None => Err(rejected("EMAIL_NOT_FOUND")),
        }
    }

    async fn sign_out(&self) -> Fallible<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;
        inner.signed_out += 1;
        Ok(())
    }
}
