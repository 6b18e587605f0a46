//! The Session & Feed Synchronizer: owns who is signed in, the cached feed and the summaries,
//! and refetches the feed after every successful mutation.
//!
//! All methods take `&self` so several operations can be in flight on the one UI thread. State
//! lives in `RefCell`s, and no borrow is ever held across an await.

pub mod feed;
pub mod session;

use crate::feedapi::{
    self,
    structs::{LoginRequest, NewLike, NewPost, NewReply, Post, PostId, Profile, ProfileUpdate},
};
use crate::identity;
use crate::metrics::STALE_FETCHES;
use crate::storage::Storage;
use crate::twoface::{externalerror::AUTH_FAILED, Cause, Fallible, Reclassify, TfError};
use feed::{Feed, FeedStatus};
pub use session::{AuthMode, Session};
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

/// What `summarize` reports for a post nobody has replied to.
pub const NO_REPLIES: &str = "No replies yet.";

const MIN_PASSWORD_LEN: usize = 6;

pub struct Synchronizer<A, P, S> {
    api: A,
    identity: P,
    storage: S,
    session: RefCell<Option<Session>>,
    feed: RefCell<Feed>,
    summaries: RefCell<HashMap<PostId, String>>,
}

impl<A, P, S> Synchronizer<A, P, S>
where
    A: feedapi::Client,
    P: identity::Provider,
    S: Storage,
{
    pub fn new(api: A, identity: P, storage: S) -> Self {
        Self {
            api,
            identity,
            storage,
            session: RefCell::new(None),
            feed: RefCell::new(Feed::default()),
            summaries: RefCell::new(HashMap::new()),
        }
    }

    /// Sign up or sign in with the identity provider, then exchange the provider's uid for a
    /// Feed API user. The session is persisted and installed only if both steps succeed; on
    /// failure any previous session is left exactly as it was.
    pub async fn authenticate(
        &self,
        mode: AuthMode,
        email: &str,
        password: &str,
    ) -> Fallible<Session> {
        if mode == AuthMode::Register && password.chars().count() < MIN_PASSWORD_LEN {
            return Err(TfError::local(
                Cause::WeakPassword,
                "Passwords need at least 6 characters",
            ));
        }

        let session = match self.exchange(mode, email, password).await.reclassify(AUTH_FAILED) {
            Ok(session) => session,
            Err(e) => {
                warn!(?mode, "authentication failed: {}", e.internal);
                return Err(e);
            }
        };

        session::save(&self.storage, &session)?;
        self.session.replace(Some(session.clone()));
        info!(
            user_id = session.local_id,
            uid = session.provider_uid.as_str(),
            "signed in"
        );
        self.fetch_posts().await;
        Ok(session)
    }

    async fn exchange(&self, mode: AuthMode, email: &str, password: &str) -> Fallible<Session> {
        let user = match mode {
            AuthMode::Register => self.identity.sign_up(email, password).await?,
            AuthMode::Login => self.identity.sign_in(email, password).await?,
        };
        let username = user.display_name.unwrap_or_else(|| email.to_owned());
        let resp = self
            .api
            .login(LoginRequest {
                uid: user.uid.clone(),
                email: email.to_owned(),
                username: username.clone(),
            })
            .await?;
        Ok(Session {
            local_id: resp.user_id,
            provider_uid: user.uid,
            email: email.to_owned(),
            display_name: username,
        })
    }

    /// Install the persisted session, if any, without asking the identity provider whether it
    /// is still good. A revoked session shows up later as failing API calls.
    pub async fn restore_session(&self) -> Option<Session> {
        let session = match session::load(&self.storage) {
            Ok(session) => session?,
            Err(e) => {
                warn!("couldn't read saved session: {}", e.internal);
                return None;
            }
        };
        info!(user_id = session.local_id, "restored saved session");
        self.session.replace(Some(session.clone()));
        self.fetch_posts().await;
        Some(session)
    }

    /// Refetch the whole feed. Never fails: a failed fetch yields an empty feed, and
    /// `feed_status` tells the two apart. If another fetch starts before this one finishes, this
    /// one's result is returned but not applied.
    pub async fn fetch_posts(&self) -> Vec<Post> {
        let ticket = self.feed.borrow_mut().begin();
        let posts = match self.api.list_posts().await {
            Ok(posts) => Some(posts),
            Err(e) => {
                warn!("couldn't fetch the feed: {}", e.internal);
                None
            }
        };
        if self.feed.borrow_mut().finish(ticket, posts.clone()) {
            debug!(
                posts = posts.as_ref().map(Vec::len).unwrap_or(0),
                "feed updated"
            );
        } else {
            STALE_FETCHES.inc();
            debug!("discarding superseded feed fetch");
        }
        posts.unwrap_or_default()
    }

    pub async fn create_post(&self, content: &str) -> Fallible<()> {
        let content = non_empty(content, "Write something before posting")?;
        let session = self.require_session()?;
        self.api
            .create_post(NewPost {
                uid: session.provider_uid,
                content,
            })
            .await
            .map_err(|e| surfaced("create_post", e))?;
        self.fetch_posts().await;
        Ok(())
    }

    pub async fn like(&self, post_id: PostId) -> Fallible<()> {
        let session = self.require_session()?;
        self.api
            .like(NewLike {
                uid: session.provider_uid,
                post_id,
            })
            .await
            .map_err(|e| surfaced("like", e))?;
        self.fetch_posts().await;
        Ok(())
    }

    pub async fn reply(&self, post_id: PostId, content: &str) -> Fallible<()> {
        let content = non_empty(content, "Write something before replying")?;
        let session = self.require_session()?;
        self.api
            .reply(NewReply {
                uid: session.provider_uid,
                post_id,
                content,
            })
            .await
            .map_err(|e| surfaced("reply", e))?;
        self.fetch_posts().await;
        Ok(())
    }

    /// Summarize the replies of a cached post. Posts without replies (or not in the cache) get
    /// `NO_REPLIES` without asking the server.
    pub async fn summarize(&self, post_id: PostId) -> Fallible<String> {
        let has_replies = self
            .feed
            .borrow()
            .find(post_id)
            .map(Post::has_replies)
            .unwrap_or(false);
        let summary = if has_replies {
            self.api
                .summary(post_id)
                .await
                .map_err(|e| surfaced("summary", e))?
        } else {
            NO_REPLIES.to_owned()
        };
        self.summaries
            .borrow_mut()
            .insert(post_id, summary.clone());
        Ok(summary)
    }

    /// Forget the user locally. The Feed API isn't told. If the saved session can't be removed,
    /// nothing local changes.
    pub async fn logout(&self) -> Fallible<()> {
        if let Err(e) = self.identity.sign_out().await {
            warn!("identity provider sign-out failed: {}", e.internal);
        }
        session::clear(&self.storage)?;
        self.session.replace(None);
        self.feed.borrow_mut().invalidate();
        self.summaries.borrow_mut().clear();
        info!("signed out");
        Ok(())
    }

    pub async fn fetch_profile(&self) -> Fallible<Profile> {
        let session = self.require_session()?;
        self.api
            .get_profile(&session.provider_uid)
            .await
            .map_err(|e| surfaced("get_profile", e))
    }

    /// Change the username (and optionally the avatar URL). The saved session picks up the new
    /// name, unless the user signed out while the request was in flight.
    pub async fn update_profile(
        &self,
        username: &str,
        profile_image_url: Option<&str>,
    ) -> Fallible<Profile> {
        let username = non_empty(username, "Usernames can't be blank")?;
        let session = self.require_session()?;
        let profile = self
            .api
            .update_profile(ProfileUpdate {
                uid: session.provider_uid.clone(),
                username,
                profile_image_url: profile_image_url.map(str::to_owned),
            })
            .await
            .map_err(|e| surfaced("update_profile", e))?;

        let still_signed_in = self
            .session
            .borrow()
            .as_ref()
            .map(|live| live.provider_uid == session.provider_uid)
            .unwrap_or(false);
        if still_signed_in {
            let updated = Session {
                display_name: profile.username.clone(),
                ..session
            };
            session::save(&self.storage, &updated)?;
            self.session.replace(Some(updated));
        }
        Ok(profile)
    }

    pub fn session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    pub fn posts(&self) -> Vec<Post> {
        self.feed.borrow().posts().to_vec()
    }

    pub fn feed_status(&self) -> FeedStatus {
        self.feed.borrow().status()
    }

    pub fn summary(&self, post_id: PostId) -> Option<String> {
        self.summaries.borrow().get(&post_id).cloned()
    }

    fn require_session(&self) -> Fallible<Session> {
        self.session().ok_or_else(|| {
            TfError::local(Cause::NotAuthenticated, "Sign in first")
        })
    }
}

fn non_empty(content: &str, text: &'static str) -> Fallible<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(TfError::local(Cause::EmptyInput, text));
    }
    Ok(trimmed.to_owned())
}

/// Failed writes are shown to the user; log the private half here.
fn surfaced(operation: &'static str, e: TfError) -> TfError {
    error!(operation, "{}", e.internal);
    e
}
