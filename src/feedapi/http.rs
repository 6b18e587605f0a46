use crate::feedapi::structs::{
    LoginRequest, LoginResponse, NewLike, NewPost, NewReply, Post, PostId, Profile, ProfileUpdate,
    SummaryResponse,
};
use crate::metrics::observe;
use crate::twoface::{Cause, DescribeErr, ExternalError, Fallible, TfError, Transport};
use anyhow::anyhow;
use async_trait::async_trait;
use awc::{error::PayloadError, http::StatusCode, ClientResponse};
use bytes::Bytes;
use futures::Stream;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

const UNREACHABLE: &str = "Couldn't reach the feed server";

const BAD_RESPONSE: ExternalError = ExternalError {
    cause: Cause::Network,
    text: "The feed server sent an unexpected response",
};

/// An implementation of feedapi::Client that talks JSON over HTTP.
#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    http: awc::Client,
    max_body_size: usize,
}

impl HttpClient {
    pub fn new(base: &str, timeout: Duration, max_body_size: usize) -> anyhow::Result<Self> {
        let base = base_url(base)?;
        let http = awc::Client::builder().timeout(timeout).finish();
        Ok(Self {
            base,
            http,
            max_body_size,
        })
    }

    fn endpoint(&self, path: &str) -> Fallible<Url> {
        self.base.join(path).describe_err(ExternalError::default())
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Fallible<Bytes> {
        let url = self.endpoint(path)?;
        debug!(url = url.as_str(), "POST");
        let resp = self
            .http
            .post(url.as_str())
            .send_json(body)
            .await
            .or_network(UNREACHABLE)?;
        read_success(resp, self.max_body_size).await
    }

    async fn get(&self, url: Url) -> Fallible<Bytes> {
        debug!(url = url.as_str(), "GET");
        let resp = self
            .http
            .get(url.as_str())
            .send()
            .await
            .or_network(UNREACHABLE)?;
        read_success(resp, self.max_body_size).await
    }
}

/// Parse a URL that relative paths will be joined onto.
pub fn base_url(base: &str) -> anyhow::Result<Url> {
    let mut base = Url::parse(base)?;
    if base.cannot_be_a_base() {
        return Err(anyhow!("{} can't be used as a base URL", base));
    }
    // Url::join replaces the last path segment unless the path ends in a slash.
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

/// Check the status, then read the whole body.
async fn read_success<S>(mut resp: ClientResponse<S>, limit: usize) -> Fallible<Bytes>
where
    S: Stream<Item = Result<Bytes, PayloadError>> + Unpin,
{
    let status = resp.status();
    if !status.is_success() {
        return Err(status_error(status));
    }
    resp.body().limit(limit).await.or_network(UNREACHABLE)
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Fallible<T> {
    serde_json::from_slice(body).describe_err(BAD_RESPONSE)
}

fn status_error(status: StatusCode) -> TfError {
    TfError {
        internal: anyhow!("feed server returned {}", status),
        external: ExternalError {
            cause: Cause::Network,
            text: "The feed server rejected the request",
        },
    }
}

#[async_trait(?Send)]
impl super::Client for HttpClient {
    async fn login(&self, req: LoginRequest) -> Fallible<LoginResponse> {
        observe("login", || async {
            let body = self.post_json("login", &req).await?;
            decode(&body)
        })
        .await
    }

    async fn list_posts(&self) -> Fallible<Vec<Post>> {
        observe("list_posts", || async {
            let body = self.get(self.endpoint("posts")?).await?;
            // An empty table is sent as `null`.
            let posts: Option<Vec<Post>> = decode(&body)?;
            Ok(posts.unwrap_or_default())
        })
        .await
    }

    async fn create_post(&self, req: NewPost) -> Fallible<()> {
        observe("create_post", || async {
            // The created post is echoed back, but the feed refetch is the source of truth.
            self.post_json("posts", &req).await?;
            Ok(())
        })
        .await
    }

    async fn like(&self, req: NewLike) -> Fallible<()> {
        observe("like", || async {
            self.post_json("likes", &req).await?;
            Ok(())
        })
        .await
    }

    async fn reply(&self, req: NewReply) -> Fallible<()> {
        observe("reply", || async {
            self.post_json("replies", &req).await?;
            Ok(())
        })
        .await
    }

    async fn summary(&self, post_id: PostId) -> Fallible<String> {
        observe("summary", || async {
            let url = self.endpoint(&format!("summary/{}", post_id))?;
            let body: SummaryResponse = decode(&self.get(url).await?)?;
            Ok(body.summary)
        })
        .await
    }

    async fn get_profile(&self, uid: &str) -> Fallible<Profile> {
        observe("get_profile", || async {
            let mut url = self.endpoint("profile")?;
            url.query_pairs_mut().append_pair("uid", uid);
            decode(&self.get(url).await?)
        })
        .await
    }

    async fn update_profile(&self, req: ProfileUpdate) -> Fallible<Profile> {
        observe("update_profile", || async {
            decode(&self.post_json("profile", &req).await?)
        })
        .await
    }
}
