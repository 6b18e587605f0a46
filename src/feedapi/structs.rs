use chrono::{offset::Utc, DateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Feed API ids are plain integers.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PostId(pub i64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PostId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(PostId)
    }
}

/// A post, as last fetched from `GET /posts`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    /// Provider uid of the author. Older servers leave it out.
    #[serde(default, rename = "uid")]
    pub author_uid: Option<String>,
    pub content: String,
    #[serde(default, rename = "likes")]
    pub like_count: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub replies: Vec<Reply>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn has_replies(&self) -> bool {
        !self.replies.is_empty()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub id: i64,
    pub content: String,
}

/// The server encodes a post without replies as `"replies": null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `POST /login`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub uid: String,
    pub email: String,
    pub username: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub user_id: i64,
}

/// Body of `POST /posts`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub uid: String,
    pub content: String,
}

/// Body of `POST /likes`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NewLike {
    pub uid: String,
    pub post_id: PostId,
}

/// Body of `POST /replies`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NewReply {
    pub uid: String,
    pub post_id: PostId,
    pub content: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub username: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

/// Body of `POST /profile`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub uid: String,
    pub username: String,
    pub profile_image_url: Option<String>,
}
