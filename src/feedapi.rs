pub mod http;
#[cfg(test)]
pub mod mock;
pub mod structs;

use crate::twoface::Fallible;
use async_trait::async_trait;
use structs::{
    LoginRequest, LoginResponse, NewLike, NewPost, NewReply, Post, PostId, Profile, ProfileUpdate,
};

#[async_trait(?Send)]
/// The interface to the REST service that stores users, posts, likes and replies.
///
/// Every method fails on transport errors and on non-success statuses. Deciding what a failure
/// means for the feed is left to the caller.
pub trait Client {
    async fn login(&self, req: LoginRequest) -> Fallible<LoginResponse>;
    async fn list_posts(&self) -> Fallible<Vec<Post>>;
    async fn create_post(&self, req: NewPost) -> Fallible<()>;
    async fn like(&self, req: NewLike) -> Fallible<()>;
    async fn reply(&self, req: NewReply) -> Fallible<()>;
    async fn summary(&self, post_id: PostId) -> Fallible<String>;
    async fn get_profile(&self, uid: &str) -> Fallible<Profile>;
    async fn update_profile(&self, req: ProfileUpdate) -> Fallible<Profile>;
}
