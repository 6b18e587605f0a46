use crate::feedapi::structs::{
    LoginRequest, LoginResponse, NewLike, NewPost, NewReply, Post, PostId, Profile, ProfileUpdate,
    Reply,
};
use crate::twoface::{Cause, Fallible, TfError};
use async_trait::async_trait;
use futures::channel::oneshot;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// One request the mock received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login(LoginRequest),
    ListPosts,
    CreatePost(NewPost),
    Like(NewLike),
    Reply(NewReply),
    Summary(PostId),
    GetProfile(String),
    UpdateProfile(ProfileUpdate),
}

#[derive(Default, Debug)]
struct Inner {
    posts: Vec<Post>,
    profiles: HashMap<String, Profile>,
    calls: Vec<Call>,
    /// Endpoints that answer with an error, e.g. "list_posts".
    failing: Vec<&'static str>,
    /// Held-back `list_posts` answers, consumed in order.
    pending_feeds: VecDeque<oneshot::Receiver<Vec<Post>>>,
    next_user_id: i64,
}

/// A mock implementation of feedapi::Client that behaves like a tiny in-memory server.
#[derive(Clone, Default, Debug)]
pub struct Client {
    inner: Arc<Mutex<Inner>>,
}

impl Client {
    pub fn set_posts(&self, posts: Vec<Post>) {
        self.inner.lock().unwrap().posts = posts;
    }

    pub fn fail(&self, endpoint: &'static str) {
        self.inner.lock().unwrap().failing.push(endpoint);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    /// The next `list_posts` call waits for, and answers with, whatever is sent on the
    /// returned channel.
    pub fn hold_next_feed(&self) -> oneshot::Sender<Vec<Post>> {
        let (tx, rx) = oneshot::channel();
        self.inner.lock().unwrap().pending_feeds.push_back(rx);
        tx
    }

    fn record(&self, name: &'static str, call: Call) -> Fallible<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call);
        if inner.failing.contains(&name) {
            return Err(TfError::local(Cause::Network, "mock endpoint is failing"));
        }
        Ok(())
    }
}

pub fn post(id: i64, content: &str, replies: &[&str]) -> Post {
    Post {
        id: PostId(id),
        author_uid: None,
        content: content.to_owned(),
        like_count: 0,
        replies: replies
            .iter()
            .enumerate()
            .map(|(i, content)| Reply {
                id: i as i64 + 1,
                content: (*content).to_owned(),
            })
            .collect(),
        created_at: None,
    }
}

#[async_trait(?Send)]
impl super::Client for Client {
    async fn login(&self, req: LoginRequest) -> Fallible<LoginResponse> {
        self.record("login", Call::Login(req))?;
        let mut inner = self.inner.lock().unwrap();
        inner.next_user_id += 1;
        Ok(LoginResponse {
            user_id: inner.next_user_id,
        })
    }

    async fn list_posts(&self) -> Fallible<Vec<Post>> {
        self.record("list_posts", Call::ListPosts)?;
        let held = self.inner.lock().unwrap().pending_feeds.pop_front();
        if let Some(rx) = held {
            return rx
                .await
                .map_err(|_| TfError::local(Cause::Network, "held feed was dropped"));
        }
        Ok(self.inner.lock().unwrap().posts.clone())
    }

    async fn create_post(&self, req: NewPost) -> Fallible<()> {
        self.record("create_post", Call::CreatePost(req.clone()))?;
        let mut inner = self.inner.lock().unwrap();
        let id = inner.posts.iter().map(|p| p.id.0).max().unwrap_or(0) + 1;
        let mut new = post(id, &req.content, &[]);
        new.author_uid = Some(req.uid);
        inner.posts.insert(0, new);
        Ok(())
    }

    async fn like(&self, req: NewLike) -> Fallible<()> {
        self.record("like", Call::Like(req.clone()))?;
        let mut inner = self.inner.lock().unwrap();
        if let Some(post) = inner.posts.iter_mut().find(|p| p.id == req.post_id) {
            post.like_count += 1;
        }
        Ok(())
    }

    async fn reply(&self, req: NewReply) -> Fallible<()> {
        self.record("reply", Call::Reply(req.clone()))?;
        let mut inner = self.inner.lock().unwrap();
        if let Some(post) = inner.posts.iter_mut().find(|p| p.id == req.post_id) {
            let id = post.replies.len() as i64 + 1;
            post.replies.push(Reply {
                id,
                content: req.content,
            });
        }
        Ok(())
    }

    async fn summary(&self, post_id: PostId) -> Fallible<String> {
        self.record("summary", Call::Summary(post_id))?;
        let inner = self.inner.lock().unwrap();
        let replies = inner
            .posts
            .iter()
            .find(|p| p.id == post_id)
            .map(|p| p.replies.len())
            .unwrap_or(0);
        Ok(format!("{} replies, all positive", replies))
    }

    async fn get_profile(&self, uid: &str) -> Fallible<Profile> {
        self.record("get_profile", Call::GetProfile(uid.to_owned()))?;
        let inner = self.inner.lock().unwrap();
        Ok(inner.profiles.get(uid).cloned().unwrap_or_else(|| Profile {
            username: uid.to_owned(),
            profile_image_url: None,
        }))
    }

    async fn update_profile(&self, req: ProfileUpdate) -> Fallible<Profile> {
        self.record("update_profile", Call::UpdateProfile(req.clone()))?;
        let profile = Profile {
            username: req.username,
            profile_image_url: req.profile_image_url,
        };
        self.inner
            .lock()
            .unwrap()
            .profiles
            .insert(req.uid, profile.clone());
        Ok(profile)
    }
}
