//! The cached feed, plus the bookkeeping that stops an old fetch from overwriting a newer one.
use crate::feedapi::structs::{Post, PostId};

/// Outcome of the most recent fetch that was allowed to touch the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    NotLoaded,
    Loading,
    Loaded,
    /// The last fetch failed. The feed is empty, but that says nothing about the server.
    Failed,
}

/// Handed out when a fetch starts; only the newest ticket may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
pub struct Feed {
    posts: Vec<Post>,
    status: FeedStatus,
    generation: u64,
}

impl Default for Feed {
    fn default() -> Self {
        Self {
            posts: Vec::new(),
            status: FeedStatus::NotLoaded,
            generation: 0,
        }
    }
}

impl Feed {
    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.status = FeedStatus::Loading;
        Ticket(self.generation)
    }

    /// Apply a fetch result, `None` meaning the fetch failed. Returns false if a newer fetch
    /// (or an invalidation) has happened since `ticket` was issued, in which case nothing changes.
    pub fn finish(&mut self, ticket: Ticket, posts: Option<Vec<Post>>) -> bool {
        if ticket.0 != self.generation {
            return false;
        }
        match posts {
            Some(posts) => {
                self.posts = posts;
                self.status = FeedStatus::Loaded;
            }
            None => {
                self.posts.clear();
                self.status = FeedStatus::Failed;
            }
        }
        true
    }

    /// Forget the feed and orphan every fetch still in flight.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.posts.clear();
        self.status = FeedStatus::NotLoaded;
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn status(&self) -> FeedStatus {
        self.status
    }

    pub fn find(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }
}
