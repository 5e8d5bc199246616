//! In-memory tables for the Faniko backend.
//!
//! Every collection is a plain `Vec` scanned linearly; the whole set sits
//! behind one mutex so each request sees and leaves a consistent snapshot.

pub mod creators;
pub mod error;
pub mod payments;
pub mod posts;
pub mod requests;
pub mod users;
pub mod validate;

use std::sync::Mutex;

use tracing::info;

use faniko_types::models::{
    Creator, CustomRequest, Post, Subscription, Transaction, UnlockedPost, User,
};

pub use error::{Result, StoreError};

pub const CREATOR_NOT_FOUND: &str = "Creator not found";
pub const POST_NOT_FOUND: &str = "Post not found";
pub const REQUEST_NOT_FOUND: &str = "Request not found";

/// Monotonic id source. Ids are never reused, even after deletes.
#[derive(Debug)]
pub struct Sequence(u64);

impl Default for Sequence {
    fn default() -> Self {
        Self(1)
    }
}

impl Sequence {
    pub fn next(&mut self) -> u64 {
        let id = self.0;
        self.0 += 1;
        id
    }
}

#[derive(Debug, Default)]
pub struct Tables {
    pub users: Vec<User>,
    pub creators: Vec<Creator>,
    pub posts: Vec<Post>,
    pub transactions: Vec<Transaction>,
    pub subscriptions: Vec<Subscription>,
    pub unlocked_posts: Vec<UnlockedPost>,
    pub custom_requests: Vec<CustomRequest>,

    user_ids: Sequence,
    creator_ids: Sequence,
    post_ids: Sequence,
    transaction_ids: Sequence,
    subscription_ids: Sequence,
    request_ids: Sequence,
}

impl Tables {
    pub fn creator_index(&self, username: &str) -> Result<usize> {
        self.creators
            .iter()
            .position(|c| validate::same_name(&c.username, username))
            .ok_or(StoreError::NotFound(CREATOR_NOT_FOUND))
    }

    pub fn creator(&self, username: &str) -> Result<&Creator> {
        self.creator_index(username).map(|i| &self.creators[i])
    }

    /// Position of a post owned by the given creator.
    pub fn post_index(&self, creator_username: &str, post_id: u64) -> Result<usize> {
        self.posts
            .iter()
            .position(|p| p.id == post_id && validate::same_name(&p.username, creator_username))
            .ok_or(StoreError::NotFound(POST_NOT_FOUND))
    }
}

pub struct Store {
    tables: Mutex<Tables>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        info!("In-memory store initialised");
        Self {
            tables: Mutex::new(Tables::default()),
        }
    }

    pub fn with_tables<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Tables) -> Result<T>,
    {
        let tables = self
            .tables
            .lock()
            .map_err(|e| anyhow::anyhow!("Store lock poisoned: {}", e))?;
        f(&tables)
    }

    pub fn with_tables_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Tables) -> Result<T>,
    {
        let mut tables = self
            .tables
            .lock()
            .map_err(|e| anyhow::anyhow!("Store lock poisoned: {}", e))?;
        f(&mut tables)
    }
}
