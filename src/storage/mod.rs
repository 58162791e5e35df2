//! Storage layer behind swappable profiles
//!
//! Every aggregate is persisted through a trait so the backing store can be
//! selected at startup: the in-memory profile for tests and demos, Postgres
//! for durable deployments.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        booking::{Booking, NewBooking},
        comment::{Comment, CommentDetails, NewComment},
        item::{Item, NewItem},
        user::{NewUser, User},
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStorage: Send + Sync {
    async fn insert(&self, user: NewUser) -> AppResult<User>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn exists(&self, id: i64) -> AppResult<bool>;
    async fn list(&self) -> AppResult<Vec<User>>;
    async fn save(&self, user: &User) -> AppResult<User>;
    async fn delete(&self, id: i64) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemStorage: Send + Sync {
    async fn insert(&self, item: NewItem) -> AppResult<Item>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Item>>;
    /// Items of one owner, ordered by id
    async fn find_by_owner(&self, owner_id: i64) -> AppResult<Vec<Item>>;
    /// Available items whose name or description contains `text`
    /// (case-insensitive), ordered by id
    async fn search_available(&self, text: &str) -> AppResult<Vec<Item>>;
    async fn save(&self, item: &Item) -> AppResult<Item>;
    async fn delete(&self, id: i64) -> AppResult<()>;
}

/// Booking store contract.
///
/// Reads are side-effect-free; `insert` and `save` are the only mutators.
/// Listing queries return bookings ordered ascending by start date.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingStorage: Send + Sync {
    /// Persist a new booking. The implementation is atomic with respect to
    /// the overlap rule: two concurrent inserts for intersecting intervals
    /// on the same item cannot both succeed.
    async fn insert(&self, booking: NewBooking) -> AppResult<Booking>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Booking>>;
    /// Full replace of an existing booking, used for status updates
    async fn save(&self, booking: &Booking) -> AppResult<Booking>;
    async fn find_by_booker(&self, booker_id: i64) -> AppResult<Vec<Booking>>;
    async fn find_by_item(&self, item_id: i64) -> AppResult<Vec<Booking>>;
    async fn find_by_item_owner(&self, owner_id: i64) -> AppResult<Vec<Booking>>;
    /// Latest approved booking for the item that ended before `now`
    async fn find_last_approved_before(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Booking>>;
    /// Earliest approved booking for the item that starts after `now`
    async fn find_next_approved_after(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Booking>>;
    /// Whether an approved booking on the item intersects `[start, end]`.
    /// Closed-interval test: a booking ending exactly when another starts
    /// counts as overlapping.
    async fn approved_overlap_exists(
        &self,
        item_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<bool>;
    /// Whether the booker has an approved booking on the item that ended
    /// before `now` (comment eligibility)
    async fn has_completed_approved(
        &self,
        booker_id: i64,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentStorage: Send + Sync {
    async fn insert(&self, comment: NewComment) -> AppResult<Comment>;
    /// Comments on one item with author names, ordered by creation time
    async fn find_details_by_item(&self, item_id: i64) -> AppResult<Vec<CommentDetails>>;
}

/// Container handing out the selected storage backends
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserStorage>,
    pub items: Arc<dyn ItemStorage>,
    pub bookings: Arc<dyn BookingStorage>,
    pub comments: Arc<dyn CommentStorage>,
}

impl Storage {
    /// In-memory profile: one shared store backs all aggregates
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::InMemoryStore::default());
        Self {
            users: store.clone(),
            items: store.clone(),
            bookings: store.clone(),
            comments: store,
        }
    }

    /// Durable profile backed by Postgres
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            users: Arc::new(postgres::PostgresUserStorage::new(pool.clone())),
            items: Arc::new(postgres::PostgresItemStorage::new(pool.clone())),
            bookings: Arc::new(postgres::PostgresBookingStorage::new(pool.clone())),
            comments: Arc::new(postgres::PostgresCommentStorage::new(pool)),
        }
    }
}
