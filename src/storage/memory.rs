//! In-memory storage profile
//!
//! A single mutex-guarded store backs all aggregates so cross-aggregate
//! queries (bookings by item owner, comment author names) stay consistent.
//! Booking inserts run the overlap check under the same lock as the write,
//! which serializes concurrent creations per item.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{Booking, BookingStatus, NewBooking},
        comment::{Comment, CommentDetails, NewComment},
        item::{Item, NewItem},
        user::{NewUser, User},
    },
};

use super::{BookingStorage, CommentStorage, ItemStorage, UserStorage};

#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<i64, User>,
    items: HashMap<i64, Item>,
    bookings: HashMap<i64, Booking>,
    comments: HashMap<i64, Comment>,
    user_seq: i64,
    item_seq: i64,
    booking_seq: i64,
    comment_seq: i64,
}

impl Inner {
    fn approved_overlap(&self, item_id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.bookings.values().any(|b| {
            b.item_id == item_id
                && b.status == BookingStatus::Approved
                && b.start_date <= end
                && b.end_date >= start
        })
    }

    fn bookings_sorted<F>(&self, predicate: F) -> Vec<Booking>
    where
        F: Fn(&Booking) -> bool,
    {
        let mut bookings: Vec<Booking> = self
            .bookings
            .values()
            .filter(|b| predicate(b))
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.start_date);
        bookings
    }
}

impl InMemoryStore {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("in-memory store lock poisoned")
    }
}

#[async_trait]
impl UserStorage for InMemoryStore {
    async fn insert(&self, user: NewUser) -> AppResult<User> {
        let mut inner = self.lock();
        inner.user_seq += 1;
        let user = User {
            id: inner.user_seq,
            name: user.name,
            email: user.email,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn exists(&self, id: i64) -> AppResult<bool> {
        Ok(self.lock().users.contains_key(&id))
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = self.lock().users.values().cloned().collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn save(&self, user: &User) -> AppResult<User> {
        let mut inner = self.lock();
        if !inner.users.contains_key(&user.id) {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                user.id
            )));
        }
        inner.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.lock().users.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl ItemStorage for InMemoryStore {
    async fn insert(&self, item: NewItem) -> AppResult<Item> {
        let mut inner = self.lock();
        inner.item_seq += 1;
        let item = Item {
            id: inner.item_seq,
            name: item.name,
            description: item.description,
            available: item.available,
            owner_id: item.owner_id,
        };
        inner.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Item>> {
        Ok(self.lock().items.get(&id).cloned())
    }

    async fn find_by_owner(&self, owner_id: i64) -> AppResult<Vec<Item>> {
        let mut items: Vec<Item> = self
            .lock()
            .items
            .values()
            .filter(|i| i.owner_id == owner_id)
            .cloned()
            .collect();
        items.sort_by_key(|i| i.id);
        Ok(items)
    }

    async fn search_available(&self, text: &str) -> AppResult<Vec<Item>> {
        let needle = text.to_lowercase();
        let mut items: Vec<Item> = self
            .lock()
            .items
            .values()
            .filter(|i| {
                i.available
                    && (i.name.to_lowercase().contains(&needle)
                        || i.description.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        items.sort_by_key(|i| i.id);
        Ok(items)
    }

    async fn save(&self, item: &Item) -> AppResult<Item> {
        let mut inner = self.lock();
        if !inner.items.contains_key(&item.id) {
            return Err(AppError::NotFound(format!(
                "Item with id {} not found",
                item.id
            )));
        }
        inner.items.insert(item.id, item.clone());
        Ok(item.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.lock().items.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl BookingStorage for InMemoryStore {
    async fn insert(&self, booking: NewBooking) -> AppResult<Booking> {
        let mut inner = self.lock();
        // Check and insert under one lock: the overlap rule must hold even
        // for concurrent creations on the same item.
        if inner.approved_overlap(booking.item_id, booking.start_date, booking.end_date) {
            return Err(AppError::Validation(format!(
                "Item {} is already booked for an overlapping period",
                booking.item_id
            )));
        }
        inner.booking_seq += 1;
        let booking = Booking {
            id: inner.booking_seq,
            item_id: booking.item_id,
            booker_id: booking.booker_id,
            start_date: booking.start_date,
            end_date: booking.end_date,
            status: booking.status,
        };
        inner.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Booking>> {
        Ok(self.lock().bookings.get(&id).cloned())
    }

    async fn save(&self, booking: &Booking) -> AppResult<Booking> {
        let mut inner = self.lock();
        if !inner.bookings.contains_key(&booking.id) {
            return Err(AppError::NotFound(format!(
                "Booking with id {} not found",
                booking.id
            )));
        }
        inner.bookings.insert(booking.id, booking.clone());
        Ok(booking.clone())
    }

    async fn find_by_booker(&self, booker_id: i64) -> AppResult<Vec<Booking>> {
        Ok(self.lock().bookings_sorted(|b| b.booker_id == booker_id))
    }

    async fn find_by_item(&self, item_id: i64) -> AppResult<Vec<Booking>> {
        Ok(self.lock().bookings_sorted(|b| b.item_id == item_id))
    }

    async fn find_by_item_owner(&self, owner_id: i64) -> AppResult<Vec<Booking>> {
        let inner = self.lock();
        let mut bookings: Vec<Booking> = inner
            .bookings
            .values()
            .filter(|b| {
                inner
                    .items
                    .get(&b.item_id)
                    .map(|i| i.owner_id == owner_id)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.start_date);
        Ok(bookings)
    }

    async fn find_last_approved_before(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Booking>> {
        Ok(self
            .lock()
            .bookings
            .values()
            .filter(|b| {
                b.item_id == item_id
                    && b.status == BookingStatus::Approved
                    && b.end_date < now
            })
            .max_by_key(|b| b.end_date)
            .cloned())
    }

    async fn find_next_approved_after(
        &self,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Booking>> {
        Ok(self
            .lock()
            .bookings
            .values()
            .filter(|b| {
                b.item_id == item_id
                    && b.status == BookingStatus::Approved
                    && b.start_date > now
            })
            .min_by_key(|b| b.start_date)
            .cloned())
    }

    async fn approved_overlap_exists(
        &self,
        item_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<bool> {
        Ok(self.lock().approved_overlap(item_id, start, end))
    }

    async fn has_completed_approved(
        &self,
        booker_id: i64,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        Ok(self.lock().bookings.values().any(|b| {
            b.booker_id == booker_id
                && b.item_id == item_id
                && b.status == BookingStatus::Approved
                && b.end_date < now
        }))
    }
}

#[async_trait]
impl CommentStorage for InMemoryStore {
    async fn insert(&self, comment: NewComment) -> AppResult<Comment> {
        let mut inner = self.lock();
        inner.comment_seq += 1;
        let comment = Comment {
            id: inner.comment_seq,
            item_id: comment.item_id,
            author_id: comment.author_id,
            text: comment.text,
            created: comment.created,
        };
        inner.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_details_by_item(&self, item_id: i64) -> AppResult<Vec<CommentDetails>> {
        let inner = self.lock();
        let mut comments: Vec<CommentDetails> = inner
            .comments
            .values()
            .filter(|c| c.item_id == item_id)
            .map(|c| CommentDetails {
                id: c.id,
                text: c.text.clone(),
                author_name: inner
                    .users
                    .get(&c.author_id)
                    .map(|u| u.name.clone())
                    .unwrap_or_default(),
                created: c.created,
            })
            .collect();
        comments.sort_by_key(|c| c.created);
        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn store() -> InMemoryStore {
        InMemoryStore::default()
    }

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0).unwrap()
    }

    async fn seed_booking(
        store: &InMemoryStore,
        item_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: BookingStatus,
    ) -> Booking {
        let booking = BookingStorage::insert(
            store,
            NewBooking {
                item_id,
                booker_id: 1,
                start_date: start,
                end_date: end,
                status: BookingStatus::Waiting,
            },
        )
        .await
        .unwrap();
        let decided = Booking { status, ..booking };
        BookingStorage::save(store, &decided).await.unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = store();
        let first = UserStorage::insert(
            &store,
            NewUser {
                name: "Ada".into(),
                email: "ada@example.com".into(),
            },
        )
        .await
        .unwrap();
        let second = UserStorage::insert(
            &store,
            NewUser {
                name: "Brin".into(),
                email: "brin@example.com".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn overlap_uses_closed_intervals() {
        let store = store();
        seed_booking(&store, 7, ts(10), ts(11), BookingStatus::Approved).await;

        // Strict containment overlaps
        assert!(store.approved_overlap_exists(7, ts(10), ts(12)).await.unwrap());
        // Back-to-back counts as overlap: end of one equals start of the other
        assert!(store.approved_overlap_exists(7, ts(11), ts(12)).await.unwrap());
        assert!(store.approved_overlap_exists(7, ts(9), ts(10)).await.unwrap());
        // Disjoint does not
        assert!(!store.approved_overlap_exists(7, ts(12), ts(13)).await.unwrap());
        // Other items are unaffected
        assert!(!store.approved_overlap_exists(8, ts(10), ts(11)).await.unwrap());
    }

    #[tokio::test]
    async fn overlap_ignores_waiting_and_rejected() {
        let store = store();
        seed_booking(&store, 7, ts(10), ts(11), BookingStatus::Waiting).await;
        seed_booking(&store, 7, ts(10), ts(11), BookingStatus::Rejected).await;
        assert!(!store.approved_overlap_exists(7, ts(10), ts(11)).await.unwrap());
    }

    #[tokio::test]
    async fn insert_rejects_overlapping_booking() {
        let store = store();
        seed_booking(&store, 7, ts(10), ts(11), BookingStatus::Approved).await;

        let result = BookingStorage::insert(
            &store,
            NewBooking {
                item_id: 7,
                booker_id: 2,
                start_date: ts(10) + Duration::minutes(30),
                end_date: ts(11) + Duration::minutes(30),
                status: BookingStatus::Waiting,
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn last_and_next_projections_use_strict_comparisons() {
        let store = store();
        let past = seed_booking(&store, 7, ts(7), ts(8), BookingStatus::Approved).await;
        let ending_now = seed_booking(&store, 7, ts(10), ts(12), BookingStatus::Approved).await;
        let future = seed_booking(&store, 7, ts(14), ts(15), BookingStatus::Approved).await;

        let now = ts(12);
        // ending_now has end == now, excluded by the strict < comparison
        let last = store.find_last_approved_before(7, now).await.unwrap().unwrap();
        assert_eq!(last.id, past.id);
        let next = store.find_next_approved_after(7, now).await.unwrap().unwrap();
        assert_eq!(next.id, future.id);

        // A moment later the booking that just ended becomes the last one
        let last = store
            .find_last_approved_before(7, now + Duration::seconds(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(last.id, ending_now.id);
    }

    #[tokio::test]
    async fn find_by_item_owner_resolves_through_items() {
        let store = store();
        let owner = UserStorage::insert(
            &store,
            NewUser {
                name: "Owner".into(),
                email: "owner@example.com".into(),
            },
        )
        .await
        .unwrap();
        let item = ItemStorage::insert(
            &store,
            NewItem {
                name: "Drill".into(),
                description: "Cordless drill".into(),
                available: true,
                owner_id: owner.id,
            },
        )
        .await
        .unwrap();
        let later = seed_booking(&store, item.id, ts(12), ts(13), BookingStatus::Waiting).await;
        let earlier = seed_booking(&store, item.id, ts(9), ts(10), BookingStatus::Waiting).await;
        seed_booking(&store, item.id + 1, ts(9), ts(10), BookingStatus::Waiting).await;

        let bookings = store.find_by_item_owner(owner.id).await.unwrap();
        assert_eq!(
            bookings.iter().map(|b| b.id).collect::<Vec<_>>(),
            vec![earlier.id, later.id]
        );

        // Same bookings through the item-scoped query, same order
        let by_item = store.find_by_item(item.id).await.unwrap();
        assert_eq!(
            by_item.iter().map(|b| b.id).collect::<Vec<_>>(),
            vec![earlier.id, later.id]
        );
    }

    #[tokio::test]
    async fn search_only_returns_available_items() {
        let store = store();
        ItemStorage::insert(
            &store,
            NewItem {
                name: "Ladder".into(),
                description: "Aluminium ladder".into(),
                available: true,
                owner_id: 1,
            },
        )
        .await
        .unwrap();
        ItemStorage::insert(
            &store,
            NewItem {
                name: "Step ladder".into(),
                description: "Broken".into(),
                available: false,
                owner_id: 1,
            },
        )
        .await
        .unwrap();

        let found = store.search_available("LADDER").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ladder");
    }
}
