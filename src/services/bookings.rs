//! Booking lifecycle service
//!
//! Owns the booking state machine: creation with overlap protection,
//! owner-only approval, and state-filtered listings.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::booking::{Booking, BookingState, BookingStatus, CreateBooking, NewBooking},
    storage::Storage,
};

#[derive(Clone)]
pub struct BookingService {
    storage: Storage,
    clock: Arc<dyn Clock>,
}

impl BookingService {
    pub fn new(storage: Storage, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Create a booking request for an item.
    ///
    /// The booking starts in `Waiting` status. Creation fails when the
    /// interval is malformed, the item is unavailable, or an approved
    /// booking already occupies an intersecting interval (closed-interval
    /// test, so back-to-back bookings are rejected too).
    pub async fn create(&self, caller_id: i64, request: CreateBooking) -> AppResult<Booking> {
        let now = self.clock.now();

        if request.end_date <= request.start_date {
            return Err(AppError::Validation(
                "Booking end must be after its start".to_string(),
            ));
        }
        if request.start_date < now {
            return Err(AppError::Validation(
                "Booking start must not be in the past".to_string(),
            ));
        }

        self.storage
            .users
            .find_by_id(caller_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", caller_id)))?;

        let item = self
            .storage
            .items
            .find_by_id(request.item_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Item with id {} not found", request.item_id))
            })?;

        if !item.available {
            return Err(AppError::Validation(format!(
                "Item {} is not available for booking",
                item.id
            )));
        }

        if self
            .storage
            .bookings
            .approved_overlap_exists(item.id, request.start_date, request.end_date)
            .await?
        {
            return Err(AppError::Validation(format!(
                "Item {} is already booked for an overlapping period",
                item.id
            )));
        }

        // The store repeats the overlap check atomically inside insert, so
        // concurrent creations for the same item cannot both pass.
        self.storage
            .bookings
            .insert(NewBooking {
                item_id: item.id,
                booker_id: caller_id,
                start_date: request.start_date,
                end_date: request.end_date,
                status: BookingStatus::Waiting,
            })
            .await
    }

    /// Approve or reject a waiting booking. Only the owner of the booked
    /// item may decide, and only while the booking is still `Waiting`.
    pub async fn decide(
        &self,
        caller_id: i64,
        booking_id: i64,
        approved: bool,
    ) -> AppResult<Booking> {
        let mut booking = self
            .storage
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Booking with id {} not found", booking_id))
            })?;

        let item = self
            .storage
            .items
            .find_by_id(booking.item_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Item with id {} not found", booking.item_id))
            })?;

        if item.owner_id != caller_id {
            return Err(AppError::Forbidden(format!(
                "User {} is not the owner of item {}",
                caller_id, item.id
            )));
        }

        if booking.status != BookingStatus::Waiting {
            return Err(AppError::Validation(format!(
                "Booking {} has already been decided",
                booking_id
            )));
        }

        booking.status = if approved {
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        };

        self.storage.bookings.save(&booking).await
    }

    /// Get a booking by id. No authorization check: the booking id is
    /// treated as a capability reference.
    pub async fn get_by_id(&self, booking_id: i64) -> AppResult<Booking> {
        self.storage
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking with id {} not found", booking_id)))
    }

    /// List a user's bookings filtered by state. The subject must be the
    /// requester.
    pub async fn list_for_booker(
        &self,
        user_id: i64,
        state: BookingState,
        requester_id: i64,
    ) -> AppResult<Vec<Booking>> {
        if user_id != requester_id {
            tracing::warn!(user_id, requester_id, "booking listing denied");
            return Err(AppError::Forbidden(format!(
                "User {} has no access to bookings of user {}",
                requester_id, user_id
            )));
        }

        if !self.storage.users.exists(user_id).await? {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                user_id
            )));
        }

        let bookings = self.storage.bookings.find_by_booker(user_id).await?;
        Ok(classify(bookings, state, self.clock.now()))
    }

    /// List bookings made against the owner's items, filtered by state
    pub async fn list_for_owner(
        &self,
        owner_id: i64,
        state: BookingState,
    ) -> AppResult<Vec<Booking>> {
        if !self.storage.users.exists(owner_id).await? {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                owner_id
            )));
        }

        let bookings = self.storage.bookings.find_by_item_owner(owner_id).await?;
        Ok(classify(bookings, state, self.clock.now()))
    }
}

/// Partition bookings by their relation to `now` or by status.
///
/// `Current` uses strict inequalities: a booking starting or ending exactly
/// at `now` is not current. Input order is preserved.
pub fn classify(bookings: Vec<Booking>, state: BookingState, now: DateTime<Utc>) -> Vec<Booking> {
    match state {
        BookingState::All => bookings,
        BookingState::Current => bookings
            .into_iter()
            .filter(|b| b.start_date < now && b.end_date > now)
            .collect(),
        BookingState::Past => bookings.into_iter().filter(|b| b.end_date < now).collect(),
        BookingState::Future => bookings
            .into_iter()
            .filter(|b| b.start_date > now)
            .collect(),
        BookingState::Waiting => bookings
            .into_iter()
            .filter(|b| b.status == BookingStatus::Waiting)
            .collect(),
        BookingState::Rejected => bookings
            .into_iter()
            .filter(|b| b.status == BookingStatus::Rejected)
            .collect(),
    }
}
