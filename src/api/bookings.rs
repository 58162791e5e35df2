//! Booking lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::booking::{Booking, BookingQuery, CreateBooking, DecideQuery},
};

use super::CallerId;

/// Create a booking request for an item
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Calling user id")
    ),
    request_body = CreateBooking,
    responses(
        (status = 201, description = "Booking created in WAITING status", body = Booking),
        (status = 400, description = "Malformed interval, unavailable item or overlapping booking"),
        (status = 404, description = "User or item not found")
    )
)]
pub async fn create_booking(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
    Json(request): Json<CreateBooking>,
) -> AppResult<(StatusCode, Json<Booking>)> {
    let booking = state.services.bookings.create(caller_id, request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Approve or reject a waiting booking (item owner only)
#[utoipa::path(
    patch,
    path = "/bookings/{id}",
    tag = "bookings",
    params(
        ("id" = i64, Path, description = "Booking ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Calling user id"),
        DecideQuery
    ),
    responses(
        (status = 200, description = "Booking decided", body = Booking),
        (status = 400, description = "Booking already decided"),
        (status = 403, description = "Caller does not own the booked item"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn decide_booking(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
    Path(booking_id): Path<i64>,
    Query(query): Query<DecideQuery>,
) -> AppResult<Json<Booking>> {
    let booking = state
        .services
        .bookings
        .decide(caller_id, booking_id, query.approved)
        .await?;
    Ok(Json(booking))
}

/// Get a booking by id
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "bookings",
    params(
        ("id" = i64, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Booking", body = Booking),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn get_booking(
    State(state): State<crate::AppState>,
    Path(booking_id): Path<i64>,
) -> AppResult<Json<Booking>> {
    let booking = state.services.bookings.get_by_id(booking_id).await?;
    Ok(Json(booking))
}

/// List the caller's own bookings filtered by state
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Calling user id"),
        BookingQuery
    ),
    responses(
        (status = 200, description = "The caller's bookings", body = Vec<Booking>),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_my_bookings(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
    Query(query): Query<BookingQuery>,
) -> AppResult<Json<Vec<Booking>>> {
    let bookings = state
        .services
        .bookings
        .list_for_booker(caller_id, query.state, caller_id)
        .await?;
    Ok(Json(bookings))
}

/// List the bookings of a specific user filtered by state
#[utoipa::path(
    get,
    path = "/users/{id}/bookings",
    tag = "bookings",
    params(
        ("id" = i64, Path, description = "User ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Calling user id"),
        BookingQuery
    ),
    responses(
        (status = 200, description = "The user's bookings", body = Vec<Booking>),
        (status = 403, description = "Caller is not the requested user"),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_user_bookings(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
    Path(user_id): Path<i64>,
    Query(query): Query<BookingQuery>,
) -> AppResult<Json<Vec<Booking>>> {
    let bookings = state
        .services
        .bookings
        .list_for_booker(user_id, query.state, caller_id)
        .await?;
    Ok(Json(bookings))
}

/// List bookings made against the caller's items, filtered by state
#[utoipa::path(
    get,
    path = "/bookings/owner",
    tag = "bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Calling user id"),
        BookingQuery
    ),
    responses(
        (status = 200, description = "Bookings on the caller's items", body = Vec<Booking>),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_owner_bookings(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
    Query(query): Query<BookingQuery>,
) -> AppResult<Json<Vec<Booking>>> {
    let bookings = state
        .services
        .bookings
        .list_for_owner(caller_id, query.state)
        .await?;
    Ok(Json(bookings))
}
