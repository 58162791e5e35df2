//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{bookings, health, items, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LendHub API",
        version = "0.3.0",
        description = "Peer-to-peer item lending and booking REST API",
        license(name = "MIT")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Users
        users::create_user,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        // Items
        items::create_item,
        items::list_items,
        items::search_items,
        items::get_item,
        items::update_item,
        items::delete_item,
        items::add_comment,
        // Bookings
        bookings::create_booking,
        bookings::decide_booking,
        bookings::get_booking,
        bookings::list_my_bookings,
        bookings::list_user_bookings,
        bookings::list_owner_bookings,
    ),
    components(
        schemas(
            // Users
            crate::models::user::User,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            // Items
            crate::models::item::Item,
            crate::models::item::ItemDetails,
            crate::models::item::CreateItem,
            crate::models::item::UpdateItem,
            // Comments
            crate::models::comment::Comment,
            crate::models::comment::CommentDetails,
            crate::models::comment::CreateComment,
            // Bookings
            crate::models::booking::Booking,
            crate::models::booking::BookingShort,
            crate::models::booking::BookingStatus,
            crate::models::booking::BookingState,
            crate::models::booking::CreateBooking,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User management"),
        (name = "items", description = "Item management and search"),
        (name = "bookings", description = "Booking lifecycle")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
