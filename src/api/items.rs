//! Item management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        comment::{CommentDetails, CreateComment},
        item::{CreateItem, Item, ItemDetails, SearchQuery, UpdateItem},
    },
};

use super::CallerId;

/// List a new item for lending
#[utoipa::path(
    post,
    path = "/items",
    tag = "items",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Calling user id")
    ),
    request_body = CreateItem,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Owner not found")
    )
)]
pub async fn create_item(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
    Json(request): Json<CreateItem>,
) -> AppResult<(StatusCode, Json<Item>)> {
    let item = state.services.items.create(caller_id, request).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// List the caller's items with booking projections
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Calling user id")
    ),
    responses(
        (status = 200, description = "The caller's items", body = Vec<ItemDetails>)
    )
)]
pub async fn list_items(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
) -> AppResult<Json<Vec<ItemDetails>>> {
    let items = state.services.items.list_for_owner(caller_id).await?;
    Ok(Json(items))
}

/// Search available items by text
#[utoipa::path(
    get,
    path = "/items/search",
    tag = "items",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching available items", body = Vec<Item>)
    )
)]
pub async fn search_items(
    State(state): State<crate::AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Item>>> {
    let items = state
        .services
        .items
        .search(query.text.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(items))
}

/// Get an item with comments (and booking projections for the owner)
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Calling user id")
    ),
    responses(
        (status = 200, description = "Item details", body = ItemDetails),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_item(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
    Path(item_id): Path<i64>,
) -> AppResult<Json<ItemDetails>> {
    let item = state.services.items.get_details(caller_id, item_id).await?;
    Ok(Json(item))
}

/// Update an item (owner only)
#[utoipa::path(
    patch,
    path = "/items/{id}",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Calling user id")
    ),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn update_item(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
    Path(item_id): Path<i64>,
    Json(request): Json<UpdateItem>,
) -> AppResult<Json<Item>> {
    let item = state
        .services
        .items
        .update(caller_id, item_id, request)
        .await?;
    Ok(Json(item))
}

/// Delete an item (owner only)
#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Calling user id")
    ),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn delete_item(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
    Path(item_id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.items.delete(caller_id, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Comment on an item after a completed booking
#[utoipa::path(
    post,
    path = "/items/{id}/comment",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Calling user id")
    ),
    request_body = CreateComment,
    responses(
        (status = 201, description = "Comment created", body = CommentDetails),
        (status = 400, description = "No completed booking for this item"),
        (status = 404, description = "Item or user not found")
    )
)]
pub async fn add_comment(
    State(state): State<crate::AppState>,
    CallerId(caller_id): CallerId,
    Path(item_id): Path<i64>,
    Json(request): Json<CreateComment>,
) -> AppResult<(StatusCode, Json<CommentDetails>)> {
    let comment = state
        .services
        .items
        .add_comment(caller_id, item_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
