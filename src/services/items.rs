//! Item management service

use std::sync::Arc;

use validator::Validate;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{
        comment::{CommentDetails, CreateComment, NewComment},
        item::{CreateItem, Item, ItemDetails, NewItem, UpdateItem},
    },
    storage::Storage,
};

#[derive(Clone)]
pub struct ItemService {
    storage: Storage,
    clock: Arc<dyn Clock>,
}

impl ItemService {
    pub fn new(storage: Storage, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// List a new item for lending
    pub async fn create(&self, owner_id: i64, request: CreateItem) -> AppResult<Item> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if !self.storage.users.exists(owner_id).await? {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                owner_id
            )));
        }

        self.storage
            .items
            .insert(NewItem {
                name: request.name,
                description: request.description,
                available: request.available,
                owner_id,
            })
            .await
    }

    /// Partial update of an item (owner only)
    pub async fn update(
        &self,
        caller_id: i64,
        item_id: i64,
        request: UpdateItem,
    ) -> AppResult<Item> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let mut item = self.get_item(item_id).await?;
        self.require_owner(&item, caller_id)?;

        if let Some(name) = request.name {
            item.name = name;
        }
        if let Some(description) = request.description {
            item.description = description;
        }
        if let Some(available) = request.available {
            item.available = available;
        }

        self.storage.items.save(&item).await
    }

    /// Item detail view with comments. Booking projections (last and next
    /// approved booking) are only visible to the owner.
    pub async fn get_details(&self, caller_id: i64, item_id: i64) -> AppResult<ItemDetails> {
        let item = self.get_item(item_id).await?;
        let with_bookings = item.owner_id == caller_id;
        self.project(item, with_bookings).await
    }

    /// All items of one owner, each with its booking projections
    pub async fn list_for_owner(&self, owner_id: i64) -> AppResult<Vec<ItemDetails>> {
        let items = self.storage.items.find_by_owner(owner_id).await?;
        let mut details = Vec::with_capacity(items.len());
        for item in items {
            details.push(self.project(item, true).await?);
        }
        Ok(details)
    }

    /// Free-text search over available items. Blank input yields no results.
    pub async fn search(&self, text: &str) -> AppResult<Vec<Item>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.storage.items.search_available(text).await
    }

    /// Delete an item (owner only)
    pub async fn delete(&self, caller_id: i64, item_id: i64) -> AppResult<()> {
        let item = self.get_item(item_id).await?;
        self.require_owner(&item, caller_id)?;
        self.storage.items.delete(item_id).await
    }

    /// Post a comment on an item. Only a booker with a completed approved
    /// booking on the item may comment.
    pub async fn add_comment(
        &self,
        caller_id: i64,
        item_id: i64,
        request: CreateComment,
    ) -> AppResult<CommentDetails> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.get_item(item_id).await?;
        let author = self
            .storage
            .users
            .find_by_id(caller_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", caller_id)))?;

        let now = self.clock.now();
        if !self
            .storage
            .bookings
            .has_completed_approved(caller_id, item_id, now)
            .await?
        {
            return Err(AppError::Validation(format!(
                "User {} has no completed booking for item {}",
                caller_id, item_id
            )));
        }

        let comment = self
            .storage
            .comments
            .insert(NewComment {
                item_id,
                author_id: caller_id,
                text: request.text,
                created: now,
            })
            .await?;

        Ok(CommentDetails {
            id: comment.id,
            text: comment.text,
            author_name: author.name,
            created: comment.created,
        })
    }

    async fn get_item(&self, item_id: i64) -> AppResult<Item> {
        self.storage
            .items
            .find_by_id(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", item_id)))
    }

    fn require_owner(&self, item: &Item, caller_id: i64) -> AppResult<()> {
        if item.owner_id != caller_id {
            return Err(AppError::Forbidden(format!(
                "User {} is not the owner of item {}",
                caller_id, item.id
            )));
        }
        Ok(())
    }

    async fn project(&self, item: Item, with_bookings: bool) -> AppResult<ItemDetails> {
        let comments = self.storage.comments.find_details_by_item(item.id).await?;

        let (last_booking, next_booking) = if with_bookings {
            let now = self.clock.now();
            let last = self
                .storage
                .bookings
                .find_last_approved_before(item.id, now)
                .await?;
            let next = self
                .storage
                .bookings
                .find_next_approved_after(item.id, now)
                .await?;
            (last.map(Into::into), next.map(Into::into))
        } else {
            (None, None)
        };

        Ok(ItemDetails {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            owner_id: item.owner_id,
            last_booking,
            next_booking,
            comments,
        })
    }
}
