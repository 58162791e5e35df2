//! User management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, NewUser, UpdateUser, User},
    storage::Storage,
};

#[derive(Clone)]
pub struct UserService {
    storage: Storage,
}

impl UserService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Register a new user. Email addresses are unique.
    pub async fn create(&self, request: CreateUser) -> AppResult<User> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self
            .storage
            .users
            .find_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Email {} is already registered",
                request.email
            )));
        }

        self.storage
            .users
            .insert(NewUser {
                name: request.name,
                email: request.email,
            })
            .await
    }

    pub async fn get_by_id(&self, user_id: i64) -> AppResult<User> {
        self.storage
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.storage.users.list().await
    }

    /// Partial update of a user's profile
    pub async fn update(&self, user_id: i64, request: UpdateUser) -> AppResult<User> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let mut user = self.get_by_id(user_id).await?;

        if let Some(email) = request.email {
            let taken = self
                .storage
                .users
                .find_by_email(&email)
                .await?
                .map(|existing| existing.id != user_id)
                .unwrap_or(false);
            if taken {
                return Err(AppError::Conflict(format!(
                    "Email {} is already registered",
                    email
                )));
            }
            user.email = email;
        }
        if let Some(name) = request.name {
            user.name = name;
        }

        self.storage.users.save(&user).await
    }

    pub async fn delete(&self, user_id: i64) -> AppResult<()> {
        // Resolve first so deleting an unknown user reports NotFound
        self.get_by_id(user_id).await?;
        self.storage.users.delete(user_id).await
    }
}
