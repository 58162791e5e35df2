//! Business logic services

pub mod bookings;
pub mod items;
pub mod users;

use std::sync::Arc;

use crate::{clock::Clock, storage::Storage};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UserService,
    pub items: items::ItemService,
    pub bookings: bookings::BookingService,
}

impl Services {
    /// Create all services over the selected storage profile
    pub fn new(storage: Storage, clock: Arc<dyn Clock>) -> Self {
        Self {
            users: users::UserService::new(storage.clone()),
            items: items::ItemService::new(storage.clone(), clock.clone()),
            bookings: bookings::BookingService::new(storage, clock),
        }
    }
}
