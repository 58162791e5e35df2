//! Item directory tests: booking projections, search, comments

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use lendhub_server::{
    clock::FixedClock,
    error::AppError,
    models::{
        booking::CreateBooking,
        comment::CreateComment,
        item::{CreateItem, UpdateItem},
        user::CreateUser,
    },
    services::Services,
    storage::Storage,
};

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
}

fn services_at(storage: &Storage, now: DateTime<Utc>) -> Services {
    Services::new(storage.clone(), Arc::new(FixedClock(now)))
}

async fn register_user(services: &Services, name: &str, email: &str) -> i64 {
    services
        .users
        .create(CreateUser {
            name: name.to_string(),
            email: email.to_string(),
        })
        .await
        .expect("user creation failed")
        .id
}

async fn list_item(services: &Services, owner_id: i64, name: &str) -> i64 {
    services
        .items
        .create(
            owner_id,
            CreateItem {
                name: name.to_string(),
                description: format!("{} for lending", name),
                available: true,
            },
        )
        .await
        .expect("item creation failed")
        .id
}

/// Seed an approved booking spanning `[start, end]`
async fn approved_booking(
    services: &Services,
    owner_id: i64,
    booker_id: i64,
    item_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> i64 {
    let booking = services
        .bookings
        .create(
            booker_id,
            CreateBooking {
                item_id,
                start_date: start,
                end_date: end,
            },
        )
        .await
        .expect("booking creation failed");
    services
        .bookings
        .decide(owner_id, booking.id, true)
        .await
        .expect("approval failed");
    booking.id
}

#[tokio::test]
async fn owner_sees_last_and_next_bookings() {
    let start = noon();
    let storage = Storage::in_memory();
    let early = services_at(&storage, start);

    let owner = register_user(&early, "Olga", "olga@example.com").await;
    let booker = register_user(&early, "Boris", "boris@example.com").await;
    let item = list_item(&early, owner, "Drill").await;

    let past = approved_booking(
        &early,
        owner,
        booker,
        item,
        start + Duration::hours(1),
        start + Duration::hours(2),
    )
    .await;
    let upcoming = approved_booking(
        &early,
        owner,
        booker,
        item,
        start + Duration::hours(10),
        start + Duration::hours(11),
    )
    .await;

    // Five hours later: the first booking is over, the second not started
    let late = services_at(&storage, start + Duration::hours(5));

    let details = late.items.get_details(owner, item).await.unwrap();
    assert_eq!(details.last_booking.as_ref().map(|b| b.id), Some(past));
    assert_eq!(details.next_booking.as_ref().map(|b| b.id), Some(upcoming));

    let listing = late.items.list_for_owner(owner).await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].last_booking.as_ref().map(|b| b.id), Some(past));
    assert_eq!(listing[0].next_booking.as_ref().map(|b| b.id), Some(upcoming));
}

#[tokio::test]
async fn booking_projections_are_hidden_from_non_owners() {
    let start = noon();
    let storage = Storage::in_memory();
    let early = services_at(&storage, start);

    let owner = register_user(&early, "Olga", "olga@example.com").await;
    let booker = register_user(&early, "Boris", "boris@example.com").await;
    let item = list_item(&early, owner, "Drill").await;
    approved_booking(
        &early,
        owner,
        booker,
        item,
        start + Duration::hours(1),
        start + Duration::hours(2),
    )
    .await;

    let late = services_at(&storage, start + Duration::hours(5));
    let details = late.items.get_details(booker, item).await.unwrap();
    assert!(details.last_booking.is_none());
    assert!(details.next_booking.is_none());
}

#[tokio::test]
async fn projection_excludes_booking_ending_exactly_now() {
    let start = noon();
    let storage = Storage::in_memory();
    let early = services_at(&storage, start);

    let owner = register_user(&early, "Olga", "olga@example.com").await;
    let booker = register_user(&early, "Boris", "boris@example.com").await;
    let item = list_item(&early, owner, "Drill").await;
    approved_booking(
        &early,
        owner,
        booker,
        item,
        start + Duration::hours(1),
        start + Duration::hours(2),
    )
    .await;

    // At the exact end instant the booking is neither last nor next
    let boundary = services_at(&storage, start + Duration::hours(2));
    let details = boundary.items.get_details(owner, item).await.unwrap();
    assert!(details.last_booking.is_none());
    assert!(details.next_booking.is_none());
}

#[tokio::test]
async fn completed_booker_may_comment() {
    let start = noon();
    let storage = Storage::in_memory();
    let early = services_at(&storage, start);

    let owner = register_user(&early, "Olga", "olga@example.com").await;
    let booker = register_user(&early, "Boris", "boris@example.com").await;
    let stranger = register_user(&early, "Clara", "clara@example.com").await;
    let item = list_item(&early, owner, "Drill").await;
    approved_booking(
        &early,
        owner,
        booker,
        item,
        start + Duration::hours(1),
        start + Duration::hours(2),
    )
    .await;

    let late = services_at(&storage, start + Duration::hours(5));

    // No completed booking, no comment
    let denied = late
        .items
        .add_comment(
            stranger,
            item,
            CreateComment {
                text: "Looks great".to_string(),
            },
        )
        .await;
    assert!(matches!(denied, Err(AppError::Validation(_))));

    // The booker finished a booking and may comment
    let comment = late
        .items
        .add_comment(
            booker,
            item,
            CreateComment {
                text: "Solid drill, good battery".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(comment.author_name, "Boris");

    let details = late.items.get_details(owner, item).await.unwrap();
    assert_eq!(details.comments.len(), 1);
    assert_eq!(details.comments[0].text, "Solid drill, good battery");
}

#[tokio::test]
async fn booker_cannot_comment_before_booking_completes() {
    let start = noon();
    let storage = Storage::in_memory();
    let early = services_at(&storage, start);

    let owner = register_user(&early, "Olga", "olga@example.com").await;
    let booker = register_user(&early, "Boris", "boris@example.com").await;
    let item = list_item(&early, owner, "Drill").await;
    approved_booking(
        &early,
        owner,
        booker,
        item,
        start + Duration::hours(1),
        start + Duration::hours(2),
    )
    .await;

    // Still inside the booking interval
    let during = services_at(&storage, start + Duration::minutes(90));
    let result = during
        .items
        .add_comment(
            booker,
            item,
            CreateComment {
                text: "Too early".to_string(),
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn search_matches_name_and_description_case_insensitively() {
    let storage = Storage::in_memory();
    let services = services_at(&storage, noon());

    let owner = register_user(&services, "Olga", "olga@example.com").await;
    list_item(&services, owner, "Cordless drill").await;
    list_item(&services, owner, "Ladder").await;
    services
        .items
        .create(
            owner,
            CreateItem {
                name: "Old drill".to_string(),
                description: "Retired".to_string(),
                available: false,
            },
        )
        .await
        .unwrap();

    let found = services.items.search("DRILL").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Cordless drill");

    // Blank text yields no results
    assert!(services.items.search("").await.unwrap().is_empty());
    assert!(services.items.search("   ").await.unwrap().is_empty());
}

#[tokio::test]
async fn only_the_owner_updates_or_deletes_an_item() {
    let storage = Storage::in_memory();
    let services = services_at(&storage, noon());

    let owner = register_user(&services, "Olga", "olga@example.com").await;
    let other = register_user(&services, "Boris", "boris@example.com").await;
    let item = list_item(&services, owner, "Drill").await;

    let update = UpdateItem {
        name: None,
        description: None,
        available: Some(false),
    };
    let denied = services.items.update(other, item, update).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let updated = services
        .items
        .update(
            owner,
            item,
            UpdateItem {
                name: None,
                description: None,
                available: Some(false),
            },
        )
        .await
        .unwrap();
    assert!(!updated.available);

    let denied_delete = services.items.delete(other, item).await;
    assert!(matches!(denied_delete, Err(AppError::Forbidden(_))));

    services.items.delete(owner, item).await.unwrap();
    let gone = services.items.get_details(owner, item).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let storage = Storage::in_memory();
    let services = services_at(&storage, noon());

    register_user(&services, "Olga", "olga@example.com").await;
    let duplicate = services
        .users
        .create(CreateUser {
            name: "Impostor".to_string(),
            email: "olga@example.com".to_string(),
        })
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}
