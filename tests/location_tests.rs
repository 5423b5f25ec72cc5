mod common;

use bigdecimal::BigDecimal;
use classifieds::error::ApiError;
use classifieds::models::{LocationPatch, NewLocation};
use classifieds::repository::{LocationRepository, UserRepository};
use std::str::FromStr;

fn decimal(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).expect("valid decimal")
}

fn new_location(name: &str, lat: &str, lng: &str) -> NewLocation {
    NewLocation {
        name: name.to_string(),
        lat: decimal(lat),
        lng: decimal(lng),
    }
}

#[tokio::test]
async fn test_list_locations_ordered_by_name() {
    let db = common::setup_test_db().await;
    let repo = LocationRepository::new(db.pool.clone());

    for (name, lat, lng) in [("Vienna", "48.2082", "16.3738"), ("Athens", "37.9838", "23.7275"), ("Madrid", "40.4168", "-3.7038")] {
        repo.create(new_location(name, lat, lng)).await.expect("Failed to create location");
    }

    let page = repo.list(None, 2).await.expect("Failed to list locations");
    assert_eq!(page.total, 3);
    assert_eq!(page.num_pages, 2);
    let names: Vec<_> = page.items.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Athens", "Madrid"]);
}

#[tokio::test]
async fn test_update_location_partially() {
    let db = common::setup_test_db().await;
    let repo = LocationRepository::new(db.pool.clone());

    let location = repo
        .create(new_location("Lisbon", "38.7223", "-9.1393"))
        .await
        .expect("Failed to create location");

    let updated = repo
        .update(
            location.id,
            LocationPatch {
                name: Some("Lisboa".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update location");

    assert_eq!(updated.name, "Lisboa");
    assert_eq!(updated.lat, location.lat);
    assert_eq!(updated.lng, location.lng);
}

#[tokio::test]
async fn test_update_location_rejects_out_of_range_coordinates() {
    let db = common::setup_test_db().await;
    let repo = LocationRepository::new(db.pool.clone());

    let location = repo
        .create(new_location("Quito", "-0.1807", "-78.4678"))
        .await
        .expect("Failed to create location");

    let result = repo
        .update(
            location.id,
            LocationPatch {
                lat: Some(decimal("91")),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(ApiError::ValidationError(_))));
    assert_eq!(result.err().map(|e| e.status().as_u16()), Some(422));

    let unchanged = repo.read(location.id).await.expect("Failed to read location");
    assert_eq!(unchanged.lat, location.lat);
}

#[tokio::test]
async fn test_delete_location_detaches_users() {
    let db = common::setup_test_db().await;
    let users = UserRepository::new(db.pool.clone());
    let locations = LocationRepository::new(db.pool.clone());

    let mut input = common::test_user("nina");
    input.location = Some("Prague".to_string());
    input.lat = Some(decimal("50.0755"));
    input.lng = Some(decimal("14.4378"));
    let user = users.create(input).await.expect("Failed to create user");
    let location_id = user.location_id.expect("location attached");

    locations.delete(location_id).await.expect("Failed to delete location");

    let user = users.read(user.id).await.expect("User should survive");
    assert_eq!(user.location_id, None);
    assert_eq!(user.location, None);

    assert!(matches!(locations.read(location_id).await, Err(ApiError::NotFound(_))));
    assert!(matches!(locations.delete(location_id).await, Err(ApiError::NotFound(_))));
}
