mod common;

use classifieds::error::ApiError;
use classifieds::models::AdvertPatch;
use classifieds::repository::{AdvertRepository, CategoryRepository, UserRepository};
use classifieds::search::{AdvertQuery, AdvertSortField, SortDirection, SortParam};
use std::collections::HashSet;

#[tokio::test]
async fn test_create_advert_with_categories() {
    let db = common::setup_test_db().await;
    let author = common::create_user(&db.pool, "seller").await;

    let advert = common::create_advert(&db.pool, author.id, "Hammer", 15, &["tools", "garden", "tools"]).await;

    assert_eq!(advert.author_id, author.id);
    assert_eq!(advert.author, "seller");
    assert_eq!(advert.categories, vec!["garden".to_string(), "tools".to_string()]);
    assert!(advert.image.is_none());

    let categories = CategoryRepository::new(db.pool.clone())
        .list(None, 10)
        .await
        .expect("Failed to list categories");
    assert_eq!(categories.total, 2);
}

#[tokio::test]
async fn test_create_advert_unknown_author() {
    let db = common::setup_test_db().await;
    let repo = AdvertRepository::new(db.pool.clone());

    let result = repo.create(common::test_advert(4242, "Orphan", 10, &["misc"])).await;

    assert!(matches!(result, Err(ApiError::NotFound(_))));

    // Nothing from the failed transaction survives
    let categories = CategoryRepository::new(db.pool.clone())
        .list(None, 10)
        .await
        .expect("Failed to list categories");
    assert_eq!(categories.total, 0);
}

#[tokio::test]
async fn test_create_advert_rejects_negative_price() {
    let db = common::setup_test_db().await;
    let author = common::create_user(&db.pool, "seller").await;
    let repo = AdvertRepository::new(db.pool.clone());

    let result = repo.create(common::test_advert(author.id, "Broken", -1, &[])).await;

    assert!(matches!(result, Err(ApiError::ValidationError(_))));
}

#[tokio::test]
async fn test_update_advert_replaces_categories() {
    let db = common::setup_test_db().await;
    let author = common::create_user(&db.pool, "seller").await;
    let repo = AdvertRepository::new(db.pool.clone());

    let advert = common::create_advert(&db.pool, author.id, "Bike", 120, &["sport", "outdoor"]).await;

    let updated = repo
        .update(
            advert.id,
            AdvertPatch {
                price: Some(100),
                category_id: Some(vec!["transport".to_string()]),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update advert");

    assert_eq!(updated.price, 100);
    assert_eq!(updated.name, "Bike");
    assert_eq!(updated.categories, vec!["transport".to_string()]);
}

#[tokio::test]
async fn test_update_advert_without_categories_keeps_them() {
    let db = common::setup_test_db().await;
    let author = common::create_user(&db.pool, "seller").await;
    let repo = AdvertRepository::new(db.pool.clone());

    let advert = common::create_advert(&db.pool, author.id, "Lamp", 20, &["home"]).await;

    let updated = repo
        .update(
            advert.id,
            AdvertPatch {
                name: Some("Desk lamp".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update advert");

    assert_eq!(updated.name, "Desk lamp");
    assert_eq!(updated.categories, vec!["home".to_string()]);
}

#[tokio::test]
async fn test_update_advert_clears_description() {
    let db = common::setup_test_db().await;
    let author = common::create_user(&db.pool, "seller").await;
    let repo = AdvertRepository::new(db.pool.clone());

    let advert = common::create_advert(&db.pool, author.id, "Kettle", 18, &[]).await;
    assert!(advert.description.is_some());

    let cleared = repo
        .update(
            advert.id,
            AdvertPatch {
                description: Some(None),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update advert");
    assert_eq!(cleared.description, None);

    let described = repo
        .update(
            advert.id,
            AdvertPatch {
                description: Some(Some("Barely used".to_string())),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update advert");
    assert_eq!(described.description.as_deref(), Some("Barely used"));

    // Blank text clears too; an absent field keeps the stored value
    let blanked = repo
        .update(
            advert.id,
            AdvertPatch {
                description: Some(Some("  ".to_string())),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update advert");
    assert_eq!(blanked.description, None);

    repo.update(
        advert.id,
        AdvertPatch {
            description: Some(Some("Boxed".to_string())),
            ..Default::default()
        },
    )
    .await
    .expect("Failed to update advert");
    let kept = repo
        .update(
            advert.id,
            AdvertPatch {
                price: Some(20),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update advert");
    assert_eq!(kept.description.as_deref(), Some("Boxed"));
}

#[tokio::test]
async fn test_update_missing_advert() {
    let db = common::setup_test_db().await;
    let repo = AdvertRepository::new(db.pool.clone());

    let result = repo.update(999, AdvertPatch::default()).await;

    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_pages_cover_every_advert_once() {
    let db = common::setup_test_db().await;
    let author = common::create_user(&db.pool, "seller").await;
    let repo = AdvertRepository::new(db.pool.clone());

    // Equal prices exercise the id tie-break
    for i in 0..7 {
        common::create_advert(&db.pool, author.id, &format!("Item {}", i), 10 * (i % 3), &[]).await;
    }

    let mut seen = Vec::new();
    for page in 1..=3 {
        let query = AdvertQuery {
            page: Some(page.to_string()),
            ..Default::default()
        };
        let result = repo.list(&query, 3).await.expect("Failed to list adverts");
        assert_eq!(result.total, 7);
        assert_eq!(result.num_pages, 3);
        seen.extend(result.items.into_iter().map(|a| a.id));
    }

    assert_eq!(seen.len(), 7);
    assert_eq!(seen.iter().collect::<HashSet<_>>().len(), 7);
}

#[tokio::test]
async fn test_page_out_of_range_returns_last_page() {
    let db = common::setup_test_db().await;
    let author = common::create_user(&db.pool, "seller").await;
    let repo = AdvertRepository::new(db.pool.clone());

    for i in 0..5 {
        common::create_advert(&db.pool, author.id, &format!("Item {}", i), i, &[]).await;
    }

    let query = AdvertQuery {
        page: Some("99".to_string()),
        sort: SortParam {
            field: AdvertSortField::Price,
            direction: SortDirection::Ascending,
        },
        ..Default::default()
    };
    let result = repo.list(&query, 2).await.expect("Failed to list adverts");

    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].price, 4);
}

#[tokio::test]
async fn test_list_filters() {
    let db = common::setup_test_db().await;
    let author = common::create_user(&db.pool, "seller").await;
    let repo = AdvertRepository::new(db.pool.clone());

    let drill = common::create_advert(&db.pool, author.id, "Power drill", 80, &["tools"]).await;
    common::create_advert(&db.pool, author.id, "Drill bits", 15, &["tools"]).await;
    common::create_advert(&db.pool, author.id, "Sofa", 300, &["home"]).await;

    let tools = CategoryRepository::new(db.pool.clone())
        .list(None, 10)
        .await
        .expect("Failed to list categories")
        .items
        .into_iter()
        .find(|c| c.name == "tools")
        .expect("tools category exists");

    let query = AdvertQuery {
        category_id: Some(tools.id),
        text: Some("drill".to_string()),
        price_from: Some(50),
        ..Default::default()
    };
    let result = repo.list(&query, 10).await.expect("Failed to list adverts");

    assert_eq!(result.total, 1);
    assert_eq!(result.items[0].id, drill.id);
}

#[tokio::test]
async fn test_delete_category_keeps_advert() {
    let db = common::setup_test_db().await;
    let author = common::create_user(&db.pool, "seller").await;
    let adverts = AdvertRepository::new(db.pool.clone());
    let categories = CategoryRepository::new(db.pool.clone());

    let advert = common::create_advert(&db.pool, author.id, "Chair", 25, &["home", "office"]).await;
    let office = categories
        .list(None, 10)
        .await
        .expect("Failed to list categories")
        .items
        .into_iter()
        .find(|c| c.name == "office")
        .expect("office category exists");

    categories.delete(office.id).await.expect("Failed to delete category");

    let advert = adverts.read(advert.id).await.expect("Advert should survive");
    assert_eq!(advert.categories, vec!["home".to_string()]);
}

#[tokio::test]
async fn test_delete_user_removes_adverts() {
    let db = common::setup_test_db().await;
    let author = common::create_user(&db.pool, "seller").await;
    let adverts = AdvertRepository::new(db.pool.clone());

    let advert = common::create_advert(&db.pool, author.id, "Table", 50, &[]).await;

    UserRepository::new(db.pool.clone())
        .delete(author.id)
        .await
        .expect("Failed to delete user");

    assert!(matches!(adverts.read(advert.id).await, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_set_image_returns_previous_path() {
    let db = common::setup_test_db().await;
    let author = common::create_user(&db.pool, "seller").await;
    let repo = AdvertRepository::new(db.pool.clone());

    let advert = common::create_advert(&db.pool, author.id, "Camera", 200, &[]).await;

    let (_, previous) = repo
        .set_image(advert.id, "images/first.png")
        .await
        .expect("Failed to set image");
    assert!(previous.is_none());

    let (updated, previous) = repo
        .set_image(advert.id, "images/second.png")
        .await
        .expect("Failed to set image");
    assert_eq!(previous.as_deref(), Some("images/first.png"));
    assert_eq!(updated.image.as_deref(), Some("images/second.png"));

    let removed = repo.delete(advert.id).await.expect("Failed to delete advert");
    assert_eq!(removed.as_deref(), Some("images/second.png"));
}
