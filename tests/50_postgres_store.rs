//! `PgStore` against a live database. Every test returns early when
//! `DATABASE_URL` is unset, so the suite stays green without Postgres.

use menu_api::config::AppConfig;
use menu_api::database::models::{DishChanges, MenuChanges, NewDish, NewMenu};
use menu_api::database::{MenuStore, PgStore, StoreError};
use menu_api::types::{PrepTime, Price};

async fn connect() -> Option<PgStore> {
    let _ = dotenvy::dotenv();
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            eprintln!("DATABASE_URL not set; skipping Postgres store test");
            return None;
        }
    };

    let store = PgStore::connect(&url, &AppConfig::development().database)
        .await
        .expect("connect to Postgres");
    store.migrate().await.expect("apply migrations");
    Some(store)
}

/// Menu names are unique across the shared database
fn unique_name(label: &str) -> String {
    format!("{}-{}", label, uuid::Uuid::new_v4())
}

fn new_dish(name: &str) -> NewDish {
    NewDish {
        name: name.to_string(),
        description: "TestDishDescription1".to_string(),
        price: "20.55".parse::<Price>().expect("price"),
        preparation_time: "1 02:03:04.5".parse::<PrepTime>().expect("duration"),
        is_vegetarian: true,
    }
}

async fn insert_menu(store: &PgStore, label: &str) -> i64 {
    store
        .insert_menu(NewMenu {
            name: unique_name(label),
            description: String::new(),
        })
        .await
        .expect("insert menu")
        .id
}

#[tokio::test]
async fn price_and_duration_survive_the_round_trip() {
    let Some(store) = connect().await else { return };
    let menu = insert_menu(&store, "RoundTrip").await;

    let dish = store
        .insert_dish(menu, new_dish("Soup"))
        .await
        .expect("insert dish")
        .expect("menu exists");
    assert_eq!(dish.menu_id, menu);

    let stored = store.get_dish(dish.id).await.expect("get dish").expect("dish exists");
    assert_eq!(stored.price.to_string(), "20.55");
    assert_eq!(stored.preparation_time.to_string(), "1 02:03:04.500000");
    assert!(stored.is_vegetarian);
    assert_eq!(stored.image, None);

    store.delete_menu(menu).await.expect("cleanup");
}

#[tokio::test]
async fn dish_for_missing_menu_is_not_inserted() {
    let Some(store) = connect().await else { return };
    let menu = insert_menu(&store, "Gone").await;
    store.delete_menu(menu).await.expect("delete menu");

    let inserted = store.insert_dish(menu, new_dish("Orphan")).await.expect("insert dish");
    assert!(inserted.is_none());
    assert!(store.list_dishes(menu).await.expect("list dishes").is_none());
}

#[tokio::test]
async fn duplicate_menu_name_is_a_unique_violation() {
    let Some(store) = connect().await else { return };
    let name = unique_name("Taken");
    let first = store
        .insert_menu(NewMenu {
            name: name.clone(),
            description: String::new(),
        })
        .await
        .expect("insert menu");

    let err = store
        .insert_menu(NewMenu {
            name: name.clone(),
            description: "again".to_string(),
        })
        .await
        .expect_err("duplicate name");
    assert!(matches!(err, StoreError::UniqueViolation("name")), "{:?}", err);

    assert!(store.menu_name_taken(&name, None).await.expect("lookup"));
    assert!(!store.menu_name_taken(&name, Some(first.id)).await.expect("lookup"));

    // Renaming another menu onto the name is rejected too
    let other = insert_menu(&store, "Other").await;
    let err = store
        .update_menu(
            other,
            MenuChanges {
                name: Some(name),
                description: None,
            },
        )
        .await
        .expect_err("rename onto taken name");
    assert!(matches!(err, StoreError::UniqueViolation("name")), "{:?}", err);

    store.delete_menu(first.id).await.expect("cleanup");
    store.delete_menu(other).await.expect("cleanup");
}

#[tokio::test]
async fn partial_updates_leave_other_columns_alone() {
    let Some(store) = connect().await else { return };
    let menu = insert_menu(&store, "Partial").await;
    let dish = store
        .insert_dish(menu, new_dish("Stew"))
        .await
        .expect("insert dish")
        .expect("menu exists");

    let updated = store
        .update_dish(
            dish.id,
            DishChanges {
                price: Some("9.99".parse().expect("price")),
                ..DishChanges::default()
            },
        )
        .await
        .expect("update dish")
        .expect("dish exists");
    assert_eq!(updated.price.to_string(), "9.99");
    assert_eq!(updated.name, "Stew");
    assert_eq!(updated.description, "TestDishDescription1");
    assert_eq!(updated.preparation_time, dish.preparation_time);
    assert!(updated.is_vegetarian);

    let renamed = store
        .update_menu(
            menu,
            MenuChanges {
                name: None,
                description: Some("Evening".to_string()),
            },
        )
        .await
        .expect("update menu")
        .expect("menu exists");
    assert_eq!(renamed.description, "Evening");
    assert!(renamed.name.starts_with("Partial-"));

    assert!(store
        .update_dish(i64::MAX, DishChanges::default())
        .await
        .expect("update missing dish")
        .is_none());

    store.delete_menu(menu).await.expect("cleanup");
}

#[tokio::test]
async fn image_swap_returns_previous_reference() {
    let Some(store) = connect().await else { return };
    let menu = insert_menu(&store, "Images").await;
    let dish = store
        .insert_dish(menu, new_dish("Cake"))
        .await
        .expect("insert dish")
        .expect("menu exists");

    let swap = store
        .set_dish_image(dish.id, Some("dishes/one.png".to_string()))
        .await
        .expect("set image")
        .expect("dish exists");
    assert_eq!(swap.previous, None);
    assert_eq!(swap.dish.image.as_deref(), Some("dishes/one.png"));

    let swap = store
        .set_dish_image(dish.id, None)
        .await
        .expect("clear image")
        .expect("dish exists");
    assert_eq!(swap.previous.as_deref(), Some("dishes/one.png"));
    assert_eq!(swap.dish.image, None);

    assert!(store.set_dish_image(i64::MAX, None).await.expect("missing dish").is_none());

    store.delete_menu(menu).await.expect("cleanup");
}

#[tokio::test]
async fn deleting_a_menu_cascades_to_its_dishes() {
    let Some(store) = connect().await else { return };
    let menu = insert_menu(&store, "Cascade").await;
    let kept_menu = insert_menu(&store, "Kept").await;

    let pictured = store
        .insert_dish(menu, new_dish("Salad"))
        .await
        .expect("insert dish")
        .expect("menu exists");
    let plain = store
        .insert_dish(menu, new_dish("Pie"))
        .await
        .expect("insert dish")
        .expect("menu exists");
    let kept = store
        .insert_dish(kept_menu, new_dish("Bread"))
        .await
        .expect("insert dish")
        .expect("menu exists");
    store
        .set_dish_image(pictured.id, Some("dishes/salad.png".to_string()))
        .await
        .expect("set image");

    let released = store
        .delete_menu(menu)
        .await
        .expect("delete menu")
        .expect("menu existed");
    assert_eq!(released, vec!["dishes/salad.png".to_string()]);

    assert!(store.get_menu(menu).await.expect("get menu").is_none());
    for id in [pictured.id, plain.id] {
        assert!(store.get_dish(id).await.expect("get dish").is_none());
    }
    assert!(store.get_dish(kept.id).await.expect("get dish").is_some());

    assert!(store.delete_menu(menu).await.expect("delete again").is_none());

    store.delete_menu(kept_menu).await.expect("cleanup");
}
