mod common;

use axum::http::{header, Method, StatusCode};
use serde_json::json;

use common::{dish_payload, id_of, png_bytes, TestApp};

async fn dish_on_menu(app: &TestApp) -> (i64, i64) {
    let menu = id_of(&app.create_menu("TestMenu1").await);
    let dish = id_of(&app.create_dish(menu, "TestDishName1").await);
    (menu, dish)
}

#[tokio::test]
async fn dish_reads_require_authentication() {
    let app = TestApp::new();
    let (menu, dish) = dish_on_menu(&app).await;
    let uri = format!("/dishes/{}", dish);

    let resp = app.get(&uri).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let resp = app.get_authed(&uri).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["menu"], menu);
    assert_eq!(resp.data()["price"], "20.55");

    assert_eq!(app.get_authed("/dishes/999").await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get_authed("/dishes/abc").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn put_replaces_and_patch_merges() {
    let app = TestApp::new();
    let (_, dish) = dish_on_menu(&app).await;
    let uri = format!("/dishes/{}", dish);

    let resp = app.patch(&uri, json!({ "name": "NewTestDishName1" })).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["name"], "NewTestDishName1");
    assert_eq!(resp.data()["price"], "20.55");
    assert_eq!(resp.data()["is_vegetarian"], true);

    let resp = app
        .put(
            &uri,
            json!({ "name": "Stew", "price": "9.99", "preparation_time": "01:30:00" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["name"], "Stew");
    assert_eq!(resp.data()["description"], "TestDishDescription1");
    assert_eq!(resp.data()["price"], "9.99");
    assert_eq!(resp.data()["preparation_time"], "01:30:00");
    assert_eq!(resp.data()["is_vegetarian"], true);

    let resp = app
        .put(
            &uri,
            json!({
                "name": "Stew",
                "description": "",
                "price": "9.99",
                "preparation_time": "01:30:00",
                "is_vegetarian": false
            }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["description"], "");
    assert_eq!(resp.data()["is_vegetarian"], false);

    let resp = app.put(&uri, json!({ "name": "Stew" })).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.field_error("price").is_some());
}

#[tokio::test]
async fn rejected_updates_leave_the_dish_alone() {
    let app = TestApp::new();
    let (_, dish) = dish_on_menu(&app).await;
    let uri = format!("/dishes/{}", dish);

    let resp = app.patch(&uri, json!({ "price": "-1.00" })).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    let resp = app.patch(&uri, json!({ "preparation_time": "later" })).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.field_error("preparation_time").is_some());

    let resp = app.get_authed(&uri).await;
    assert_eq!(resp.data()["price"], "20.55");
    assert_eq!(resp.data()["preparation_time"], "00:00:30");

    // Missing dish wins over a bad body
    let resp = app.patch("/dishes/999", json!({ "price": "-1.00" })).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_only_that_dish() {
    let app = TestApp::new();
    let (menu, dish) = dish_on_menu(&app).await;
    let other = id_of(&app.create_dish(menu, "Other").await);

    let resp = app.delete(&format!("/dishes/{}", dish), true).await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);

    assert_eq!(
        app.get_authed(&format!("/dishes/{}", dish)).await.status,
        StatusCode::NOT_FOUND
    );
    let listed = app.get(&format!("/menus/{}/dishes", menu)).await;
    assert_eq!(listed.data().as_array().map(Vec::len), Some(1));
    assert_eq!(id_of(&listed.data()[0]), other);

    assert_eq!(
        app.delete(&format!("/dishes/{}", dish), true).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn anonymous_dish_writes_are_rejected() {
    let app = TestApp::new();
    let (_, dish) = dish_on_menu(&app).await;
    let uri = format!("/dishes/{}", dish);

    let resp = app.json(Method::PUT, &uri, dish_payload(), false).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    let resp = app.json(Method::PATCH, &uri, json!({ "price": "1.00" }), false).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    let resp = app.delete(&uri, false).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    let resp = app
        .upload(&format!("{}/image", uri), "dish.png", "image/png", &png_bytes(), false)
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    let resp = app.delete(&format!("{}/image", uri), false).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let resp = app.get_authed(&uri).await;
    assert_eq!(resp.data()["price"], "20.55");
    assert!(resp.data()["image"].is_null());
}

#[tokio::test]
async fn uploaded_image_resolves_and_can_be_removed() {
    let app = TestApp::new();
    let (_, dish) = dish_on_menu(&app).await;
    let image_uri = format!("/dishes/{}/image", dish);

    let resp = app
        .upload(&image_uri, "dish.png", "image/png", &png_bytes(), true)
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let url = resp.data()["image"].as_str().expect("image url").to_string();
    assert!(url.starts_with("/media/dishes/"), "{}", url);
    assert!(url.ends_with(".png"), "{}", url);

    let served = app.get(&url).await;
    assert_eq!(served.status, StatusCode::OK);
    assert_eq!(
        served.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("image/png")
    );
    assert_eq!(served.bytes, png_bytes());

    let resp = app.delete(&image_uri, true).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.data()["image"].is_null());

    assert_eq!(app.get(&url).await.status, StatusCode::NOT_FOUND);
    let blob = app.media_root.join(url.trim_start_matches("/media/"));
    assert!(!blob.exists());
}

#[tokio::test]
async fn replacing_an_image_releases_the_old_one() {
    let app = TestApp::new();
    let (_, dish) = dish_on_menu(&app).await;
    let image_uri = format!("/dishes/{}/image", dish);

    let first = app
        .upload(&image_uri, "one.png", "image/png", &png_bytes(), true)
        .await;
    let first_url = first.data()["image"].as_str().expect("url").to_string();

    let second = app
        .upload(&image_uri, "two.jpg", "image/jpeg", b"jpeg-bytes", true)
        .await;
    assert_eq!(second.status, StatusCode::OK);
    let second_url = second.data()["image"].as_str().expect("url").to_string();
    assert_ne!(first_url, second_url);

    assert_eq!(app.get(&first_url).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get(&second_url).await.status, StatusCode::OK);
}

#[tokio::test]
async fn deleting_owners_releases_images() {
    let app = TestApp::new();
    let (menu, dish) = dish_on_menu(&app).await;
    let other = id_of(&app.create_dish(menu, "Other").await);

    let resp = app
        .upload(&format!("/dishes/{}/image", dish), "a.png", "image/png", &png_bytes(), true)
        .await;
    let dish_url = resp.data()["image"].as_str().expect("url").to_string();
    let resp = app
        .upload(&format!("/dishes/{}/image", other), "b.gif", "image/gif", b"GIF89a", true)
        .await;
    let other_url = resp.data()["image"].as_str().expect("url").to_string();

    app.delete(&format!("/dishes/{}", dish), true).await;
    assert_eq!(app.get(&dish_url).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get(&other_url).await.status, StatusCode::OK);

    app.delete(&format!("/menus/{}", menu), true).await;
    assert_eq!(app.get(&other_url).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bad_uploads_are_validation_errors() {
    let app = TestApp::with_image_limit(16);
    let (_, dish) = dish_on_menu(&app).await;
    let image_uri = format!("/dishes/{}/image", dish);

    let resp = app
        .upload(&image_uri, "notes.txt", "text/plain", b"hello", true)
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.field_error("image").is_some());

    let resp = app.upload(&image_uri, "empty.png", "image/png", b"", true).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.field_error("image"), Some("The submitted file is empty."));

    let resp = app
        .upload(&image_uri, "big.png", "image/png", &[0u8; 17], true)
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.field_error("image").is_some());

    let resp = app
        .upload_field(&image_uri, "picture", "dish.png", "image/png", &png_bytes(), true)
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.field_error("image"), Some("No file was submitted."));

    let resp = app.get_authed(&format!("/dishes/{}", dish)).await;
    assert!(resp.data()["image"].is_null());
}

#[tokio::test]
async fn upload_to_missing_dish_is_not_found() {
    let app = TestApp::new();

    let resp = app
        .upload("/dishes/999/image", "dish.png", "image/png", &png_bytes(), true)
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(app.delete("/dishes/999/image", true).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn media_paths_cannot_escape_the_root() {
    let app = TestApp::new();

    assert_eq!(app.get("/media/dishes/missing.png").await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/media/../Cargo.toml").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_multipart_upload_uses_the_error_body() {
    let app = TestApp::new();
    let (_, dish) = dish_on_menu(&app).await;

    let resp = app
        .post(&format!("/dishes/{}/image", dish), json!({ "image": "dish.png" }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json["error"], true);
    assert_eq!(resp.json["code"], "BAD_REQUEST");
    assert!(resp.json["message"].is_string());

    let resp = app.get_authed(&format!("/dishes/{}", dish)).await;
    assert!(resp.data()["image"].is_null());
}
