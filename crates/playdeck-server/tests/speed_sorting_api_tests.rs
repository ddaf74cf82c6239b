//! Speed-sorting API integration tests
//!
//! Coverage includes:
//! - Create: success, duplicate names, dataset errors, file items
//! - Update: partial updates, authorization, dataset co-requirement
//! - Play: publication gate and config resolution
//! - Error envelopes and status codes

use axum::http::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

mod common;
use common::{Caller, InMemoryGameRepository, MultipartBody, TestApp};

const BASE: &str = "/api/v1/games/speed-sorting";
const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

// ============================================================================
// Helper Functions
// ============================================================================

fn categories() -> Value {
    json!([{ "name": "Fruit" }, { "name": " Vegetable " }])
}

fn items() -> Value {
    json!([
        { "value": "Green apple", "category_index": 0 },
        { "value": "Sweet carrot", "category_index": 1 }
    ])
}

fn create_form(name: &str, categories: &Value, items: &Value) -> MultipartBody {
    MultipartBody::new()
        .text("name", name)
        .text("description", "Sort fast")
        .file("thumbnail_image", "cover.png", "image/png", PNG)
        .text("categories", &categories.to_string())
        .text("items", &items.to_string())
}

async fn create_game(app: &TestApp, caller: Caller, name: &str, publish: bool) -> Uuid {
    let form = create_form(name, &categories(), &items())
        .text("is_publish_immediately", if publish { "true" } else { "false" });
    let (status, body) = app.multipart("POST", BASE, Some(caller), form).await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
    body["data"]["id"].as_str().unwrap().parse().unwrap()
}

fn assert_error(body: &Value, code: &str) {
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!(code), "body: {}", body);
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_stores_game_and_dataset() {
    let app = TestApp::new();
    let caller = Caller::user();

    let id = create_game(&app, caller, "  Fruits and veg  ", true).await;

    let record = app.games.get(id).unwrap();
    assert_eq!(record.name, "Fruits and veg");
    assert_eq!(record.creator_id, caller.id);
    assert_eq!(record.description.as_deref(), Some("Sort fast"));
    assert!(record.is_published);
    assert_eq!(
        record.thumbnail_path,
        format!("game/speed-sorting/{}/thumbnail.png", id)
    );
    assert_eq!(
        record.game_json,
        json!({
            "categories": [
                { "id": "cat-0", "name": "Fruit" },
                { "id": "cat-1", "name": "Vegetable" }
            ],
            "items": [
                { "id": "item-0", "text": "Green apple", "category_id": "cat-0" },
                { "id": "item-1", "text": "Sweet carrot", "category_id": "cat-1" }
            ]
        })
    );

    let uploads = app.store.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].1.bytes, PNG);
}

#[tokio::test]
async fn test_create_defaults_to_unpublished() {
    let app = TestApp::new();
    let form = create_form("Quiet", &categories(), &items());
    let (status, body) = app
        .multipart("POST", BASE, Some(Caller::user()), form)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));

    let id: Uuid = body["data"]["id"].as_str().unwrap().parse().unwrap();
    assert!(!app.games.get(id).unwrap().is_published);
}

#[tokio::test]
async fn test_create_uploads_inline_file_items() {
    let app = TestApp::new();
    let items = json!([
        { "value": "data:image/png;base64,aGVsbG8=", "category_index": 1 },
        { "value": "test", "category_index": 0, "type": "text" }
    ]);
    let form = create_form("Pictures", &categories(), &items);
    let (status, body) = app
        .multipart("POST", BASE, Some(Caller::user()), form)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let id: Uuid = body["data"]["id"].as_str().unwrap().parse().unwrap();
    let record = app.games.get(id).unwrap();
    let expected_path = format!("game/speed-sorting/{}/items/item-0.png", id);
    assert_eq!(record.game_json["items"][0]["text"], json!(expected_path));
    assert_eq!(record.game_json["items"][0]["category_id"], json!("cat-1"));
    assert_eq!(record.game_json["items"][1]["text"], json!("test"));

    let uploads = app.store.uploads();
    assert_eq!(uploads.len(), 2);
    assert_eq!(uploads[1].0, expected_path);
    assert_eq!(uploads[1].1.bytes, b"hello");
    assert_eq!(uploads[1].1.media_type, "image/png");
}

#[tokio::test]
async fn test_create_never_stores_base64_as_text() {
    let app = TestApp::new();
    let items = json!([
        { "value": "hi==", "category_index": 0 },
        { "value": "data:image/png;name=a.png;base64,aGVsbG8=", "category_index": 1 }
    ]);
    let form = create_form("Loose padding", &categories(), &items);
    let (status, body) = app
        .multipart("POST", BASE, Some(Caller::user()), form)
        .await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", body);

    let id: Uuid = body["data"]["id"].as_str().unwrap().parse().unwrap();
    let record = app.games.get(id).unwrap();
    assert_eq!(
        record.game_json["items"][0]["text"],
        json!(format!("game/speed-sorting/{}/items/item-0.bin", id))
    );
    assert_eq!(
        record.game_json["items"][1]["text"],
        json!(format!("game/speed-sorting/{}/items/item-1.png", id))
    );
    assert_eq!(app.store.upload_count(), 3);
}

#[tokio::test]
async fn test_create_rejects_duplicate_name() {
    let app = TestApp::new();
    create_game(&app, Caller::user(), "Fruits", false).await;

    let form = create_form("Fruits", &categories(), &items());
    let (status, body) = app
        .multipart("POST", BASE, Some(Caller::user()), form)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], json!("Game name already used"));
    assert_eq!(app.games.game_count(), 1);
}

#[tokio::test]
async fn test_create_rejects_bad_category_index_before_uploading() {
    let app = TestApp::new();
    let items = json!([
        { "value": "Green apple", "category_index": 0 },
        { "value": "Lost", "category_index": 5 }
    ]);
    let form = create_form("Broken", &categories(), &items);
    let (status, body) = app
        .multipart("POST", BASE, Some(Caller::user()), form)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, "VALIDATION_ERROR");
    assert_eq!(
        body["error"]["message"],
        json!("invalid category_index at item 2")
    );
    assert_eq!(app.store.upload_count(), 0);
    assert_eq!(app.games.game_count(), 0);
}

#[tokio::test]
async fn test_create_rejects_too_few_categories() {
    let app = TestApp::new();
    let form = create_form("Lonely", &json!([{ "name": "Only" }]), &items());
    let (status, body) = app
        .multipart("POST", BASE, Some(Caller::user()), form)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, "VALIDATION_ERROR");
    assert_eq!(app.store.upload_count(), 0);
}

#[tokio::test]
async fn test_create_requires_thumbnail() {
    let app = TestApp::new();
    let form = MultipartBody::new()
        .text("name", "No cover")
        .text("categories", &categories().to_string())
        .text("items", &items().to_string());
    let (status, body) = app
        .multipart("POST", BASE, Some(Caller::user()), form)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], json!("thumbnail_image is required"));
}

#[tokio::test]
async fn test_create_rejects_file_tag_without_payload() {
    let app = TestApp::new();
    let items = json!([{ "value": "not an image", "category_index": 0, "type": "file" }]);
    let form = create_form("Tagged", &categories(), &items);
    let (status, body) = app
        .multipart("POST", BASE, Some(Caller::user()), form)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, "VALIDATION_ERROR");
    assert_eq!(app.games.game_count(), 0);
}

#[tokio::test]
async fn test_create_requires_identity() {
    let app = TestApp::new();
    let form = create_form("Anonymous", &categories(), &items());
    let (status, body) = app.multipart("POST", BASE, None, form).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, "UNAUTHORIZED");
    assert_eq!(app.games.game_count(), 0);
}

#[tokio::test]
async fn test_create_reports_storage_failure() {
    let (router, games) = TestApp::with_failing_storage();
    let request = common::multipart_request(
        "POST",
        BASE,
        Some(Caller::user()),
        create_form("Unlucky", &categories(), &items()),
    );
    let (status, body) = common::send(&router, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_error(&body, "STORAGE_ERROR");
    assert_eq!(games.game_count(), 0);
}

#[tokio::test]
async fn test_create_without_template_row_is_internal_error() {
    let app = TestApp::with_repository(InMemoryGameRepository::without_templates());
    let form = create_form("Orphan", &categories(), &items());
    let (status, body) = app
        .multipart("POST", BASE, Some(Caller::user()), form)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_error(&body, "INTERNAL_ERROR");
    assert_eq!(app.store.upload_count(), 0);
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_update_publish_flag_keeps_dataset() {
    let app = TestApp::new();
    let owner = Caller::user();
    let id = create_game(&app, owner, "Fruits", false).await;
    let before = app.games.get(id).unwrap();

    let form = MultipartBody::new().text("is_publish", "true");
    let (status, body) = app
        .multipart("PATCH", &format!("{}/{}", BASE, id), Some(owner), form)
        .await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["data"]["id"], json!(id.to_string()));
    assert_eq!(body["data"]["game_json"], before.game_json);

    let after = app.games.get(id).unwrap();
    assert!(after.is_published);
    assert_eq!(after.game_json, before.game_json);
    assert_eq!(after.name, before.name);
    assert_eq!(app.store.upload_count(), 1);
}

#[tokio::test]
async fn test_update_show_score_alone_patches_flag() {
    let app = TestApp::new();
    let owner = Caller::user();
    let id = create_game(&app, owner, "Fruits", false).await;
    let before = app.games.get(id).unwrap();

    let form = MultipartBody::new().text("show_score_at_end", "true");
    let (status, _) = app
        .multipart("PATCH", &format!("{}/{}", BASE, id), Some(owner), form)
        .await;
    assert_eq!(status, StatusCode::OK);

    let after = app.games.get(id).unwrap();
    assert_eq!(after.game_json["show_score_at_end"], json!(true));
    assert_eq!(after.game_json["categories"], before.game_json["categories"]);
    assert_eq!(after.game_json["items"], before.game_json["items"]);
}

#[tokio::test]
async fn test_update_replaces_dataset() {
    let app = TestApp::new();
    let owner = Caller::user();
    let id = create_game(&app, owner, "Fruits", false).await;

    let form = MultipartBody::new()
        .text(
            "categories",
            &json!([{ "name": "Red" }, { "name": "Blue" }, { "name": "Green" }]).to_string(),
        )
        .text(
            "items",
            &json!([{ "value": "Sky", "category_index": 1 }]).to_string(),
        );
    let (status, body) = app
        .multipart("PATCH", &format!("{}/{}", BASE, id), Some(owner), form)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["game_json"]["categories"][2]["id"], json!("cat-2"));
    assert_eq!(
        body["data"]["game_json"]["items"],
        json!([{ "id": "item-0", "text": "Sky", "category_id": "cat-1" }])
    );
}

#[tokio::test]
async fn test_update_by_other_user_is_forbidden() {
    let app = TestApp::new();
    let id = create_game(&app, Caller::user(), "Fruits", false).await;
    let before = app.games.get(id).unwrap();
    let writes = app.games.write_count();

    let form = MultipartBody::new()
        .text("name", "Stolen")
        .file("thumbnail_image", "evil.png", "image/png", PNG);
    let (status, body) = app
        .multipart("PATCH", &format!("{}/{}", BASE, id), Some(Caller::user()), form)
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error(&body, "FORBIDDEN");
    assert_eq!(app.games.get(id).unwrap(), before);
    assert_eq!(app.games.write_count(), writes);
    assert_eq!(app.store.upload_count(), 1);
}

#[tokio::test]
async fn test_update_by_super_admin_is_allowed() {
    let app = TestApp::new();
    let id = create_game(&app, Caller::user(), "Fruits", false).await;

    let form = MultipartBody::new().text("name", "Moderated");
    let (status, _) = app
        .multipart("PATCH", &format!("{}/{}", BASE, id), Some(Caller::admin()), form)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.games.get(id).unwrap().name, "Moderated");
}

#[tokio::test]
async fn test_update_requires_categories_and_items_together() {
    let app = TestApp::new();
    let owner = Caller::user();
    let id = create_game(&app, owner, "Fruits", false).await;

    let form = MultipartBody::new().text("categories", &categories().to_string());
    let (status, body) = app
        .multipart("PATCH", &format!("{}/{}", BASE, id), Some(owner), form)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, "VALIDATION_ERROR");
    assert_eq!(
        body["error"]["message"],
        json!("categories and items must both be provided when updating dataset")
    );
}

#[tokio::test]
async fn test_update_rejects_empty_form() {
    let app = TestApp::new();
    let owner = Caller::user();
    let id = create_game(&app, owner, "Fruits", false).await;

    let (status, body) = app
        .multipart("PATCH", &format!("{}/{}", BASE, id), Some(owner), MultipartBody::new())
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], json!("No fields to update"));
}

#[tokio::test]
async fn test_update_rename_to_taken_name() {
    let app = TestApp::new();
    let owner = Caller::user();
    create_game(&app, owner, "Fruits", false).await;
    let id = create_game(&app, owner, "Veg", false).await;

    let form = MultipartBody::new().text("name", "Fruits");
    let (status, body) = app
        .multipart("PATCH", &format!("{}/{}", BASE, id), Some(owner), form)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], json!("Game name already used"));

    // Keeping the current name is not a conflict
    let form = MultipartBody::new().text("name", "Veg");
    let (status, _) = app
        .multipart("PATCH", &format!("{}/{}", BASE, id), Some(owner), form)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_unknown_game() {
    let app = TestApp::new();
    let form = MultipartBody::new().text("is_publish", "true");
    let (status, body) = app
        .multipart(
            "PATCH",
            &format!("{}/{}", BASE, Uuid::new_v4()),
            Some(Caller::user()),
            form,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, "NOT_FOUND");
}

#[tokio::test]
async fn test_update_other_template_is_rejected() {
    let app = TestApp::new();
    let owner = Caller::user();
    let id = app
        .games
        .insert_game("quiz", owner.id, "Capitals", json!({ "questions": [] }));

    let form = MultipartBody::new().text("is_publish", "true");
    let (status, body) = app
        .multipart("PATCH", &format!("{}/{}", BASE, id), Some(owner), form)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, "WRONG_TEMPLATE");
    assert!(!app.games.get(id).unwrap().is_published);
}

// ============================================================================
// Play
// ============================================================================

#[tokio::test]
async fn test_play_unpublished_game_is_forbidden() {
    let app = TestApp::new();
    let id = create_game(&app, Caller::user(), "Fruits", false).await;

    let (status, body) = app
        .post_json(
            &format!("{}/{}/play", BASE, id),
            json!({ "timer_mode": "NONE", "speed": 300, "lives": 3 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], json!("Game is not published"));
}

#[tokio::test]
async fn test_play_count_down_defaults_duration() {
    let app = TestApp::new();
    let id = create_game(&app, Caller::user(), "Fruits", true).await;

    let (status, body) = app
        .post_json(
            &format!("{}/{}/play", BASE, id),
            json!({ "timer_mode": "COUNT_DOWN", "speed": 400, "lives": 2 }),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    let data = &body["data"];
    assert_eq!(data["id"], json!(id.to_string()));
    assert_eq!(data["name"], json!("Fruits"));
    assert_eq!(
        data["config"],
        json!({ "timer_mode": "COUNT_DOWN", "timer_duration": 60, "speed": 400, "lives": 2 })
    );
    assert_eq!(data["categories"].as_array().unwrap().len(), 2);
    assert_eq!(data["items"][1]["category_id"], json!("cat-1"));
}

#[tokio::test]
async fn test_play_rejects_duration_without_count_down() {
    let app = TestApp::new();
    let id = create_game(&app, Caller::user(), "Fruits", true).await;

    let (status, body) = app
        .post_json(
            &format!("{}/{}/play", BASE, id),
            json!({ "timer_mode": "NONE", "timer_duration": 30, "speed": 400, "lives": 2 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"]["field"], json!("timer_duration"));
}

#[tokio::test]
async fn test_play_rejects_out_of_range_speed() {
    let app = TestApp::new();
    let id = create_game(&app, Caller::user(), "Fruits", true).await;

    let (status, body) = app
        .post_json(
            &format!("{}/{}/play", BASE, id),
            json!({ "timer_mode": "COUNT_UP", "speed": 50, "lives": 2 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["field"], json!("speed"));
}

#[tokio::test]
async fn test_play_unknown_game() {
    let app = TestApp::new();
    let (status, body) = app
        .post_json(
            &format!("{}/{}/play", BASE, Uuid::new_v4()),
            json!({ "timer_mode": "NONE", "speed": 300, "lives": 3 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, "NOT_FOUND");
}

#[tokio::test]
async fn test_play_malformed_body() {
    let app = TestApp::new();
    let id = create_game(&app, Caller::user(), "Fruits", true).await;

    let (status, body) = app
        .post_json(
            &format!("{}/{}/play", BASE, id),
            json!({ "timer_mode": "SOMETIMES", "speed": 300, "lives": 3 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, "VALIDATION_ERROR");
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
}
