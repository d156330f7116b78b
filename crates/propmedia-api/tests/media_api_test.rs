//! End-to-end API tests over the in-memory repository: upload validation,
//! serving, primary and ordering flows, and the owner cascade.

use std::io::Cursor;
use std::sync::Arc;

use axum_test::TestServer;
use image::{ImageFormat, Rgba, RgbaImage};
use propmedia_api::{build_router, AppState};
use propmedia_core::{Config, RepositoryBackend, ThumbnailConfig, UploadPolicy};
use propmedia_db::MemoryAssetRepository;
use serde_json::Value;
use uuid::Uuid;

const MAX_IMAGE_BYTES: usize = 256 * 1024;

fn test_config() -> Config {
    Config {
        server_port: 0,
        cors_origins: vec!["*".to_string()],
        environment: "test".to_string(),
        backend: RepositoryBackend::Memory,
        database_url: None,
        db_max_connections: 1,
        image_policy: UploadPolicy {
            max_size_bytes: MAX_IMAGE_BYTES,
            allowed_extensions: vec!["jpg".into(), "jpeg".into(), "png".into()],
            allowed_content_types: vec!["image/jpeg".into(), "image/png".into()],
        },
        document_policy: UploadPolicy {
            max_size_bytes: 1024 * 1024,
            allowed_extensions: vec!["pdf".into()],
            allowed_content_types: vec!["application/pdf".into()],
        },
        thumbnail: ThumbnailConfig {
            width: 32,
            height: 32,
            preserve_aspect: true,
            quality: 85,
        },
    }
}

fn test_server() -> TestServer {
    let state = Arc::new(AppState::new(
        test_config(),
        Arc::new(MemoryAssetRepository::new()),
    ));
    TestServer::new(build_router(state)).unwrap()
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([10, 120, 200, 255]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    buffer
}

/// Hand-rolled multipart body: one file part plus text fields.
fn file_form(
    file_name: &str,
    content_type: &str,
    data: &[u8],
    extra: &[(&str, &str)],
) -> (String, Vec<u8>) {
    let boundary = "propmedia-test-boundary";
    let mut body = Vec::new();
    for (name, value) in extra {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (
        format!("multipart/form-data; boundary={boundary}"),
        body,
    )
}

async fn upload_image(
    server: &TestServer,
    property_id: Uuid,
    file_name: &str,
    extra: &[(&str, &str)],
) -> Value {
    let (content_type, body) = file_form(file_name, "image/png", &png_bytes(64, 48), extra);
    let response = server
        .post(&format!("/api/v0/properties/{}/media", property_id))
        .content_type(&content_type)
        .bytes(body.into())
        .await;
    assert_eq!(response.status_code(), 201, "{}", response.text());
    response.json::<Value>()
}

#[tokio::test]
async fn health_check_responds() {
    let server = test_server();
    let response = server.get("/health").await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn upload_creates_primary_with_order_zero() {
    let server = test_server();
    let property = Uuid::new_v4();

    let a = upload_image(&server, property, "front.png", &[("category", "exterior")]).await;
    assert_eq!(a["sort_order"], 0);
    assert_eq!(a["is_primary"], true);
    assert_eq!(a["category"], "exterior");
    assert_eq!(a["content_type"], "image/png");
    assert!(a["thumbnail_url"].as_str().is_some());
    assert_eq!(a["width"], 64);
    assert_eq!(a["height"], 48);

    let b = upload_image(&server, property, "back.png", &[]).await;
    assert_eq!(b["sort_order"], 1);
    assert_eq!(b["is_primary"], false);
    assert_eq!(b["category"], "general");

    let list = server
        .get(&format!("/api/v0/properties/{}/media", property))
        .await
        .json::<Value>();
    let items = list.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["file_name"], "front.png");
    assert_eq!(items[1]["file_name"], "back.png");
}

#[tokio::test]
async fn oversize_upload_rejected_without_record() {
    let server = test_server();
    let property = Uuid::new_v4();

    let oversize = vec![0u8; MAX_IMAGE_BYTES + 1];
    let (content_type, body) = file_form("big.png", "image/png", &oversize, &[]);
    let response = server
        .post(&format!("/api/v0/properties/{}/media", property))
        .content_type(&content_type)
        .bytes(body.into())
        .await;
    assert_eq!(response.status_code(), 413);
    assert_eq!(response.json::<Value>()["code"], "PAYLOAD_TOO_LARGE");

    let list = server
        .get(&format!("/api/v0/properties/{}/media", property))
        .await
        .json::<Value>();
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn extension_mismatch_rejected_without_record() {
    let server = test_server();
    let property = Uuid::new_v4();

    // Declared JPEG, named .png: cross-check must reject.
    let (content_type, body) = file_form("photo.png", "image/jpeg", &png_bytes(8, 8), &[]);
    let response = server
        .post(&format!("/api/v0/properties/{}/media", property))
        .content_type(&content_type)
        .bytes(body.into())
        .await;
    assert_eq!(response.status_code(), 400);

    let list = server
        .get(&format!("/api/v0/properties/{}/media", property))
        .await
        .json::<Value>();
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn traversal_file_name_rejected() {
    let server = test_server();
    let property = Uuid::new_v4();

    let (content_type, body) = file_form("../../evil.png", "image/png", &png_bytes(8, 8), &[]);
    let response = server
        .post(&format!("/api/v0/properties/{}/media", property))
        .content_type(&content_type)
        .bytes(body.into())
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn corrupt_image_stored_without_thumbnail() {
    let server = test_server();
    let property = Uuid::new_v4();

    // Valid extension and content type, undecodable payload.
    let junk = b"not an actual jpeg".to_vec();
    let (content_type, body) = file_form("broken.jpg", "image/jpeg", &junk, &[]);
    let response = server
        .post(&format!("/api/v0/properties/{}/media", property))
        .content_type(&content_type)
        .bytes(body.into())
        .await;
    assert_eq!(response.status_code(), 201);
    let created = response.json::<Value>();
    assert!(created["thumbnail_url"].is_null());
    assert!(created["width"].is_null());

    // Thumbnail endpoint falls back to the original bytes.
    let id = created["id"].as_str().unwrap();
    let thumb = server.get(&format!("/api/v0/media/{}/thumbnail", id)).await;
    assert_eq!(thumb.status_code(), 200);
    assert_eq!(thumb.as_bytes().as_ref(), junk.as_slice());
}

#[tokio::test]
async fn download_round_trips_original_bytes() {
    let server = test_server();
    let property = Uuid::new_v4();
    let original = png_bytes(64, 48);

    let (content_type, body) = file_form("front.png", "image/png", &original, &[]);
    let created = server
        .post(&format!("/api/v0/properties/{}/media", property))
        .content_type(&content_type)
        .bytes(body.into())
        .await
        .json::<Value>();
    let id = created["id"].as_str().unwrap();

    let inline = server.get(&format!("/api/v0/media/{}/file", id)).await;
    assert_eq!(inline.status_code(), 200);
    assert_eq!(inline.as_bytes().as_ref(), original.as_slice());
    assert_eq!(
        inline.headers().get("content-type").unwrap(),
        "image/png"
    );
    assert!(inline
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("inline"));

    let attachment = server
        .get(&format!("/api/v0/media/{}/file?download=1", id))
        .await;
    assert!(attachment
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("attachment"));
}

#[tokio::test]
async fn thumbnail_is_served_as_jpeg() {
    let server = test_server();
    let property = Uuid::new_v4();

    let created = upload_image(&server, property, "front.png", &[]).await;
    let id = created["id"].as_str().unwrap();

    let thumb = server.get(&format!("/api/v0/media/{}/thumbnail", id)).await;
    assert_eq!(thumb.status_code(), 200);
    assert_eq!(
        thumb.headers().get("content-type").unwrap(),
        "image/jpeg"
    );
    // JPEG SOI marker.
    assert_eq!(&thumb.as_bytes()[..2], &[0xFF, 0xD8]);
}

#[tokio::test]
async fn set_primary_keeps_exactly_one_flagged() {
    let server = test_server();
    let property = Uuid::new_v4();

    let _a = upload_image(&server, property, "a.png", &[]).await;
    let b = upload_image(&server, property, "b.png", &[]).await;
    let b_id = b["id"].as_str().unwrap();

    let updated = server
        .put(&format!("/api/v0/media/{}/primary", b_id))
        .await;
    assert_eq!(updated.status_code(), 200);
    assert_eq!(updated.json::<Value>()["is_primary"], true);

    let list = server
        .get(&format!("/api/v0/properties/{}/media", property))
        .await
        .json::<Value>();
    let primaries: Vec<&Value> = list
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["is_primary"] == true)
        .collect();
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0]["id"].as_str().unwrap(), b_id);
}

#[tokio::test]
async fn delete_renumbers_and_skips_auto_promotion() {
    let server = test_server();
    let property = Uuid::new_v4();

    let a = upload_image(&server, property, "a.png", &[]).await;
    let b = upload_image(&server, property, "b.png", &[]).await;
    let c = upload_image(&server, property, "c.png", &[]).await;

    let deleted = server
        .delete(&format!("/api/v0/media/{}", b["id"].as_str().unwrap()))
        .await;
    assert_eq!(deleted.status_code(), 204);

    let list = server
        .get(&format!("/api/v0/properties/{}/media", property))
        .await
        .json::<Value>();
    let items = list.as_array().unwrap().clone();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], a["id"]);
    assert_eq!(items[0]["sort_order"], 0);
    assert_eq!(items[1]["id"], c["id"]);
    assert_eq!(items[1]["sort_order"], 1);

    // Deleting the primary leaves no flagged asset; the primary endpoint
    // falls back to the lowest sort order.
    let del_primary = server
        .delete(&format!("/api/v0/media/{}", a["id"].as_str().unwrap()))
        .await;
    assert_eq!(del_primary.status_code(), 204);

    let fallback = server
        .get(&format!("/api/v0/properties/{}/media/primary", property))
        .await;
    assert_eq!(fallback.status_code(), 200);
    let fallback = fallback.json::<Value>();
    assert_eq!(fallback["id"], c["id"]);
    assert_eq!(fallback["is_primary"], false);
}

#[tokio::test]
async fn reorder_applies_positional_order() {
    let server = test_server();
    let property = Uuid::new_v4();

    let a = upload_image(&server, property, "a.png", &[]).await;
    let b = upload_image(&server, property, "b.png", &[]).await;
    let c = upload_image(&server, property, "c.png", &[]).await;

    let order = vec![
        c["id"].as_str().unwrap(),
        a["id"].as_str().unwrap(),
        b["id"].as_str().unwrap(),
    ];
    let response = server
        .put(&format!("/api/v0/properties/{}/media/order", property))
        .json(&order)
        .await;
    assert_eq!(response.status_code(), 204);

    let list = server
        .get(&format!("/api/v0/properties/{}/media", property))
        .await
        .json::<Value>();
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|x| x["file_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["c.png", "a.png", "b.png"]);
}

#[tokio::test]
async fn reorder_with_wrong_set_leaves_order_untouched() {
    let server = test_server();
    let property = Uuid::new_v4();

    let a = upload_image(&server, property, "a.png", &[]).await;
    let _b = upload_image(&server, property, "b.png", &[]).await;
    let c = upload_image(&server, property, "c.png", &[]).await;

    let order = vec![c["id"].as_str().unwrap(), a["id"].as_str().unwrap()];
    let response = server
        .put(&format!("/api/v0/properties/{}/media/order", property))
        .json(&order)
        .await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["code"], "INVALID_REORDER_SET");

    let list = server
        .get(&format!("/api/v0/properties/{}/media", property))
        .await
        .json::<Value>();
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|x| x["file_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
}

#[tokio::test]
async fn document_upload_requires_agent_scope() {
    let server = test_server();
    let client = Uuid::new_v4();
    let pdf = b"%PDF-1.4 fake contract".to_vec();

    let (content_type, body) = file_form("contract.pdf", "application/pdf", &pdf, &[]);
    let denied = server
        .post(&format!("/api/v0/clients/{}/media", client))
        .content_type(&content_type)
        .bytes(body.clone().into())
        .await;
    assert_eq!(denied.status_code(), 401);

    let agent = Uuid::new_v4();
    let created = server
        .post(&format!("/api/v0/clients/{}/media", client))
        .content_type(&content_type)
        .bytes(body.into())
        .add_header("x-agent-id", agent.to_string())
        .await;
    assert_eq!(created.status_code(), 201, "{}", created.text());
    let doc = created.json::<Value>();
    assert_eq!(doc["class"], "document");
    assert_eq!(doc["agent_id"].as_str().unwrap(), agent.to_string());
    assert_eq!(doc["is_primary"], false);
    assert!(doc["thumbnail_url"].is_null());
}

#[tokio::test]
async fn update_details_changes_category_and_title() {
    let server = test_server();
    let property = Uuid::new_v4();

    let a = upload_image(&server, property, "a.png", &[]).await;
    let response = server
        .patch(&format!("/api/v0/media/{}", a["id"].as_str().unwrap()))
        .json(&serde_json::json!({"category": "interior", "title": "Kitchen"}))
        .await;
    assert_eq!(response.status_code(), 200);
    let updated = response.json::<Value>();
    assert_eq!(updated["category"], "interior");
    assert_eq!(updated["title"], "Kitchen");
}

#[tokio::test]
async fn detail_view_carries_inline_thumbnail_uri() {
    let server = test_server();
    let property = Uuid::new_v4();

    let a = upload_image(&server, property, "a.png", &[]).await;
    let detail = server
        .get(&format!("/api/v0/media/{}", a["id"].as_str().unwrap()))
        .await
        .json::<Value>();
    let uri = detail["thumbnail_data_uri"].as_str().unwrap();
    assert!(uri.starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn owner_cascade_delete_removes_all_assets() {
    let server = test_server();
    let property = Uuid::new_v4();

    upload_image(&server, property, "a.png", &[]).await;
    upload_image(&server, property, "b.png", &[]).await;

    let response = server
        .delete(&format!("/api/v0/properties/{}/media", property))
        .await;
    assert_eq!(response.status_code(), 204);

    let list = server
        .get(&format!("/api/v0/properties/{}/media", property))
        .await
        .json::<Value>();
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_owner_collection_is_not_found() {
    let server = test_server();
    let response = server
        .get(&format!("/api/v0/gardens/{}/media", Uuid::new_v4()))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn missing_asset_is_not_found() {
    let server = test_server();
    let response = server
        .get(&format!("/api/v0/media/{}", Uuid::new_v4()))
        .await;
    assert_eq!(response.status_code(), 404);
    assert_eq!(response.json::<Value>()["code"], "NOT_FOUND");
}
