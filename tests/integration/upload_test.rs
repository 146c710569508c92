//! Upload Integration Tests
//!
//! Multipart requests built by `ApiClient::upload` and sent by the store's
//! document operations.

use std::sync::Arc;

use atlus_api::{RequestBody, UploadFile, UploadFiles, FILES_FIELD, FILE_FIELD};
use atlus_client::InvalidationPolicy;
use atlus_core::{MemoryNavigator, MemorySessionStore};
use serde_json::json;

use crate::support::{api_client, brain_store, RouteTransport};

fn multipart(body: &RequestBody) -> &atlus_api::MultipartForm {
    match body {
        RequestBody::Multipart(form) => form,
        other => panic!("expected multipart body, got {:?}", other),
    }
}

#[tokio::test]
async fn test_ingest_sends_two_files_and_brain_id() {
    let transport = Arc::new(RouteTransport::default());
    transport.route("GET", "/api/brain/b1/graph", 200, json!({"nodes": [], "edges": []}));
    transport.route("POST", "/api/brain/ingest", 200, json!({"nodes_created": 7}));
    let store = brain_store(
        transport.clone(),
        Arc::new(MemorySessionStore::with_token("tok")),
        Arc::new(MemoryNavigator::default()),
        InvalidationPolicy::ClearAll,
    );
    store.fetch_graph("b1").await.unwrap();

    let files = vec![
        UploadFile::new("lecture-1.pdf", b"%PDF-1.4".to_vec()),
        UploadFile::new("notes.md", "# Heat"),
    ];
    let result = store.ingest_documents("b1", files).await.unwrap();
    assert_eq!(result["nodes_created"], 7);

    let request = transport.requests().pop().unwrap();
    assert_eq!(request.header("Content-Type"), None);
    let form = multipart(&request.body);
    let uploaded: Vec<&str> = form
        .files_named(FILES_FIELD)
        .iter()
        .map(|f| f.file_name.as_str())
        .collect();
    assert_eq!(uploaded, vec!["lecture-1.pdf", "notes.md"]);
    assert_eq!(form.text_values("brain_id"), vec!["b1"]);
    assert!(form.files_named(FILE_FIELD).is_empty());

    // New documents change the brain's contents.
    assert!(store.get_graph("b1").is_none());
}

#[tokio::test]
async fn test_upload_skips_null_and_empty_fields() {
    let transport = Arc::new(RouteTransport::default());
    transport.route("POST", "/api/brain/ocr", 200, json!({"markdown": "# Scan"}));
    let api = api_client(
        transport.clone(),
        Arc::new(MemorySessionStore::with_token("tok")),
        Arc::new(MemoryNavigator::default()),
    );

    let fields = json!({"brain_id": "b1", "source_file_id": null, "note": "", "page": 3})
        .as_object()
        .cloned()
        .unwrap();
    let data = api
        .upload(
            "/api/brain/ocr",
            &fields,
            UploadFile::new("scan.png", vec![0x89, 0x50, 0x4e, 0x47]).with_content_type("image/png"),
        )
        .await
        .unwrap();
    assert_eq!(data["markdown"], "# Scan");

    let request = transport.requests().pop().unwrap();
    let form = multipart(&request.body);
    assert_eq!(form.text_values("brain_id"), vec!["b1"]);
    assert_eq!(form.text_values("page"), vec!["3"]);
    assert!(form.text_values("source_file_id").is_empty());
    assert!(form.text_values("note").is_empty());

    let files = form.files_named(FILE_FIELD);
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].content_type.as_deref(), Some("image/png"));
}

#[tokio::test]
async fn test_create_brain_with_initial_files() {
    let transport = Arc::new(RouteTransport::default());
    transport.route(
        "POST",
        "/api/brain/create",
        201,
        json!({"brain": {"id": "b9", "name": "Optics", "badge": "Course", "created_at": null}}),
    );
    let store = brain_store(
        transport.clone(),
        Arc::new(MemorySessionStore::with_token("tok")),
        Arc::new(MemoryNavigator::default()),
        InvalidationPolicy::ClearAll,
    );

    let brain = store
        .create_brain(
            "Optics",
            Some("Course"),
            UploadFiles::Many(vec![UploadFile::new("syllabus.txt", "week 1")]),
        )
        .await
        .unwrap();

    assert_eq!(brain.badge.as_deref(), Some("Course"));
    assert_eq!(store.get_brain("b9"), Some(brain));

    let request = transport.requests().pop().unwrap();
    let form = multipart(&request.body);
    assert_eq!(form.text_values("badge"), vec!["Course"]);
    assert_eq!(form.files_named(FILES_FIELD).len(), 1);
}
