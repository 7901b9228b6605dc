//! Backing files, restarts, write failures and concurrent writers.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::fs;

use serde_json::json;
use sneako_core::DOMAIN_RESOURCES;
use sneako_integration_tests::{TestServer, id_of};
use tempfile::TempDir;

#[tokio::test]
async fn test_startup_creates_domain_files() {
    let (dir, _server) = TestServer::fresh().await;

    for name in DOMAIN_RESOURCES {
        let raw = fs::read_to_string(dir.path().join(format!("{name}.json"))).unwrap();
        let file: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(file[name], json!([]));
    }
}

#[tokio::test]
async fn test_mutations_are_written_through() {
    let (_dir, server) = TestServer::fresh().await;

    let (_, created) = server
        .post("cart", &json!({"productId": "p1", "size": 41, "quantity": 2}))
        .await;

    let records = server.file_records("cart");
    assert_eq!(records, vec![created]);
}

#[tokio::test]
async fn test_state_survives_restart() {
    let dir = TempDir::new().unwrap();
    let deleted_id;
    {
        let server = TestServer::start(dir.path()).await;
        server.post("products", &json!({"name": "a"})).await;
        let (_, b) = server.post("products", &json!({"name": "b"})).await;
        deleted_id = id_of(&b);
        server.delete(&format!("products/{deleted_id}")).await;
    }

    let server = TestServer::start(dir.path()).await;
    let (_, body) = server.get_json("products").await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    // Ids are not reused after a restart either.
    let (_, next) = server.post("products", &json!({"name": "c"})).await;
    assert_ne!(id_of(&next), deleted_id);
    assert_eq!(id_of(&next), "3");
}

#[tokio::test]
async fn test_legacy_ids_reject_collision() {
    let dir = TempDir::new().unwrap();
    let server = TestServer::start_with(dir.path(), &[("MOCKSERVER_ID_STRATEGY", "legacy")]).await;
    for name in ["a", "b", "c"] {
        server.post("products", &json!({ "name": name })).await;
    }
    server.delete("products/1").await;

    // len + 1 == 3, which is still taken.
    let (status, _) = server.post("products", &json!({"name": "d"})).await;
    assert_eq!(status, 409);
    assert_eq!(server.file_records("products").len(), 2);
}

#[tokio::test]
async fn test_uuid_ids() {
    let dir = TempDir::new().unwrap();
    let server = TestServer::start_with(dir.path(), &[("MOCKSERVER_ID_STRATEGY", "uuid")]).await;

    let (_, created) = server.post("orders", &json!({"userId": "1"})).await;
    assert_eq!(id_of(&created).len(), 36);
}

#[tokio::test]
async fn test_write_failure_is_reported_and_nothing_changes() {
    let (dir, server) = TestServer::fresh().await;
    let (_, kept) = server
        .post("cart", &json!({"productId": "p1", "size": 41, "quantity": 2}))
        .await;

    fs::remove_dir_all(dir.path()).unwrap();

    let (status, body) = server
        .post("cart", &json!({"productId": "p2", "size": 42, "quantity": 1}))
        .await;
    assert_eq!(status, 500);
    assert_eq!(
        body,
        json!({"success": false, "message": "Failed to save data"})
    );

    let (status, _) = server.delete(&format!("cart/{}", id_of(&kept))).await;
    assert_eq!(status, 500);

    let (_, listed) = server.get_json("cart").await;
    assert_eq!(listed, json!([kept]));
}

#[tokio::test]
async fn test_concurrent_appends_get_unique_ids() {
    let (_dir, server) = TestServer::fresh().await;

    let requests = (0..20).map(|n| {
        server
            .client
            .post(server.url("cart"))
            .json(&json!({"productId": format!("p{n}"), "size": 40, "quantity": 1}))
            .send()
    });
    let responses = futures_join_all(requests).await;

    let mut ids = HashSet::new();
    for resp in responses {
        let resp = resp.unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert!(ids.insert(id_of(&body)));
    }

    assert_eq!(ids.len(), 20);
    assert_eq!(server.file_records("cart").len(), 20);
}

/// Await a batch of futures concurrently on the test runtime.
async fn futures_join_all<F>(futures: impl Iterator<Item = F>) -> Vec<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    let handles: Vec<_> = futures.map(tokio::spawn).collect();
    let mut outputs = Vec::with_capacity(handles.len());
    for handle in handles {
        outputs.push(handle.await.unwrap());
    }
    outputs
}
