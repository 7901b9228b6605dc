//! Cart handlers.

use serde_json::json;
use sneako_integration_tests::{TestServer, id_of};

fn item(product: &str) -> serde_json::Value {
    json!({"productId": product, "size": 42, "quantity": 1})
}

#[tokio::test]
async fn test_cart_starts_empty() {
    let (_dir, server) = TestServer::fresh().await;
    let (status, body) = server.get_json("cart").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_add_item_allocates_fresh_id() {
    let (_dir, server) = TestServer::fresh().await;

    let mut body = item("p1");
    body["id"] = json!("custom");
    body["color"] = json!("red");
    let (status, created) = server.post("cart", &body).await;

    assert_eq!(status, 200);
    assert_ne!(id_of(&created), "custom");
    assert_eq!(created["color"], "red");

    let (_, listed) = server.get_json("cart").await;
    assert_eq!(listed, json!([created]));
}

#[tokio::test]
async fn test_add_item_missing_fields() {
    let (_dir, server) = TestServer::fresh().await;

    for body in [
        json!({"size": 42, "quantity": 1}),
        json!({"productId": "p1", "quantity": 1}),
        json!({"productId": "p1", "size": 42, "quantity": 0}),
    ] {
        let (status, resp) = server.post("cart", &body).await;
        assert_eq!(status, 400);
        assert_eq!(resp["message"], "Missing required cart item fields.");
    }
    assert!(server.file_records("cart").is_empty());
}

#[tokio::test]
async fn test_update_item_in_place() {
    let (_dir, server) = TestServer::fresh().await;
    let (_, first) = server.post("cart", &item("p1")).await;
    let (_, second) = server.post("cart", &item("p2")).await;
    let id = id_of(&first);

    let (status, updated) = server
        .put(
            &format!("cart/{id}"),
            &json!({"id": "999", "productId": "p1", "size": 43, "quantity": 3}),
        )
        .await;

    assert_eq!(status, 200);
    assert_eq!(updated["id"], json!(id));
    assert_eq!(updated["quantity"], 3);

    let (_, listed) = server.get_json("cart").await;
    assert_eq!(listed, json!([updated, second]));
}

#[tokio::test]
async fn test_update_missing_item() {
    let (_dir, server) = TestServer::fresh().await;

    let (status, body) = server.put("cart/404", &item("p1")).await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Cart item not found.");
}

#[tokio::test]
async fn test_delete_item() {
    let (_dir, server) = TestServer::fresh().await;
    let (_, keep) = server.post("cart", &item("p1")).await;
    let (_, gone) = server.post("cart", &item("p2")).await;

    let (status, body) = server.delete(&format!("cart/{}", id_of(&gone))).await;
    assert_eq!(status, 204);
    assert!(body.is_empty());

    let (_, listed) = server.get_json("cart").await;
    assert_eq!(listed, json!([keep]));

    let (status, _) = server.delete(&format!("cart/{}", id_of(&gone))).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_other_methods_not_allowed() {
    let (_dir, server) = TestServer::fresh().await;

    for method in [reqwest::Method::PATCH, reqwest::Method::DELETE, reqwest::Method::PUT] {
        let (status, body) = server.send_json(method, "cart", &json!({})).await;
        assert_eq!(status, 405);
        assert_eq!(body["message"], "Method Not Allowed");
    }
}
