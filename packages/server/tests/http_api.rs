//! HTTP API integration tests.
//!
//! Tests for REST API endpoints (health check, rooms, charts, snapshots).

mod fixtures;
use fixtures::TestServer;
use serde_json::{Value, json};

async fn create_chart(client: &reqwest::Client, server: &TestServer, title: &str) -> Value {
    let response = client
        .post(format!("{}/api/charts", server.base_url()))
        .json(&json!({"title": title}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse JSON")
}

#[tokio::test]
async fn test_health_endpoint() {
    // テスト項目: /api/health エンドポイントが正常に動作する
    // given (前提条件):
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    // when (操作):
    let response = client
        .get(format!("{}/api/health", server.base_url()))
        .send()
        .await
        .expect("Failed to send request");

    // then (期待する結果):
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_rooms_list_is_empty_without_connections() {
    // テスト項目: 接続がなければルーム一覧は空
    // given (前提条件):
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    // when (操作):
    let response = client
        .get(format!("{}/api/rooms", server.base_url()))
        .send()
        .await
        .expect("Failed to send request");

    // then (期待する結果):
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_room_detail_endpoint_not_found() {
    // テスト項目: 存在しないルームに対して 404 を返す
    // given (前提条件):
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    // when (操作):
    let response = client
        .get(format!("{}/api/rooms/nonexistent", server.base_url()))
        .send()
        .await
        .expect("Failed to send request");

    // then (期待する結果):
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_chart_create_get_update() {
    // テスト項目: チャートの作成・取得・全体上書きができる
    // given (前提条件):
    let server = TestServer::start().await;
    let client = reqwest::Client::new();
    let chart = create_chart(&client, &server, "My flow").await;
    let id = chart["id"].as_str().unwrap().to_string();
    assert_eq!(chart["state"], json!({}));

    // when (操作):
    let state = json!({
        "nodes": [{"id": "n1", "type": "editableNode", "position": {"x": 1.0, "y": 2.0}, "data": {"label": "hi"}}],
        "edges": [],
        "viewport": {"x": 0.0, "y": 0.0, "zoom": 1.0}
    });
    let response = client
        .put(format!("{}/api/charts/{}", server.base_url(), id))
        .json(&json!({"state": state}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    // then (期待する結果):
    let fetched: Value = client
        .get(format!("{}/api/charts/{}", server.base_url(), id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(fetched["title"], "My flow");
    assert_eq!(fetched["state"], state);
    assert!(fetched["created_at"].is_string());
    assert!(fetched["updated_at"].is_string());
}

#[tokio::test]
async fn test_chart_invalid_id_is_bad_request() {
    // テスト項目: UUID でないチャート ID は 400 になる
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/charts/not-a-uuid", server.base_url()))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_chart_missing_is_not_found() {
    // テスト項目: 存在しないチャートは 404 になる
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!(
            "{}/api/charts/{}",
            server.base_url(),
            uuid::Uuid::new_v4()
        ))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_snapshot_lifecycle() {
    // テスト項目: スナップショットの作成・一覧・復元・削除
    // given (前提条件):
    let server = TestServer::start().await;
    let client = reqwest::Client::new();
    let chart = create_chart(&client, &server, "snap").await;
    let id = chart["id"].as_str().unwrap().to_string();
    let v1 = json!({"nodes": [{"id": "a", "position": {"x": 0.0, "y": 0.0}, "data": {}}], "edges": []});
    client
        .put(format!("{}/api/charts/{}", server.base_url(), id))
        .json(&json!({"state": v1}))
        .send()
        .await
        .expect("Failed to send request");

    // when (操作): スナップショットを撮ってから state を上書きし、復元する
    let snapshot: Value = client
        .post(format!("{}/api/charts/{}/snapshots", server.base_url(), id))
        .json(&json!({"image": "data:image/png;base64,AAAA"}))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON");
    let snapshot_id = snapshot["id"].as_str().unwrap().to_string();
    client
        .put(format!("{}/api/charts/{}", server.base_url(), id))
        .json(&json!({"state": {"nodes": [], "edges": []}}))
        .send()
        .await
        .expect("Failed to send request");
    let restored: Value = client
        .post(format!(
            "{}/api/snapshots/{}/restore",
            server.base_url(),
            snapshot_id
        ))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON");

    // then (期待する結果):
    assert_eq!(restored["state"], v1);
    let listed: Value = client
        .get(format!("{}/api/charts/{}/snapshots", server.base_url(), id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["image_url"], "data:image/png;base64,AAAA");

    let deleted = client
        .delete(format!("{}/api/snapshots/{}", server.base_url(), snapshot_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(deleted.status(), 204);
}

#[tokio::test]
async fn test_delete_chart() {
    // テスト項目: チャートを削除すると以降の取得は 404 になる
    let server = TestServer::start().await;
    let client = reqwest::Client::new();
    let chart = create_chart(&client, &server, "gone").await;
    let id = chart["id"].as_str().unwrap().to_string();

    let response = client
        .delete(format!("{}/api/charts/{}", server.base_url(), id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/api/charts/{}", server.base_url(), id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}
