mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn create_then_get_returns_same_fields() {
    let app = TestApp::new();

    let body = json!({ "name": "A", "location": "X", "location_type": "city" }).to_string();
    let (status, created) = app.send("POST", "/api/v1/data", Some(&body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["message"], "success");
    assert_eq!(created["status"], true);
    let id = created["data"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 24);

    let (status, fetched) = app.send("GET", &format!("/api/v1/data/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        fetched["data"],
        json!({ "_id": id, "name": "A", "location": "X", "location_type": "city" })
    );
    assert_eq!(fetched["message"], "success");
}

#[tokio::test]
async fn list_on_empty_collection_returns_null_data() {
    let app = TestApp::new();

    let (status, body) = app.send("GET", "/api/v1/data", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["message"], "success");
    assert_eq!(body["status"], true);
}

#[tokio::test]
async fn list_returns_records_in_insertion_order() {
    let app = TestApp::new();
    let first = app.create("A", "X", "city").await;
    let second = app.create("B", "Y", "province").await;

    let (status, body) = app.send("GET", "/api/v1/data", None).await;

    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["_id"], first);
    assert_eq!(data[1]["_id"], second);
    assert_eq!(data[1]["location_type"], "province");
}

#[tokio::test]
async fn get_unknown_id_is_not_found() {
    let app = TestApp::new();

    let (status, body) = app
        .send("GET", "/api/v1/data/64b7f0c2a1b2c3d4e5f60718", None)
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["message"], "failed");
    assert_eq!(body["status"], false);
}

#[tokio::test]
async fn malformed_id_is_bad_request() {
    let app = TestApp::new();

    for (method, body) in [("GET", None), ("PUT", Some("{}")), ("DELETE", None)] {
        let (status, response) = app.send(method, "/api/v1/data/not-an-id", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} should reject", method);
        assert_eq!(response["status"], false);
    }
}

#[tokio::test]
async fn create_with_invalid_body_is_bad_request() {
    let app = TestApp::new();

    let (status, body) = app.send("POST", "/api/v1/data", Some("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "failed");

    let (status, _) = app.send("POST", "/api/v1/data", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(app.repo.is_empty());
}

#[tokio::test]
async fn bulk_create_returns_ids_in_order() {
    let app = TestApp::new();

    let body = concat!(
        r#"{"name":"one","location":"X","location_type":"city"}"#,
        r#"{"name":"two","location":"Y","location_type":"city"}"#,
        "\n",
        r#"{"name":"three","location":"Z","location_type":"country"}"#,
    );
    let (status, response) = app.send("POST", "/api/v1/data/_bulk", Some(body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["message"], "success");
    let ids: Vec<String> = response["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids.len(), 3);

    for (id, name) in ids.iter().zip(["one", "two", "three"]) {
        let (status, fetched) = app.send("GET", &format!("/api/v1/data/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["data"]["name"], name);
    }
}

#[tokio::test]
async fn bulk_create_with_bad_object_writes_nothing() {
    let app = TestApp::new();

    let body = r#"{"name":"ok"}{"name":"broken""#;
    let (status, response) = app.send("POST", "/api/v1/data/_bulk", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["status"], false);
    assert!(app.repo.is_empty());
}

#[tokio::test]
async fn update_merges_blank_fields_from_existing_record() {
    let app = TestApp::new();
    let id = app.create("A", "X", "city").await;

    let patch = json!({ "name": "", "location": "Y", "location_type": "" }).to_string();
    let (status, body) = app
        .send("PUT", &format!("/api/v1/data/{}", id), Some(&patch))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "updated");
    assert_eq!(
        body["data"],
        json!({ "_id": id, "name": "A", "location": "Y", "location_type": "city" })
    );

    let (_, fetched) = app.send("GET", &format!("/api/v1/data/{}", id), None).await;
    assert_eq!(fetched["data"]["location"], "Y");
    assert_eq!(fetched["data"]["name"], "A");
}

#[tokio::test]
async fn update_with_omitted_fields_keeps_them() {
    let app = TestApp::new();
    let id = app.create("A", "X", "city").await;

    let (status, body) = app
        .send("PUT", &format!("/api/v1/data/{}", id), Some(r#"{"name":"B"}"#))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "B");
    assert_eq!(body["data"]["location"], "X");
    assert_eq!(body["data"]["location_type"], "city");
}

#[tokio::test]
async fn update_with_null_fields_keeps_them() {
    let app = TestApp::new();
    let id = app.create("A", "X", "city").await;

    let (status, body) = app
        .send(
            "PUT",
            &format!("/api/v1/data/{}", id),
            Some(r#"{"name":null,"location":"Y"}"#),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "updated");
    assert_eq!(body["data"]["name"], "A");
    assert_eq!(body["data"]["location"], "Y");
    assert_eq!(body["data"]["location_type"], "city");
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            "PUT",
            "/api/v1/data/64b7f0c2a1b2c3d4e5f60718",
            Some(r#"{"name":"B"}"#),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], false);
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let app = TestApp::new();
    let id = app.create("A", "X", "city").await;

    let (status, body) = app
        .send("DELETE", &format!("/api/v1/data/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "deleted");
    assert_eq!(body["data"], id);

    let (status, _) = app.send("GET", &format!("/api/v1/data/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send("DELETE", &format!("/api/v1/data/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn backend_outage_yields_failed_envelope_not_a_crash() {
    let app = TestApp::new();
    let id = app.create("A", "X", "city").await;
    app.repo.set_unavailable(true);

    let (status, body) = app.send("GET", "/api/v1/data", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "failed");
    assert_eq!(body["status"], false);

    let (status, _) = app
        .send("POST", "/api/v1/data", Some(r#"{"name":"B"}"#))
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    app.repo.set_unavailable(false);
    let (status, _) = app.send("GET", &format!("/api/v1/data/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = TestApp::new();

    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/data")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-42");
}
