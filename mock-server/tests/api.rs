use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Envelope, User};
use tower::ServiceExt;

async fn call(uri: &str) -> (StatusCode, Vec<u8>) {
    let resp = app()
        .oneshot(Request::builder().uri(uri).body(String::new()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn envelope(uri: &str) -> Envelope {
    let (status, body) = call(uri).await;
    assert_eq!(status, StatusCode::OK, "{uri}");
    serde_json::from_slice(&body).unwrap()
}

// --- users.get ---

#[tokio::test]
async fn users_get_returns_requested_users() {
    let Envelope::Response(value) = envelope("/method/users.get?user_ids=1,2&v=5.35&https=1").await
    else {
        panic!("expected response");
    };
    let users: Vec<User> = serde_json::from_value(value).unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].first_name, "Павел");
    assert_eq!(users[1].id, 2);
}

#[tokio::test]
async fn users_get_unknown_id_is_skipped() {
    let Envelope::Response(value) = envelope("/method/users.get?user_ids=404").await else {
        panic!("expected response");
    };
    assert_eq!(value, serde_json::json!([]));
}

#[tokio::test]
async fn users_get_invalid_id_is_an_error_envelope() {
    let Envelope::Error(error) = envelope("/method/users.get?user_ids=abc&v=5.35").await else {
        panic!("expected error");
    };
    assert_eq!(error.error_code, 113);
    let keys: Vec<&str> = error.request_params.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, ["method", "user_ids", "v"]);
}

// --- friends.get ---

#[tokio::test]
async fn friends_get_without_token_fails_inside_200() {
    let Envelope::Error(error) = envelope("/method/friends.get?v=5.35").await else {
        panic!("expected error");
    };
    assert_eq!(error.error_code, 5);
}

#[tokio::test]
async fn friends_get_with_token() {
    let Envelope::Response(value) = envelope("/method/friends.get?v=5.35&access_token=t").await
    else {
        panic!("expected response");
    };
    assert_eq!(value["count"], 2);
    assert_eq!(value["items"], serde_json::json!([2, 5]));
}

// --- everything else ---

#[tokio::test]
async fn unknown_method() {
    let Envelope::Error(error) = envelope("/method/nope.nothing").await else {
        panic!("expected error");
    };
    assert_eq!(error.error_code, 3);
    assert_eq!(error.request_params[0].value, "nope.nothing");
}

#[tokio::test]
async fn unavailable_returns_non_200() {
    let (status, body) = call("/method/server.unavailable").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, b"temporarily unavailable");
}

#[tokio::test]
async fn unknown_path_is_404() {
    let (status, _) = call("/api/users").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
