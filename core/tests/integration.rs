//! End-to-end calls against the mock API server.
//!
//! # Design
//! Starts the mock server on a random port and drives `Client` through the
//! real `UreqTransport`. The API host is fixed, so the transport is wrapped
//! in a redirect that points every request at the local server while keeping
//! the path and query the core built.

use std::net::SocketAddr;
use std::sync::Arc;

use serde::Deserialize;
use vk_core::{
    is_server_error, ApiError, BoxError, Client, Envelope, ErrorCode, HttpRequest, HttpResponse,
    HttpTransport, Request, TransportConfig, UreqTransport,
};

#[derive(Debug, Deserialize)]
struct User {
    id: i64,
    first_name: String,
    last_name: String,
}

#[derive(Debug, Deserialize)]
struct Friends {
    count: usize,
    items: Vec<i64>,
}

/// Sends every request to `addr` over plain HTTP.
struct Redirect {
    inner: UreqTransport,
    addr: SocketAddr,
}

impl HttpTransport for Redirect {
    fn perform(&self, mut request: HttpRequest) -> Result<HttpResponse, BoxError> {
        assert_eq!(request.url.host_str(), Some(vk_core::request::API_HOST));
        request
            .url
            .set_scheme("http")
            .map_err(|_| "cannot switch to http")?;
        request.url.set_host(Some(self.addr.ip().to_string().as_str()))?;
        request
            .url
            .set_port(Some(self.addr.port()))
            .map_err(|_| "cannot set port")?;
        self.inner.perform(request)
    }
}

fn spawn_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn client_for(addr: SocketAddr) -> Client {
    Client::new(Arc::new(Redirect {
        inner: UreqTransport::new(&TransportConfig::default()),
        addr,
    }))
}

#[test]
fn users_get_round_trip() {
    let client = client_for(spawn_server());

    let request = Request::new("users.get").param("user_ids", "1,2");
    let mut response = Envelope::<Vec<User>>::default();
    client.execute(request, &mut response).unwrap();

    let users = response.response.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].id, 1);
    assert_eq!(users[0].first_name, "Павел");
    assert_eq!(users[0].last_name, "Дуров");
    assert_eq!(response.request.unwrap().method, "users.get");
}

#[test]
fn application_error_is_classified() {
    let client = client_for(spawn_server());

    let mut response = Envelope::<Friends>::default();
    let err = client
        .execute(Request::new("friends.get"), &mut response)
        .unwrap_err();

    assert!(is_server_error(&err));
    let server = err.server_error().unwrap();
    assert_eq!(server.code, ErrorCode::AuthorizationFailed);
    assert_eq!(server.request_params[0].key, "method");
    assert_eq!(server.request_params[0].value, "friends.get");
    assert!(server
        .request_params
        .iter()
        .any(|p| p.key == "v" && p.value == vk_core::request::API_VERSION));
    assert!(response.response.is_none());
}

#[test]
fn token_is_sent_and_hidden_from_echo() {
    let client = client_for(spawn_server());

    let friends: Friends = client
        .execute_raw(Request::new("friends.get").with_token("secret"))
        .unwrap();
    assert_eq!(friends.count, 2);
    assert_eq!(friends.items, [2, 5]);

    let err = client
        .execute_raw::<Friends>(Request::new("no.such.method").with_token("secret"))
        .unwrap_err();
    let server = err.server_error().unwrap();
    assert_eq!(server.code, ErrorCode::UnknownMethod);
    assert_eq!(server.request_params[0].key, "oauth");
    assert!(server.request_params.iter().all(|p| p.value != "secret"));
}

#[test]
fn raw_decode_into_plain_sequence() {
    let client = client_for(spawn_server());

    let ids: Vec<serde_json::Value> = client
        .execute_raw(Request::new("users.get").param("user_ids", "5"))
        .unwrap();
    assert_eq!(ids.len(), 1);
    assert_eq!(ids[0]["first_name"], "Илья");
}

#[test]
fn non_200_is_bad_response_code() {
    let client = client_for(spawn_server());

    let mut response = Envelope::<serde_json::Value>::default();
    let err = client
        .execute(Request::new("server.unavailable"), &mut response)
        .unwrap_err();
    assert!(matches!(err, ApiError::BadResponseCode));
}

#[test]
fn connection_failure_is_a_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = client_for(addr);

    let mut response = Envelope::<serde_json::Value>::default();
    let err = client
        .execute(Request::new("users.get"), &mut response)
        .unwrap_err();
    let ApiError::Transport(inner) = &err else {
        panic!("expected transport error, got {err:?}");
    };
    assert!(inner.downcast_ref::<ureq::Error>().is_some());
    assert!(!is_server_error(&err));
}
