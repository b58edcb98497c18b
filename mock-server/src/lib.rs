use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub key: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error_code: i64,
    pub error_msg: String,
    pub request_params: Vec<Param>,
}

/// Wire envelope: `{"response": ...}` or `{"error": {...}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Envelope {
    Response(Value),
    Error(ErrorBody),
}

pub type Users = Arc<Vec<User>>;

type Outcome = Result<Value, (i64, &'static str)>;

pub fn app() -> Router {
    let users: Users = Arc::new(seed_users());
    Router::new()
        .route("/method/{name}", get(call_method))
        .with_state(users)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn seed_users() -> Vec<User> {
    [(1, "Павел", "Дуров"), (2, "Александра", "Владимирова"), (5, "Илья", "Перекопский")]
        .into_iter()
        .map(|(id, first_name, last_name)| User {
            id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        })
        .collect()
}

async fn call_method(
    State(users): State<Users>,
    Path(name): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let token = lookup(&params, "access_token");
    let outcome = match name.as_str() {
        "users.get" => users_get(&users, &params),
        "friends.get" => friends_get(&users, token),
        "server.unavailable" => {
            return (StatusCode::SERVICE_UNAVAILABLE, "temporarily unavailable").into_response();
        }
        _ => Err((3, "Unknown method passed")),
    };

    let envelope = match outcome {
        Ok(value) => Envelope::Response(value),
        Err((error_code, error_msg)) => Envelope::Error(ErrorBody {
            error_code,
            error_msg: error_msg.to_string(),
            request_params: echo_params(&name, &params, token.is_some()),
        }),
    };
    (StatusCode::OK, Json(envelope)).into_response()
}

fn lookup<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .filter(|v| !v.is_empty())
}

fn users_get(users: &[User], params: &[(String, String)]) -> Outcome {
    let ids = lookup(params, "user_ids").unwrap_or("1");
    let mut found = Vec::new();
    for id in ids.split(',') {
        let id: i64 = id.trim().parse().map_err(|_| (113_i64, "Invalid user id"))?;
        found.extend(users.iter().filter(|u| u.id == id).cloned());
    }
    Ok(json!(found))
}

fn friends_get(users: &[User], token: Option<&str>) -> Outcome {
    if token.is_none() {
        return Err((5, "User authorization failed: no access_token passed."));
    }
    let items: Vec<i64> = users.iter().map(|u| u.id).filter(|id| *id != 1).collect();
    Ok(json!({ "count": items.len(), "items": items }))
}

/// Parameters echoed back in an error, the way the real API reports them.
fn echo_params(method: &str, params: &[(String, String)], authorized: bool) -> Vec<Param> {
    let mut echoed = Vec::new();
    if authorized {
        echoed.push(Param {
            key: "oauth".to_string(),
            value: "1".to_string(),
        });
    }
    echoed.push(Param {
        key: "method".to_string(),
        value: method.to_string(),
    });
    echoed.extend(
        params
            .iter()
            .filter(|(k, _)| k != "access_token")
            .map(|(key, value)| Param {
                key: key.clone(),
                value: value.clone(),
            }),
    );
    echoed
}
