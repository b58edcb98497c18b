//! API call descriptions and their conversion into HTTP requests.
//!
//! # Design
//! A [`Request`] names the remote method, the access token and any extra
//! parameters. [`Request::to_http`] is pure: it only assembles the URL and
//! never touches the network. Caller parameters keep their insertion order
//! and come first in the query string; the protocol parameters (`v`, `https`
//! and, when a token is present, `access_token`) are appended after them and
//! replace any caller value under the same key.

use std::fmt;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use url::Url;

use crate::http::{HttpMethod, HttpRequest};

pub const API_SCHEME: &str = "https";
pub const API_HOST: &str = "api.vk.com";
pub const API_PATH: &str = "method";
pub const API_VERSION: &str = "5.35";
pub const HTTPS_FLAG: &str = "1";

pub const PARAM_VERSION: &str = "v";
pub const PARAM_HTTPS: &str = "https";
pub const PARAM_TOKEN: &str = "access_token";

/// A single API call: `GET https://api.vk.com/method/<method>?<params>`.
///
/// Serialized as `{"method", "token", "values"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Request {
    pub method: String,
    #[serde(default)]
    pub token: String,
    #[serde(default, rename = "values")]
    pub params: Params,
}

impl Request {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.add(key, value);
        self
    }

    /// Build the HTTP request for this call.
    ///
    /// # Panics
    /// Panics if the fixed API base URL cannot be assembled. That can only
    /// happen when the protocol constants themselves are broken, never because
    /// of the values stored in the request.
    pub fn to_http(&self) -> HttpRequest {
        let mut url = Url::parse(&format!("{API_SCHEME}://{API_HOST}/"))
            .expect("API base URL is built from fixed constants");
        url.path_segments_mut()
            .expect("API base URL is hierarchical")
            .pop_if_empty()
            .push(API_PATH)
            .push(&self.method);

        let has_token = !self.token.is_empty();
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in self.params.iter() {
                if is_protocol_key(key, has_token) {
                    continue;
                }
                query.append_pair(key, value);
            }
            query.append_pair(PARAM_VERSION, API_VERSION);
            query.append_pair(PARAM_HTTPS, HTTPS_FLAG);
            if has_token {
                query.append_pair(PARAM_TOKEN, &self.token);
            }
        }

        HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        }
    }
}

fn is_protocol_key(key: &str, has_token: bool) -> bool {
    key == PARAM_VERSION || key == PARAM_HTTPS || (has_token && key == PARAM_TOKEN)
}

/// Ordered, multi-valued request parameters.
///
/// Serialized as a map from key to the list of its values, with keys in order
/// of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value; existing values under `key` are kept.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Replace every value under `key` with `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.remove(&key);
        self.0.push((key, value.into()));
    }

    pub fn remove(&mut self, key: &str) {
        self.0.retain(|(k, _)| k != key);
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        params.extend(iter);
        params
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Params {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add(key, value);
        }
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut keys: Vec<&str> = Vec::new();
        for (key, _) in self.iter() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        let mut map = serializer.serialize_map(Some(keys.len()))?;
        for key in keys {
            let values: Vec<&str> = self.get_all(key).collect();
            map.serialize_entry(key, &values)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Params {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ParamsVisitor)
    }
}

struct ParamsVisitor;

impl<'de> Visitor<'de> for ParamsVisitor {
    type Value = Params;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of parameter names to lists of values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Params, A::Error> {
        let mut params = Params::new();
        while let Some((key, values)) = access.next_entry::<String, Vec<String>>()? {
            for value in values {
                params.add(key.clone(), value);
            }
        }
        Ok(params)
    }
}
