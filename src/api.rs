//! MizbanCloud REST client
//!
//! Every endpoint answers with the same envelope:
//! `{"success": bool, "message": string, "data": any}`. The client attaches
//! the bearer token, applies the request timeout, triages 401/429 before
//! looking at the body and unwraps the envelope. Decoding `data` into a
//! concrete shape is left to the caller via [`extract`].

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::Config;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Successful response wrapper. `data` is never interpreted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default)]
    pub data: Value,
}

/// Failure response with optional per-field validation errors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: BTreeMap<String, String>,
}

/// `null` decodes like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("error creating request: {0}")]
    Build(String),

    #[error("error making request: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unauthorized: please login again using 'mizban login'")]
    Unauthorized,

    #[error("rate limited: please wait and try again")]
    RateLimited,

    #[error("error parsing response: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    #[error("API error: {message}")]
    Api {
        message: String,
        errors: BTreeMap<String, String>,
    },

    #[error("error parsing data: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ApiError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

/// Decode the envelope's `data` into `T`.
///
/// Object members that are JSON `null` are dropped first, so a null field
/// takes its `#[serde(default)]` value instead of failing the decode.
/// A `null` payload decodes as `null` when `T` accepts it (`Option`, `Value`)
/// and as an empty object otherwise.
pub fn extract<T: DeserializeOwned>(envelope: &Envelope) -> Result<T, ApiError> {
    if envelope.data.is_null() {
        return T::deserialize(&Value::Null)
            .or_else(|_| T::deserialize(&Value::Object(Map::new())))
            .map_err(ApiError::Decode);
    }
    if !contains_null_member(&envelope.data) {
        return T::deserialize(&envelope.data).map_err(ApiError::Decode);
    }
    let mut data = envelope.data.clone();
    strip_null_members(&mut data);
    T::deserialize(&data).map_err(ApiError::Decode)
}

/// [`extract`] for collections; `null` data is an empty list.
pub fn extract_list<T: DeserializeOwned>(envelope: &Envelope) -> Result<Vec<T>, ApiError> {
    if envelope.data.is_null() {
        return Ok(Vec::new());
    }
    extract(envelope)
}

fn contains_null_member(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.values().any(|v| v.is_null() || contains_null_member(v)),
        Value::Array(items) => items.iter().any(contains_null_member),
        _ => false,
    }
}

fn strip_null_members(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_null_members);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_null_members),
        _ => {}
    }
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Self::with_timeout(config, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(config: &Config, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Build(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            token: config.token().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform one call. No retries.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Envelope, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        let mut builder = self
            .http
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");

        if let Some(body) = body {
            let bytes = serde_json::to_vec(body).map_err(|e| ApiError::Build(e.to_string()))?;
            builder = builder.body(bytes);
        }

        if !self.token.is_empty() {
            builder = builder.bearer_auth(&self.token);
        }

        let request = builder.build().map_err(|e| ApiError::Build(e.to_string()))?;
        let resp = self.http.execute(request).await.map_err(ApiError::Transport)?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(ApiError::Transport)?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimited);
        }

        let envelope: Envelope =
            serde_json::from_slice(&bytes).map_err(ApiError::MalformedResponse)?;

        if !envelope.success {
            let errors = serde_json::from_slice::<ErrorEnvelope>(&bytes)
                .map(|e| e.errors)
                .unwrap_or_default();
            return Err(ApiError::Api {
                message: envelope.message,
                errors,
            });
        }

        Ok(envelope)
    }

    pub async fn get(&self, path: &str) -> Result<Envelope, ApiError> {
        self.request::<()>(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Envelope, ApiError> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// POST without a request body
    pub async fn post_empty(&self, path: &str) -> Result<Envelope, ApiError> {
        self.request::<()>(Method::POST, path, None).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Envelope, ApiError> {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// PUT without a request body
    pub async fn put_empty(&self, path: &str) -> Result<Envelope, ApiError> {
        self.request::<()>(Method::PUT, path, None).await
    }

    pub async fn delete(&self, path: &str) -> Result<Envelope, ApiError> {
        self.request::<()>(Method::DELETE, path, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn config_for(server: &MockServer, token: &str) -> Config {
        Config {
            token: token.to_string(),
            base_url: server.base_url(),
        }
    }

    fn client_for(server: &MockServer, token: &str) -> ApiClient {
        ApiClient::new(&config_for(server, token)).unwrap()
    }

    #[tokio::test]
    async fn get_returns_envelope_with_opaque_data() {
        let server = MockServer::start_async().await;
        let body = json!({
            "success": true,
            "message": "ok",
            "data": [{"id": 1, "name": "web", "nested": {"x": [1, 2]}}]
        });
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/cloud/servers")
                    .header("accept", "application/json")
                    .header("content-type", "application/json")
                    .header("authorization", "Bearer secret");
                then.status(200).json_body(body.clone());
            })
            .await;

        let envelope = client_for(&server, "secret").get("/v1/cloud/servers").await.unwrap();

        mock.assert_async().await;
        assert!(envelope.success);
        assert_eq!(envelope.message, "ok");
        assert_eq!(envelope.data, body["data"]);
    }

    #[tokio::test]
    async fn unsuccessful_envelope_carries_message_verbatim() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/cdn/ng/domains/9");
                then.status(422).json_body(json!({
                    "success": false,
                    "message": "Domain not found: 9",
                    "data": {"ignored": true},
                    "errors": {"domain": "does not exist"}
                }));
            })
            .await;

        let err = client_for(&server, "t").get("/v1/cdn/ng/domains/9").await.unwrap_err();

        match err {
            ApiError::Api { message, errors } => {
                assert_eq!(message, "Domain not found: 9");
                assert_eq!(errors.get("domain").map(String::as_str), Some("does not exist"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn null_message_is_an_empty_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/cloud/volumes");
                then.status(400)
                    .json_body(json!({"success": false, "message": null, "data": null}));
            })
            .await;

        let err = client_for(&server, "t").get("/v1/cloud/volumes").await.unwrap_err();

        match err {
            ApiError::Api { message, errors } => {
                assert_eq!(message, "");
                assert!(errors.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unexpected_errors_shape_still_yields_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/cloud/volumes");
                then.status(400).json_body(json!({
                    "success": false,
                    "message": "invalid",
                    "errors": {"size": ["too small"]}
                }));
            })
            .await;

        let err = client_for(&server, "t")
            .post("/v1/cloud/volumes", &json!({"size": 1}))
            .await
            .unwrap_err();

        match err {
            ApiError::Api { message, errors } => {
                assert_eq!(message, "invalid");
                assert!(errors.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn status_401_wins_over_successful_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/auth/profile");
                then.status(401).json_body(json!({"success": true, "message": "ok", "data": {}}));
            })
            .await;

        let err = client_for(&server, "stale").get("/v1/auth/profile").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn status_429_wins_over_successful_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/cdn/ng/plans");
                then.status(429).json_body(json!({"success": true, "message": "ok", "data": []}));
            })
            .await;

        let err = client_for(&server, "t").get("/v1/cdn/ng/plans").await.unwrap_err();
        assert!(matches!(err, ApiError::RateLimited));
        assert_eq!(err.to_string(), "rate limited: please wait and try again");
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/cloud/ssh");
                then.status(502).body("<html>Bad Gateway</html>");
            })
            .await;

        let err = client_for(&server, "t").get("/v1/cloud/ssh").await.unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn delete_without_token_sends_no_authorization() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(DELETE)
                    .path("/v1/cloud/servers/7")
                    .matches(|req| {
                        req.headers.as_ref().map_or(true, |headers| {
                            headers
                                .iter()
                                .all(|(name, _)| !name.eq_ignore_ascii_case("authorization"))
                        })
                    });
                then.status(401).body("");
            })
            .await;

        let err = client_for(&server, "").delete("/v1/cloud/servers/7").await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn post_ticket_and_extract_id() {
        #[derive(Deserialize)]
        struct Created {
            id: u64,
            subject: String,
            status: String,
        }

        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/support/tickets")
                    .json_body(json!({"subject": "x", "message": "y"}));
                then.status(200).json_body(json!({
                    "success": true,
                    "message": "ok",
                    "data": {"id": 42, "subject": "x", "status": "open"}
                }));
            })
            .await;

        let envelope = client_for(&server, "t")
            .post("/v1/support/tickets", &json!({"subject": "x", "message": "y"}))
            .await
            .unwrap();
        let ticket: Created = extract(&envelope).unwrap();

        mock.assert_async().await;
        assert_eq!(ticket.id, 42);
        assert_eq!(ticket.subject, "x");
        assert_eq!(ticket.status, "open");
    }

    #[tokio::test]
    async fn put_empty_sends_no_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT).path("/v1/cloud/servers/3/power/on").body("");
                then.status(200).json_body(json!({"success": true, "message": "powering on"}));
            })
            .await;

        let envelope = client_for(&server, "t")
            .put_empty("/v1/cloud/servers/3/power/on")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(envelope.data, Value::Null);
    }

    #[tokio::test]
    async fn slow_server_surfaces_as_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/cloud/volumes");
                then.status(200)
                    .delay(Duration::from_secs(2))
                    .json_body(json!({"success": true, "message": "", "data": []}));
            })
            .await;

        let client =
            ApiClient::with_timeout(&config_for(&server, "t"), Duration::from_millis(200)).unwrap();
        let err = client.get("/v1/cloud/volumes").await.unwrap_err();

        assert!(matches!(err, ApiError::Transport(_)));
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let config = Config {
            token: String::new(),
            base_url: "http://127.0.0.1:1".to_string(),
        };
        let err = ApiClient::new(&config).unwrap().get("/v1/x").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn invalid_base_url_is_build_error() {
        let config = Config {
            token: String::new(),
            base_url: "not a url".to_string(),
        };
        let client = ApiClient::new(&config).unwrap();
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let err = rt.block_on(client.get("/v1/x")).unwrap_err();
        assert!(matches!(err, ApiError::Build(_)));
    }

    #[test]
    fn extract_reports_shape_mismatch() {
        let envelope = Envelope {
            success: true,
            message: String::new(),
            data: json!({"id": "not-a-number"}),
        };

        #[derive(Debug, Deserialize)]
        struct Item {
            #[allow(dead_code)]
            id: u64,
        }

        let err = extract::<Item>(&envelope).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn extract_treats_null_members_as_defaults() {
        #[derive(Debug, Deserialize)]
        #[serde(default)]
        struct Item {
            id: u64,
            public_ip: String,
            tags: Vec<String>,
        }

        impl Default for Item {
            fn default() -> Self {
                Self {
                    id: 0,
                    public_ip: "-".to_string(),
                    tags: Vec::new(),
                }
            }
        }

        let envelope = Envelope {
            success: true,
            message: String::new(),
            data: json!([{"id": 3, "public_ip": null, "tags": null}]),
        };
        let items: Vec<Item> = extract_list(&envelope).unwrap();
        assert_eq!(items[0].id, 3);
        assert_eq!(items[0].public_ip, "-");
        assert!(items[0].tags.is_empty());
    }

    #[test]
    fn extract_null_data_yields_defaults() {
        #[derive(Debug, Default, Deserialize)]
        #[serde(default)]
        struct Limits {
            limit: u32,
            whitelist: Vec<String>,
        }

        let envelope = Envelope {
            success: true,
            message: String::new(),
            data: Value::Null,
        };

        let limits: Limits = extract(&envelope).unwrap();
        assert_eq!(limits.limit, 0);
        assert!(limits.whitelist.is_empty());

        let maybe: Option<u64> = extract(&envelope).unwrap();
        assert_eq!(maybe, None);
        let raw: Value = extract(&envelope).unwrap();
        assert_eq!(raw, Value::Null);
    }

    #[test]
    fn envelope_null_fields_decode_as_defaults() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"success": null, "message": null, "data": null}"#).unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.message, "");

        let errors: ErrorEnvelope =
            serde_json::from_str(r#"{"success": false, "message": "bad", "errors": null}"#).unwrap();
        assert!(errors.errors.is_empty());
    }

    #[test]
    fn extract_list_of_null_is_empty() {
        let envelope = Envelope {
            success: true,
            message: String::new(),
            data: Value::Null,
        };
        let items: Vec<u64> = extract_list(&envelope).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn envelope_round_trips() {
        let envelope = Envelope {
            success: true,
            message: "done".to_string(),
            data: json!({"records": [{"id": 1, "proxy": "ACTIVE"}], "count": 1}),
        };
        let encoded = serde_json::to_string(&envelope).unwrap();
        let decoded: Envelope = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn envelope_defaults_missing_fields() {
        let envelope: Envelope = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert_eq!(envelope.message, "");
        assert_eq!(envelope.data, Value::Null);
    }
}
