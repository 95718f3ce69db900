//! Transport to the PhotoSet backend functions.
//!
//! Every backend function is a single JSON-over-HTTPS endpoint that dispatches
//! on an `action` query parameter. [`Gateway`] is the seam the clients talk to;
//! [`HttpGateway`] is the reqwest implementation used by the binary.

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::{Failure, SESSION_HEADER};

use crate::config::{Config, Endpoints};
use crate::error::ClientError;

/// Backend function a request is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Auth,
    Generate,
    SaveImage,
    Images,
    Admin,
    Payment,
}

impl Service {
    pub fn name(&self) -> &'static str {
        match self {
            Service::Auth => "auth",
            Service::Generate => "generate",
            Service::SaveImage => "save_image",
            Service::Images => "images",
            Service::Admin => "admin",
            Service::Payment => "payment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

#[derive(Debug, Clone)]
pub struct Request {
    pub service: Service,
    pub method: Method,
    pub action: Option<&'static str>,
    pub query: Vec<(&'static str, String)>,
    pub token: Option<String>,
    pub body: Option<Value>,
}

impl Request {
    pub fn get(service: Service) -> Self {
        Self {
            service,
            method: Method::Get,
            action: None,
            query: Vec::new(),
            token: None,
            body: None,
        }
    }

    pub fn post(service: Service) -> Self {
        Self {
            method: Method::Post,
            ..Self::get(service)
        }
    }

    pub fn put(service: Service) -> Self {
        Self {
            method: Method::Put,
            ..Self::get(service)
        }
    }

    pub fn action(mut self, action: &'static str) -> Self {
        self.action = Some(action);
        self
    }

    pub fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    /// Attach the session token header
    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, GatewayError> {
        let value = serde_json::to_value(body).map_err(|e| GatewayError::Malformed {
            status: None,
            detail: format!("could not encode request: {}", e),
        })?;
        self.body = Some(value);
        Ok(self)
    }
}

/// Decoded 2xx response whose `success` flag was not false
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn decode<T: DeserializeOwned>(self) -> Result<T, GatewayError> {
        let status = self.status;
        serde_json::from_value(self.body).map_err(|e| GatewayError::Malformed {
            status: Some(status),
            detail: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx status or `success: false`, with whatever the body said
    #[error("rejected with status {status}")]
    Rejected { status: u16, failure: Failure },

    #[error("malformed response: {detail}")]
    Malformed { status: Option<u16>, detail: String },

    #[error("endpoint `{0}` is not configured")]
    NotConfigured(&'static str),
}

impl GatewayError {
    pub fn rejected(status: u16, failure: Failure) -> Self {
        GatewayError::Rejected { status, failure }
    }

    /// Status and body of a rejection, if this is one
    pub fn rejection(&self) -> Option<(u16, &Failure)> {
        match self {
            GatewayError::Rejected { status, failure } => Some((*status, failure)),
            _ => None,
        }
    }
}

/// Context-free mapping; clients match the cases they understand first
impl From<GatewayError> for ClientError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Transport(msg) => ClientError::Transport(msg),
            GatewayError::Rejected { status, failure } => ClientError::server(
                Some(status),
                failure.text().unwrap_or("Request failed").to_string(),
            ),
            GatewayError::Malformed { status, detail } => {
                ClientError::server(status, format!("Unexpected response: {}", detail))
            }
            GatewayError::NotConfigured(name) => ClientError::Config(format!(
                "endpoint `{}` is not configured (photoset config set endpoints.{} <url>)",
                name, name
            )),
        }
    }
}

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn call(&self, request: Request) -> Result<Reply, GatewayError>;
}

pub struct HttpGateway {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpGateway {
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("photoset/", env!("PHOTOSET_VERSION")))
            .build()
            .map_err(|e| ClientError::Config(format!("could not build HTTP client: {}", e)))?;
        Ok(Self { client, endpoints })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(config.endpoints.clone(), config.client.request_timeout())
    }

    fn base_url(&self, service: Service) -> &str {
        match service {
            Service::Auth => &self.endpoints.auth,
            Service::Generate => &self.endpoints.generate,
            Service::SaveImage => &self.endpoints.save_image,
            Service::Images => &self.endpoints.images,
            Service::Admin => &self.endpoints.admin,
            Service::Payment => &self.endpoints.payment,
        }
    }

    fn url(&self, request: &Request) -> Result<reqwest::Url, GatewayError> {
        let base = self.base_url(request.service).trim();
        if base.is_empty() {
            return Err(GatewayError::NotConfigured(request.service.name()));
        }

        let mut url = reqwest::Url::parse(base).map_err(|e| {
            GatewayError::Transport(format!("invalid {} endpoint: {}", request.service.name(), e))
        })?;
        if request.action.is_some() || !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            if let Some(action) = request.action {
                pairs.append_pair("action", action);
            }
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn call(&self, request: Request) -> Result<Reply, GatewayError> {
        let url = self.url(&request)?;

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
        };
        if let Some(token) = &request.token {
            builder = builder.header(SESSION_HEADER, token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.without_url().to_string()))?;
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| GatewayError::Transport(e.without_url().to_string()))?;

        tracing::debug!(
            service = request.service.name(),
            action = request.action.unwrap_or(""),
            status = status.as_u16(),
            "backend call"
        );

        interpret(status.as_u16(), &bytes)
    }
}

/// Body first, status second: error bodies carry the useful detail
pub(crate) fn interpret(status: u16, bytes: &[u8]) -> Result<Reply, GatewayError> {
    let ok_status = (200..300).contains(&status);

    let body: Value = if bytes.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice(bytes) {
            Ok(value) => value,
            Err(e) if ok_status => {
                return Err(GatewayError::Malformed {
                    status: Some(status),
                    detail: e.to_string(),
                })
            }
            Err(_) => {
                let text = String::from_utf8_lossy(bytes);
                let failure = Failure {
                    error: Some(text.chars().take(200).collect()),
                    ..Failure::default()
                };
                return Err(GatewayError::rejected(status, failure));
            }
        }
    };

    let flagged_failed = body.get("success") == Some(&Value::Bool(false));
    if !ok_status || flagged_failed {
        let failure = serde_json::from_value(body).unwrap_or_default();
        return Err(GatewayError::rejected(status, failure));
    }

    Ok(Reply::new(status, body))
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted in-memory gateway that records every request

    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use super::*;

    pub enum Scripted {
        Respond(Result<Reply, GatewayError>),
        Hang,
    }

    #[derive(Default)]
    pub struct FakeGateway {
        script: Mutex<HashMap<(Service, Option<&'static str>), VecDeque<Scripted>>>,
        calls: Mutex<Vec<Request>>,
    }

    impl FakeGateway {
        pub fn new() -> Self {
            Self::default()
        }

        fn push(&self, service: Service, action: Option<&'static str>, step: Scripted) {
            self.script
                .lock()
                .unwrap()
                .entry((service, action))
                .or_default()
                .push_back(step);
        }

        /// Queue a 200 reply with `success: true` merged into `body`
        pub fn ok(&self, service: Service, action: Option<&'static str>, body: Value) -> &Self {
            let mut body = body;
            if let Value::Object(map) = &mut body {
                map.insert("success".to_string(), Value::Bool(true));
            }
            self.push(service, action, Scripted::Respond(Ok(Reply::new(200, body))));
            self
        }

        pub fn fail(&self, service: Service, action: Option<&'static str>, status: u16, body: Value) -> &Self {
            let failure = serde_json::from_value(body).unwrap();
            self.push(
                service,
                action,
                Scripted::Respond(Err(GatewayError::rejected(status, failure))),
            );
            self
        }

        pub fn error(&self, service: Service, action: Option<&'static str>, err: GatewayError) -> &Self {
            self.push(service, action, Scripted::Respond(Err(err)));
            self
        }

        pub fn hang(&self, service: Service, action: Option<&'static str>) -> &Self {
            self.push(service, action, Scripted::Hang);
            self
        }

        pub fn calls(&self) -> Vec<Request> {
            self.calls.lock().unwrap().clone()
        }

        pub fn calls_to(&self, service: Service) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.service == service)
                .count()
        }
    }

    #[async_trait]
    impl Gateway for FakeGateway {
        async fn call(&self, request: Request) -> Result<Reply, GatewayError> {
            let key = (request.service, request.action);
            self.calls.lock().unwrap().push(request);
            let step = self
                .script
                .lock()
                .unwrap()
                .get_mut(&key)
                .and_then(|queue| queue.pop_front());
            match step {
                Some(Scripted::Respond(result)) => result,
                Some(Scripted::Hang) => futures::future::pending().await,
                None => Err(GatewayError::Transport(format!(
                    "no scripted response for {:?}",
                    key
                ))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_false_is_rejected_even_with_200() {
        let err = interpret(200, br#"{"success":false,"error":"nope"}"#).unwrap_err();
        let (status, failure) = err.rejection().unwrap();
        assert_eq!(status, 200);
        assert_eq!(failure.text(), Some("nope"));
    }

    #[test]
    fn test_error_body_decoded_before_status() {
        let err = interpret(
            403,
            br#"{"error":"Free generations limit reached","code":"LIMIT_EXCEEDED","free_used":3,"free_limit":3}"#,
        )
        .unwrap_err();
        let (status, failure) = err.rejection().unwrap();
        assert_eq!(status, 403);
        assert_eq!(failure.code(), Some("LIMIT_EXCEEDED"));
        assert_eq!(failure.free_limit, Some(3));
    }

    #[test]
    fn test_non_json_error_body_keeps_text() {
        let err = interpret(502, b"Bad Gateway").unwrap_err();
        assert_eq!(err.rejection().unwrap().1.text(), Some("Bad Gateway"));
    }

    #[test]
    fn test_non_json_success_is_malformed() {
        let err = interpret(200, b"<html>").unwrap_err();
        assert!(matches!(err, GatewayError::Malformed { status: Some(200), .. }));
    }

    #[test]
    fn test_reply_without_success_field_is_accepted() {
        let reply = interpret(200, br#"{"images":[]}"#).unwrap();
        assert_eq!(reply.body, json!({"images": []}));
    }

    #[test]
    fn test_empty_endpoint_is_not_configured() {
        let gateway = HttpGateway::new(Endpoints::default(), Duration::from_secs(5)).unwrap();
        let err = gateway.url(&Request::post(Service::Generate)).unwrap_err();
        assert_eq!(err, GatewayError::NotConfigured("generate"));
        let client_err = ClientError::from(err);
        assert!(matches!(client_err, ClientError::Config(_)));
    }

    #[test]
    fn test_url_carries_action_and_query() {
        let gateway = HttpGateway::new(Endpoints::default(), Duration::from_secs(5)).unwrap();
        let url = gateway
            .url(&Request::get(Service::Images).query("user_id", 7).query("limit", 100))
            .unwrap();
        assert_eq!(url.query(), Some("user_id=7&limit=100"));
        let url = gateway
            .url(&Request::get(Service::Auth).action(shared::actions::VERIFY))
            .unwrap();
        assert_eq!(url.query(), Some("action=verify"));
    }

    #[test]
    fn test_rejection_maps_to_server_error_with_message() {
        let err = GatewayError::rejected(
            500,
            Failure {
                error: Some("Database unavailable".to_string()),
                ..Failure::default()
            },
        );
        assert_eq!(
            ClientError::from(err),
            ClientError::server(Some(500), "Database unavailable")
        );
    }
}
