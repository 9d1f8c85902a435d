use dyn_clone::DynClone;
use parking_lot::RwLock;
use parse_display::Display;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tracing::debug;

use crate::{
    config::HearthConfig,
    error::{Result, ServiceError},
    record::{AuthSession, ListResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display(style = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub token: Option<String>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            token: None,
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

/// Sends requests to the collections backend. Non-2xx answers are returned
/// as responses, only connection level failures are errors.
pub trait Transport: DynClone + Send + Sync {
    fn send(&self, base_url: &str, request: &Request) -> Result<Response>;
}

dyn_clone::clone_trait_object!(Transport);

#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl Transport for UreqTransport {
    fn send(&self, base_url: &str, request: &Request) -> Result<Response> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), request.path);
        let mut call = self.agent.request(&request.method.to_string(), &url);

        for (key, value) in request.query.iter() {
            call = call.query(key, value);
        }

        if let Some(token) = &request.token {
            call = call.set("Authorization", token);
        }

        let result = match &request.body {
            Some(body) => call.send_json(body),
            _ => call.call(),
        };

        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(e) => return Err(ServiceError::Transport(e.to_string())),
        };

        let status = response.status();
        let text = response
            .into_string()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };

        Ok(Response { status, body })
    }
}

/// Paging, ordering and filtering of a record listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub per_page: u32,
    pub sort: Option<String>,
    pub filter: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 30,
            sort: None,
            filter: None,
        }
    }
}

/// `field="value"` with the value quoted for the backend filter syntax.
pub fn filter_eq(field: &str, value: &str) -> String {
    format!(
        "{field}=\"{}\"",
        value.replace('\\', "\\\\").replace('"', "\\\"")
    )
}

/// Handle on the collections backend. Clones share the authentication state.
#[derive(Clone)]
pub struct Client {
    base_url: String,
    transport: Box<dyn Transport>,
    auth: Arc<RwLock<Option<AuthSession>>>,
}

impl Client {
    pub fn new<T: Transport + 'static>(base_url: impl Into<String>, transport: T) -> Self {
        Self {
            base_url: base_url.into(),
            transport: Box::new(transport),
            auth: Arc::default(),
        }
    }

    pub fn from_config(config: &HearthConfig) -> Self {
        Self::new(
            config.backend_url.to_owned(),
            UreqTransport::new(config.request_timeout),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth(&self) -> Option<AuthSession> {
        self.auth.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.read().is_some()
    }

    /// Drops the local authentication, the backend keeps no session.
    pub fn logout(&self) {
        self.auth.write().take();
    }

    pub fn auth_with_password(
        &self,
        collection: &str,
        identity: &str,
        password: &str,
    ) -> Result<AuthSession> {
        let request = Request::new(
            Method::Post,
            format!("/api/collections/{collection}/auth-with-password"),
        )
        .body(json!({ "identity": identity, "password": password }));

        let session: AuthSession = serde_json::from_value(self.send(request)?)?;
        *self.auth.write() = Some(session.clone());

        Ok(session)
    }

    pub fn request_password_reset(&self, collection: &str, email: &str) -> Result<()> {
        let request = Request::new(
            Method::Post,
            format!("/api/collections/{collection}/request-password-reset"),
        )
        .body(json!({ "email": email }));

        self.send(request)?;

        Ok(())
    }

    pub fn create_record<T: DeserializeOwned>(
        &self,
        collection: &str,
        body: &impl Serialize,
    ) -> Result<T> {
        let request = Request::new(Method::Post, records_path(collection, None))
            .body(serde_json::to_value(body)?);

        Ok(serde_json::from_value(self.send(request)?)?)
    }

    pub fn get_record<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<T> {
        let request = Request::new(Method::Get, records_path(collection, Some(id)));

        Ok(serde_json::from_value(self.send(request)?)?)
    }

    pub fn list_records<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &ListQuery,
    ) -> Result<ListResult<T>> {
        let mut request = Request::new(Method::Get, records_path(collection, None))
            .query("page", query.page.to_string())
            .query("perPage", query.per_page.to_string());

        if let Some(sort) = &query.sort {
            request = request.query("sort", sort);
        }

        if let Some(filter) = &query.filter {
            request = request.query("filter", filter);
        }

        Ok(serde_json::from_value(self.send(request)?)?)
    }

    /// First record matching `filter`, if any.
    pub fn first_record<T: DeserializeOwned>(
        &self,
        collection: &str,
        filter: String,
    ) -> Result<Option<T>> {
        let query = ListQuery {
            per_page: 1,
            filter: Some(filter),
            ..ListQuery::default()
        };

        let list = self.list_records::<T>(collection, &query)?;

        Ok(list.items.into_iter().next())
    }

    pub fn update_record<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
        body: &impl Serialize,
    ) -> Result<T> {
        let request = Request::new(Method::Patch, records_path(collection, Some(id)))
            .body(serde_json::to_value(body)?);

        Ok(serde_json::from_value(self.send(request)?)?)
    }

    pub fn delete_record(&self, collection: &str, id: &str) -> Result<()> {
        let request = Request::new(Method::Delete, records_path(collection, Some(id)));
        self.send(request)?;

        Ok(())
    }

    fn send(&self, mut request: Request) -> Result<Value> {
        request.token = self.auth.read().as_ref().map(|auth| auth.token.to_owned());

        debug!(method = %request.method, path = %request.path, "backend request");

        let response = self.transport.send(&self.base_url, &request)?;

        match response.status {
            200..=299 => Ok(response.body),
            401 | 403 => Err(ServiceError::Unauthorized),
            404 => Err(ServiceError::NotFound),
            status => Err(ServiceError::Backend {
                status,
                message: response
                    .body
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unexpected backend response")
                    .to_owned(),
            }),
        }
    }
}

fn records_path(collection: &str, id: Option<&str>) -> String {
    match id {
        Some(id) => format!("/api/collections/{collection}/records/{id}"),
        _ => format!("/api/collections/{collection}/records"),
    }
}
