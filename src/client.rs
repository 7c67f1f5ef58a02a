//! HTTP client for the marketplace API.
//!
//! One [`Client`] is one session: a single `reqwest` connection pool
//! configured with the base URL, credential, timeout and TLS policy. The
//! pool is released when the client is dropped.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{RequestBuilder, Response};
use serde_json::{Map, Value};
use tracing::debug;

use davy_core::{
    AverageRating, DecodeError, Format, NewRating, NewResource, Rating, Resource,
    ResourceListResponse, ResourceType, ResourceUpdate, SearchRequest, SearchResult,
};

use crate::config::Config;
use crate::error::{Error, Result};

/// Client for the DavyBot marketplace API.
///
/// # Example
///
/// ```no_run
/// use davy::{Client, Config};
/// use davy_core::SearchRequest;
///
/// # async fn example() -> davy::Result<()> {
/// let client = Client::new(&Config::default())?;
///
/// let found = client.search(&SearchRequest::new("web scraping")).await?;
/// for resource in &found.results {
///     println!("{} ({})", resource.name, resource.kind);
/// }
///
/// let skills = client.skills().list(0, 100).await?;
/// println!("{} skills", skills.total);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    service_root: String,
}

impl Client {
    /// Create a new session from a configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|_| {
                Error::InvalidInput("API key contains characters not allowed in a header".into())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .default_headers(headers)
            .user_agent(concat!("davy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            service_root: config.service_root().to_string(),
        })
    }

    /// The versioned API root requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Operations bound to one resource kind.
    pub fn resources(&self, kind: ResourceType) -> Resources<'_> {
        Resources { client: self, kind }
    }

    pub fn skills(&self) -> Resources<'_> {
        self.resources(ResourceType::Skill)
    }

    pub fn agents(&self) -> Resources<'_> {
        self.resources(ResourceType::Agent)
    }

    pub fn mcp_servers(&self) -> Resources<'_> {
        self.resources(ResourceType::Mcp)
    }

    pub fn knowledge_bases(&self) -> Resources<'_> {
        self.resources(ResourceType::Knowledge)
    }

    /// Check API health. Hits `/health` at the service root, outside the
    /// versioned API path.
    pub async fn health(&self) -> Result<Map<String, Value>> {
        let url = format!("{}/health", self.service_root);
        match self.json(self.http.get(url)).await? {
            Value::Object(status) => Ok(status),
            _ => Err(DecodeError::NotAnObject("a health status").into()),
        }
    }

    /// Search across all resources.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResult> {
        let value = self
            .json(self.http.post(self.url("/search")).json(request))
            .await?;
        Ok(SearchResult::from_json(value, request.kind)?)
    }

    /// List one page of a collection.
    pub async fn list(
        &self,
        kind: ResourceType,
        skip: u32,
        limit: u32,
    ) -> Result<ResourceListResponse> {
        let url = self.url(&format!("/{}", kind.collection()));
        let value = self
            .json(self.http.get(url).query(&[("skip", skip), ("limit", limit)]))
            .await?;
        Ok(ResourceListResponse::from_json(value, Some(kind))?)
    }

    /// Get a resource by ID.
    pub async fn get(&self, kind: ResourceType, id: &str) -> Result<Resource> {
        let url = self.url(&resource_path(kind, id));
        let value = self.json(self.http.get(url)).await?;
        Ok(Resource::from_json(value, Some(kind))?)
    }

    /// Publish a new resource.
    pub async fn create(&self, kind: ResourceType, resource: &NewResource) -> Result<Resource> {
        let url = self.url(&format!("/{}", kind.collection()));
        let value = self.json(self.http.post(url).json(resource)).await?;
        Ok(Resource::from_json(value, Some(kind))?)
    }

    /// Apply a partial update. Only the fields set in `update` are sent.
    pub async fn update(
        &self,
        kind: ResourceType,
        id: &str,
        update: &ResourceUpdate,
    ) -> Result<Resource> {
        let url = self.url(&resource_path(kind, id));
        let value = self.json(self.http.put(url).json(update)).await?;
        Ok(Resource::from_json(value, Some(kind))?)
    }

    pub async fn delete(&self, kind: ResourceType, id: &str) -> Result<()> {
        let url = self.url(&resource_path(kind, id));
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    /// Start downloading a resource artifact. Redirects are followed.
    pub async fn download(
        &self,
        kind: ResourceType,
        id: &str,
        format: Format,
        version: Option<&str>,
    ) -> Result<Artifact> {
        let url = self.url(&format!("{}/download", resource_path(kind, id)));
        let mut query = vec![("format", format.as_str())];
        if let Some(version) = version {
            query.push(("version", version));
        }
        let response = self.send(self.http.get(url).query(&query)).await?;
        Ok(Artifact { response })
    }

    /// Rate a resource. `score` is expected to be 1-5.
    pub async fn rate(&self, id: &str, score: i64, comment: Option<&str>) -> Result<Rating> {
        let url = self.url(&format!("/resources/{}/ratings", encode_id(id)));
        let body = NewRating {
            score,
            comment: comment.map(str::to_string),
        };
        let value = self.json(self.http.post(url).json(&body)).await?;
        Ok(serde_json::from_value(value).map_err(DecodeError::from)?)
    }

    /// Ratings for a resource, in server order.
    pub async fn ratings(&self, id: &str, skip: u32, limit: u32) -> Result<Vec<Rating>> {
        let url = self.url(&format!("/resources/{}/ratings", encode_id(id)));
        let value = self
            .json(self.http.get(url).query(&[("skip", skip), ("limit", limit)]))
            .await?;
        Ok(serde_json::from_value(value).map_err(DecodeError::from)?)
    }

    pub async fn average_rating(&self, id: &str) -> Result<AverageRating> {
        let url = self.url(&format!("/resources/{}/ratings/avg", encode_id(id)));
        let value = self.json(self.http.get(url)).await?;
        Ok(serde_json::from_value(value).map_err(DecodeError::from)?)
    }

    /// Resources similar to `id`, ranked by the server.
    pub async fn find_similar(&self, id: &str, limit: u32) -> Result<SearchResult> {
        let url = self.url(&format!("/search/similar/{}", encode_id(id)));
        let value = self.json(self.http.get(url).query(&[("limit", limit)])).await?;
        Ok(SearchResult::from_json(value, None)?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and classify its status. Only success responses are
    /// returned; the body of a failed response is read for a message but
    /// never decides the error kind.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = request.build()?;
        debug!("{} {}", request.method(), request.url());

        let response = self.http.execute(request).await?;
        let status = response.status();
        debug!("-> {}", status);

        if status.is_success() {
            return Ok(response);
        }

        let message = error_message(response).await;
        Err(Error::from_status(status, message))
    }

    async fn json(&self, request: RequestBuilder) -> Result<Value> {
        let response = self.send(request).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body).map_err(DecodeError::from)?)
    }
}

/// Operations on one kind of resource, e.g. `client.skills()`.
#[derive(Debug, Clone, Copy)]
pub struct Resources<'a> {
    client: &'a Client,
    kind: ResourceType,
}

impl Resources<'_> {
    pub fn kind(&self) -> ResourceType {
        self.kind
    }

    pub async fn list(&self, skip: u32, limit: u32) -> Result<ResourceListResponse> {
        self.client.list(self.kind, skip, limit).await
    }

    pub async fn get(&self, id: &str) -> Result<Resource> {
        self.client.get(self.kind, id).await
    }

    pub async fn create(&self, resource: &NewResource) -> Result<Resource> {
        self.client.create(self.kind, resource).await
    }

    pub async fn update(&self, id: &str, update: &ResourceUpdate) -> Result<Resource> {
        self.client.update(self.kind, id, update).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(self.kind, id).await
    }

    pub async fn download(
        &self,
        id: &str,
        format: Format,
        version: Option<&str>,
    ) -> Result<Artifact> {
        self.client.download(self.kind, id, format, version).await
    }
}

/// A downloaded artifact whose body has not been read yet.
#[derive(Debug)]
pub struct Artifact {
    response: Response,
}

impl Artifact {
    /// Size announced by the server, if any.
    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    /// Next piece of the body, or `None` once it is exhausted.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        Ok(self.response.chunk().await?)
    }

    /// The whole body.
    pub async fn bytes(self) -> Result<Bytes> {
        Ok(self.response.bytes().await?)
    }
}

/// Percent-encode an ID for use as a single path segment.
fn encode_id(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

fn resource_path(kind: ResourceType, id: &str) -> String {
    format!("/{}/{}", kind.collection(), encode_id(id))
}

/// Best-effort human message from an error body.
async fn error_message(response: Response) -> String {
    let Ok(text) = response.text().await else {
        return String::new();
    };

    if let Ok(Value::Object(body)) = serde_json::from_str::<Value>(&text) {
        for key in ["detail", "error", "message"] {
            match body.get(key) {
                Some(Value::String(message)) => return message.clone(),
                Some(Value::Null) | None => {}
                Some(other) => return truncate(&other.to_string()),
            }
        }
    }

    truncate(text.trim())
}

fn truncate(text: &str) -> String {
    const MAX: usize = 200;
    match text.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
