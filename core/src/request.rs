//! Request bodies and parameters sent to the marketplace API.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ResourceType;

/// Download format for a resource artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// A zip archive of the resource files.
    #[default]
    Zip,
    /// A Python package tarball.
    Python,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Zip => "zip",
            Format::Python => "python",
        }
    }

    /// Extension of the artifact written to disk.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Zip => "zip",
            Format::Python => "tar.gz",
        }
    }

    /// Whether the artifact is unpacked after download.
    pub fn is_extracted(self) -> bool {
        matches!(self, Format::Zip)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known download format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown format `{0}` (expected one of: zip, python)")]
pub struct ParseFormatError(pub String);

impl FromStr for Format {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zip" => Ok(Format::Zip),
            "python" => Ok(Format::Python),
            other => Err(ParseFormatError(other.to_string())),
        }
    }
}

/// Body of `POST /search`.
///
/// `type` and `tags` are left out of the payload entirely when unset.
///
/// # Example
///
/// ```
/// use davy_core::{ResourceType, SearchRequest};
///
/// let request = SearchRequest::new("web scraping")
///     .kind(ResourceType::Skill)
///     .limit(5);
///
/// let body = serde_json::to_value(&request).unwrap();
/// assert_eq!(body["type"], "skill");
/// assert!(body.get("tags").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub limit: u32,
    pub offset: u32,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ResourceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: 20,
            offset: 0,
            kind: None,
            tags: None,
        }
    }

    pub fn kind(mut self, kind: ResourceType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}

/// Body of `POST /{type}s`: a new resource to publish.
///
/// `files` maps relative paths to text content. Empty optional fields are
/// not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewResource {
    pub name: String,
    pub files: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

/// Body of `PUT /{type}s/{id}`: a partial update.
///
/// Only fields that are `Some` are sent. `Some(vec![])` for `tags` sends an
/// explicit empty list, which is different from leaving tags untouched.
///
/// ```
/// use davy_core::ResourceUpdate;
///
/// let clear_tags = ResourceUpdate {
///     tags: Some(Vec::new()),
///     ..Default::default()
/// };
/// assert_eq!(serde_json::to_string(&clear_tags).unwrap(), r#"{"tags":[]}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResourceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl ResourceUpdate {
    /// True when the update would send an empty body.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.tags.is_none()
            && self.metadata.is_none()
    }
}

/// Body of `POST /resources/{id}/ratings`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRating {
    /// Expected to be 1-5; the server validates it.
    pub score: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}
