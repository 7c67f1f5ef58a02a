use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::fields::Fields;
use crate::request::Format;
use crate::DecodeError;

/// Version reported for resources that do not carry one.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// The four kinds of resource hosted by the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Skill,
    Agent,
    Mcp,
    Knowledge,
}

impl ResourceType {
    /// Every kind, in display order.
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Skill,
        ResourceType::Agent,
        ResourceType::Mcp,
        ResourceType::Knowledge,
    ];

    /// The wire name (`skill`, `agent`, `mcp`, `knowledge`).
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Skill => "skill",
            ResourceType::Agent => "agent",
            ResourceType::Mcp => "mcp",
            ResourceType::Knowledge => "knowledge",
        }
    }

    /// The collection segment used in API paths (`/{type}s`).
    pub fn collection(self) -> &'static str {
        match self {
            ResourceType::Skill => "skills",
            ResourceType::Agent => "agents",
            ResourceType::Mcp => "mcps",
            ResourceType::Knowledge => "knowledges",
        }
    }

    /// Human-readable name for messages.
    pub fn label(self) -> &'static str {
        match self {
            ResourceType::Skill => "skill",
            ResourceType::Agent => "agent",
            ResourceType::Mcp => "MCP server",
            ResourceType::Knowledge => "knowledge base",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known resource type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource type `{0}` (expected one of: skill, agent, mcp, knowledge)")]
pub struct ParseResourceTypeError(pub String);

impl FromStr for ResourceType {
    type Err = ParseResourceTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseResourceTypeError(s.to_string()))
    }
}

/// A marketplace resource: a skill, agent, MCP server or knowledge base.
///
/// Built from API responses by [`Resource::from_json`], which also backs
/// the `Deserialize` impl. Fields the client does not model are kept in
/// [`extra_metadata`](Resource::extra_metadata).
///
/// # Example
///
/// ```
/// use davy_core::{Resource, ResourceType};
/// use serde_json::json;
///
/// let resource: Resource = serde_json::from_value(json!({
///     "id": "abc123",
///     "name": "web-scraper",
///     "type": "skill",
///     "metadata": {"language": "python"},
///     "created_at": "2025-01-22T10:00:00Z"
/// }))
/// .unwrap();
///
/// assert_eq!(resource.kind, ResourceType::Skill);
/// assert_eq!(resource.version, "1.0.0");
/// assert_eq!(resource.extra_metadata["language"], "python");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Resource {
    /// Server-assigned identifier. Opaque, may contain `/`.
    pub id: String,
    /// Display name. Not guaranteed to be unique.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub description: Option<String>,
    pub author: Option<String>,
    pub version: String,
    pub tags: Vec<String>,
    /// Open metadata, also accepted from the API under `metadata`.
    pub extra_metadata: Map<String, Value>,
    pub downloads: u64,
    /// Average score in `[0, 5]`.
    pub rating: f64,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl Resource {
    /// Decodes a resource from a raw API payload.
    ///
    /// `kind` is used when the payload carries no `type` field, which is
    /// the case for some per-collection endpoints.
    pub fn from_json(value: Value, kind: Option<ResourceType>) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(value, "a resource")?;

        let id = fields.required_str("id")?;
        let name = fields.required_str("name")?;
        let kind = match fields.optional_str("type")? {
            Some(raw) => raw.parse::<ResourceType>().map_err(|_| DecodeError::UnknownType(raw))?,
            None => kind.ok_or(DecodeError::MissingField("type"))?,
        };
        let description = fields.optional_str("description")?;
        let author = fields.optional_str("author")?;
        let version = fields
            .optional_str("version")?
            .unwrap_or_else(|| DEFAULT_VERSION.to_string());
        let tags = fields.string_list("tags")?;
        let downloads = fields.u64_or("downloads", 0)?;
        let rating = fields.f64_or("rating", 0.0)?;
        let created_at = fields.timestamp("created_at")?;
        let updated_at = fields.timestamp("updated_at")?;

        // `metadata` is only a rename when `extra_metadata` is absent;
        // otherwise it stays behind as an ordinary extra field.
        let mut extra_metadata = match fields.object("extra_metadata")? {
            Some(map) => map,
            None => fields.object("metadata")?.unwrap_or_default(),
        };
        for (key, value) in fields.into_rest() {
            extra_metadata.entry(key).or_insert(value);
        }

        Ok(Self {
            id,
            name,
            kind,
            description,
            author,
            version,
            tags,
            extra_metadata,
            downloads,
            rating,
            created_at,
            updated_at,
        })
    }

    /// The `type://name` reference for this resource.
    pub fn uri(&self) -> String {
        format!("{}://{}", self.kind, self.name)
    }

    /// File name for a downloaded artifact: `{name}-{version}.{ext}`.
    ///
    /// Path separators in the name or version are replaced so the result
    /// is always a single path component.
    pub fn artifact_file_name(&self, format: Format) -> String {
        let stem = format!("{}-{}", self.name, self.version);
        let stem: String = stem
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
            .collect();
        let stem = if stem.trim_matches('.').is_empty() {
            "resource".to_string()
        } else {
            stem
        };
        format!("{}.{}", stem, format.extension())
    }
}

impl TryFrom<Value> for Resource {
    type Error = DecodeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Resource::from_json(value, None)
    }
}
