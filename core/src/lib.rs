//! Core types for the DavyBot marketplace client.
//!
//! This crate holds the wire-level data model shared by the `davy` SDK and
//! CLI: typed resources and ratings, the envelopes they arrive in, the
//! request bodies sent to the API, and the resource reference parser.
//!
//! # Overview
//!
//! - [`Resource`] - a skill, agent, MCP server or knowledge base
//! - [`SearchResult`] / [`ResourceListResponse`] - response envelopes
//! - [`Rating`] / [`AverageRating`] - user ratings
//! - [`SearchRequest`], [`NewResource`], [`ResourceUpdate`], [`NewRating`] - request bodies
//! - [`uri::resolve`] - splits `skill://name`, `agent:name` and bare ids
//!
//! Decoding is defensive: every field is type checked, missing optional
//! fields take documented defaults, unknown fields are kept, and anything
//! malformed is reported as a [`DecodeError`] rather than silently dropped.
//!
//! # Example
//!
//! ```
//! use davy_core::{ResourceType, SearchResult};
//! use serde_json::json;
//!
//! let payload = json!({
//!     "results": [
//!         {"id": "abc123", "name": "web-scraper", "type": "skill", "rating": 4.5}
//!     ],
//!     "total": 1,
//!     "query": "scraper"
//! });
//!
//! let result = SearchResult::from_json(payload, None).unwrap();
//! assert_eq!(result.results[0].kind, ResourceType::Skill);
//! assert_eq!(result.results[0].uri(), "skill://web-scraper");
//! ```

mod envelope;
mod error;
mod fields;
mod rating;
mod request;
mod resource;
pub mod timestamp;
pub mod uri;

pub use envelope::{ResourceListResponse, SearchResult};
pub use error::DecodeError;
pub use rating::{AverageRating, Rating};
pub use request::{Format, NewRating, NewResource, ParseFormatError, ResourceUpdate, SearchRequest};
pub use resource::{ParseResourceTypeError, Resource, ResourceType, DEFAULT_VERSION};
pub use uri::{resolve, ResourceUri};
