use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A single user rating of a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub id: String,
    /// The rated resource. A reference, not ownership.
    pub resource_id: String,
    pub user_id: String,
    pub score: i64,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_optional")]
    pub created_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_optional")]
    pub updated_at: Option<Timestamp>,
}

/// Aggregate rating for a resource, as computed by the server.
///
/// ```
/// use davy_core::AverageRating;
///
/// let avg: AverageRating = serde_json::from_str(r#"{
///     "resource_id": "abc123",
///     "average_rating": 4.5,
///     "total_ratings": 2,
///     "rating_distribution": {"4": 1, "5": 1}
/// }"#).unwrap();
///
/// assert_eq!(avg.rating_distribution[&5], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageRating {
    pub resource_id: String,
    pub average_rating: f64,
    pub total_ratings: u64,
    /// Score bucket to number of ratings in it.
    #[serde(default)]
    pub rating_distribution: BTreeMap<u8, u64>,
}
