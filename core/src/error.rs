/// Errors raised while turning an API payload into a typed value.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Expected a JSON object for {0}")]
    NotAnObject(&'static str),

    #[error("Missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Field `{field}` has the wrong type (expected {expected})")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Unknown resource type: {0}")]
    UnknownType(String),

    #[error("Invalid timestamp in `{field}`: {value}")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("Element {index} of `{field}`: {source}")]
    Element {
        field: &'static str,
        index: usize,
        #[source]
        source: Box<DecodeError>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
