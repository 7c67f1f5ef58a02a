//! Parsing of user-supplied resource references.
//!
//! Three forms are understood:
//!
//! - `type://identifier` (`skill://web-scraper`)
//! - `type:identifier` for the four known kinds (`agent:data-analyst`)
//! - a bare identifier or name (`abc123-def456`)

use crate::ResourceType;

/// A resource reference split into its parts.
///
/// `kind` is the raw text before the separator and is not validated here:
/// `http://x` yields a kind of `"http"`. A `None` kind means the caller has
/// to look the identifier up by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceUri<'a> {
    pub kind: Option<&'a str>,
    pub identifier: &'a str,
}

/// Splits a resource reference into `(type, identifier)`.
///
/// Only the first separator counts; anything after it, including further
/// `://` or `:`, belongs to the identifier.
///
/// ```
/// use davy_core::uri::resolve;
///
/// let uri = resolve("skill://a://b");
/// assert_eq!(uri.kind, Some("skill"));
/// assert_eq!(uri.identifier, "a://b");
///
/// assert_eq!(resolve("mcp:github").kind, Some("mcp"));
/// assert_eq!(resolve("http:foo").kind, None);
/// ```
pub fn resolve(uri: &str) -> ResourceUri<'_> {
    if let Some((kind, identifier)) = uri.split_once("://") {
        return ResourceUri {
            kind: Some(kind),
            identifier,
        };
    }

    if let Some((prefix, identifier)) = uri.split_once(':') {
        if prefix.parse::<ResourceType>().is_ok() {
            return ResourceUri {
                kind: Some(prefix),
                identifier,
            };
        }
    }

    ResourceUri {
        kind: None,
        identifier: uri,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(uri: &str) -> (Option<&str>, &str) {
        let resolved = resolve(uri);
        (resolved.kind, resolved.identifier)
    }

    #[test]
    fn test_scheme_form_splits_on_first_separator() {
        assert_eq!(parts("skill://web-scraper"), (Some("skill"), "web-scraper"));
        assert_eq!(parts("skill://a://b"), (Some("skill"), "a://b"));
        assert_eq!(parts("agent://ns:name"), (Some("agent"), "ns:name"));
        assert_eq!(parts("knowledge://org/docs"), (Some("knowledge"), "org/docs"));
    }

    #[test]
    fn test_scheme_form_does_not_validate_kind() {
        assert_eq!(parts("http://example.com"), (Some("http"), "example.com"));
        assert_eq!(parts("://x"), (Some(""), "x"));
    }

    #[test]
    fn test_prefix_form_for_known_kinds() {
        for kind in ResourceType::ALL {
            let uri = format!("{}:some-name", kind);
            assert_eq!(parts(&uri), (Some(kind.as_str()), "some-name"));
        }
        assert_eq!(parts("mcp:a:b"), (Some("mcp"), "a:b"));
    }

    #[test]
    fn test_unknown_prefix_is_a_bare_identifier() {
        assert_eq!(parts("http:foo"), (None, "http:foo"));
        assert_eq!(parts("Skill:foo"), (None, "Skill:foo"));
        assert_eq!(parts(":foo"), (None, ":foo"));
    }

    #[test]
    fn test_bare_identifier() {
        assert_eq!(parts("abc123-def456"), (None, "abc123-def456"));
        assert_eq!(parts("web scraper"), (None, "web scraper"));
        assert_eq!(parts(""), (None, ""));
    }
}
