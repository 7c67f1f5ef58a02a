use std::io::{self, Write};

use davy_core::{SearchRequest, SearchResult};

use crate::cli::{OutputFormat, SearchArgs};
use crate::client::Client;
use crate::error::{Error, Result};

use super::ellipsize;

pub async fn run(client: &Client, args: SearchArgs) -> Result<()> {
    let mut request = SearchRequest::new(args.query.as_str()).limit(args.limit);
    if let Some(kind) = args.kind {
        request = request.kind(kind);
    }

    let result = client.search(&request).await?;

    let mut out = io::stdout().lock();
    match args.output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| Error::Internal(e.to_string()))?;
            writeln!(out, "{json}")?;
        }
        OutputFormat::Table => render(&result, &args.query, &mut out)?,
    }
    Ok(())
}

fn render(result: &SearchResult, query: &str, out: &mut impl Write) -> io::Result<()> {
    if result.is_empty() {
        return writeln!(out, "No results found.");
    }

    writeln!(out, "Found {} results for '{}':", result.total, query)?;
    writeln!(out)?;

    for (i, resource) in result.results.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, resource.name)?;
        writeln!(out, "   Type: {}", resource.kind)?;
        if let Some(description) = resource.description.as_deref().filter(|d| !d.is_empty()) {
            writeln!(out, "   Description: {}", ellipsize(description, 80))?;
        }
        writeln!(
            out,
            "   Rating: {:.1} | Downloads: {}",
            resource.rating, resource.downloads
        )?;
        if !resource.tags.is_empty() {
            let tags: Vec<&str> = resource.tags.iter().take(5).map(String::as_str).collect();
            writeln!(out, "   Tags: {}", tags.join(", "))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rendered(value: serde_json::Value) -> String {
        let result = SearchResult::from_json(value, None).unwrap();
        let mut out = Vec::new();
        render(&result, "scraper", &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(rendered(json!({"results": [], "total": 7})), "No results found.\n");
    }

    #[test]
    fn test_render_results() {
        let text = rendered(json!({
            "results": [{
                "id": "1",
                "name": "web-scraper",
                "type": "skill",
                "description": "x".repeat(100),
                "rating": 4.3,
                "downloads": 12,
                "tags": ["a", "b", "c", "d", "e", "f"]
            }],
            "total": 1
        }));

        assert!(text.starts_with("Found 1 results for 'scraper':\n\n1. web-scraper\n"));
        assert!(text.contains("   Type: skill\n"));
        assert!(text.contains(&format!("   Description: {}...\n", "x".repeat(80))));
        assert!(text.contains("   Rating: 4.3 | Downloads: 12\n"));
        assert!(text.contains("   Tags: a, b, c, d, e\n"));
    }
}
