use std::io::{self, Write};

use davy_core::{Resource, SearchResult};

use crate::cli::{InfoArgs, OutputFormat};
use crate::client::Client;
use crate::error::{Error, Result};

use super::locate;

const SIMILAR_LIMIT: u32 = 5;

pub async fn run(client: &Client, args: InfoArgs) -> Result<()> {
    let (kind, id) = locate(client, &args.uri).await?;
    let resource = client.get(kind, &id).await?;

    if args.output == OutputFormat::Json {
        let json = serde_json::to_string_pretty(&resource)
            .map_err(|e| Error::Internal(e.to_string()))?;
        println!("{json}");
        return Ok(());
    }

    let similar = if args.similar {
        Some(client.find_similar(&id, SIMILAR_LIMIT).await)
    } else {
        None
    };

    render(&resource, &id, similar.as_ref(), &mut io::stdout().lock())?;
    Ok(())
}

fn render(
    resource: &Resource,
    id: &str,
    similar: Option<&Result<SearchResult>>,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(out, "{}", resource.name)?;
    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(out, "Type:        {}", resource.kind)?;
    writeln!(out, "Version:     {}", resource.version)?;
    writeln!(out, "Author:      {}", resource.author.as_deref().unwrap_or("Unknown"))?;
    writeln!(out, "Rating:      {:.1}/5.0", resource.rating)?;
    writeln!(out, "Downloads:   {}", resource.downloads)?;
    if let Some(created) = resource.created_at {
        writeln!(out, "Created:     {created}")?;
    }
    if let Some(updated) = resource.updated_at {
        writeln!(out, "Updated:     {updated}")?;
    }
    writeln!(out)?;

    if let Some(description) = resource.description.as_deref().filter(|d| !d.is_empty()) {
        writeln!(out, "Description:")?;
        writeln!(out, "{description}")?;
        writeln!(out)?;
    }

    if !resource.tags.is_empty() {
        writeln!(out, "Tags:")?;
        writeln!(out, "{}", resource.tags.join(", "))?;
        writeln!(out)?;
    }

    if !resource.extra_metadata.is_empty() {
        writeln!(out, "Metadata:")?;
        let metadata = serde_json::to_string_pretty(&resource.extra_metadata)
            .map_err(io::Error::other)?;
        writeln!(out, "{metadata}")?;
        writeln!(out)?;
    }

    writeln!(out, "Installation:")?;
    writeln!(out, "  davy install {}", resource.uri())?;
    writeln!(out, "  # or by ID:")?;
    writeln!(out, "  davy install {id}")?;

    if let Some(similar) = similar {
        writeln!(out)?;
        writeln!(out, "Similar Resources:")?;
        match similar {
            Ok(found) if found.is_empty() => writeln!(out, "  No similar resources found.")?,
            Ok(found) => {
                for (i, other) in found.results.iter().enumerate() {
                    writeln!(
                        out,
                        "{}. {} ({}) - {:.1}",
                        i + 1,
                        other.name,
                        other.kind,
                        other.rating
                    )?;
                }
            }
            Err(e) => writeln!(out, "  Could not fetch similar resources: {e}")?,
        }
    }
    Ok(())
}
