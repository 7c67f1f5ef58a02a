use serde_json::Map;
use tracing::info;

use davy_core::NewResource;

use crate::bundle;
use crate::cli::PublishArgs;
use crate::client::Client;
use crate::error::{Error, Result};

pub async fn run(client: &Client, args: PublishArgs) -> Result<()> {
    let path = args.path.clone();
    let files = tokio::task::spawn_blocking(move || bundle::collect(&path))
        .await
        .map_err(|e| Error::Internal(format!("file collection failed: {e}")))??;

    let metadata = match &args.metadata {
        Some(path) => bundle::load_metadata(path)?,
        None => Map::new(),
    };

    eprintln!("Publishing {} '{}'...", args.kind, args.name);
    eprintln!("  Files: {}", files.len());
    if !args.tags.is_empty() {
        eprintln!("  Tags: {}", args.tags.join(", "));
    }

    let resource = NewResource {
        name: args.name,
        files,
        description: args.description,
        author: args.author,
        tags: args.tags,
        metadata,
    };
    let created = client.create(args.kind, &resource).await?;
    info!("Published {} as {}", created.uri(), created.id);

    println!("Successfully published!");
    println!("ID: {}", created.id);
    println!("Version: {}", created.version);
    Ok(())
}
