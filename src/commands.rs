//! CLI command handlers.
//!
//! Each handler drives the client and renders to stdout. Progress lines go
//! to stderr so `--output json` stays machine-readable.

pub mod health;
pub mod info;
pub mod install;
pub mod publish;
pub mod search;

use tracing::debug;

use davy_core::{ResourceType, SearchRequest};

use crate::cli::{Args, Command};
use crate::client::Client;
use crate::config::Config;
use crate::error::{Error, Result};

/// Run a parsed command line. The client session lives for the duration
/// of the command and is released on every exit path.
pub async fn run(args: Args) -> Result<()> {
    let config = Config::load(&args.overrides());
    debug!("Using API at {}", config.api_url);
    let client = Client::new(&config)?;

    match args.command {
        Command::Search(search) => search::run(&client, search).await,
        Command::Install(install) => install::run(&client, install).await,
        Command::Publish(publish) => publish::run(&client, publish).await,
        Command::Info(info) => info::run(&client, info).await,
        Command::Health => health::run(&client).await,
    }
}

/// Turn a resource reference into a kind and ID.
///
/// References without a type prefix are looked up by name, taking the
/// best search hit.
pub async fn locate(client: &Client, reference: &str) -> Result<(ResourceType, String)> {
    let uri = davy_core::resolve(reference);

    if let Some(kind) = uri.kind {
        let kind = kind
            .parse::<ResourceType>()
            .map_err(|e| Error::InvalidInput(e.to_string()))?;
        return Ok((kind, uri.identifier.to_string()));
    }

    eprintln!("Searching for resource: {}...", uri.identifier);
    let found = client
        .search(&SearchRequest::new(uri.identifier).limit(1))
        .await?;
    let resource = found
        .results
        .into_iter()
        .next()
        .ok_or_else(|| Error::NotFound(format!("no resource matches '{}'", uri.identifier)))?;
    eprintln!("Found: {} ({})", resource.name, resource.kind);

    Ok((resource.kind, resource.id))
}

/// Shorten `text` to `max` characters, marking the cut with `...`.
pub(crate) fn ellipsize(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
