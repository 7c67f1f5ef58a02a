use std::io::{self, Write};

use tracing::{debug, info};

use crate::cli::InstallArgs;
use crate::client::Client;
use crate::error::Result;
use crate::install::{install, InstallRequest, Installed};

use super::locate;

pub async fn run(client: &Client, args: InstallArgs) -> Result<()> {
    if args.dev {
        debug!("--dev has no effect");
    }

    let (kind, id) = locate(client, &args.uri).await?;
    tokio::fs::create_dir_all(&args.output).await?;

    eprintln!("Downloading {}...", kind.label());
    let installed = install(
        client,
        &InstallRequest {
            kind,
            id: &id,
            format: args.format,
            version: None,
            output: &args.output,
        },
    )
    .await?;
    info!("Installed {}://{} to {}", kind, id, installed.path.display());

    render(&installed, &mut io::stdout().lock())?;
    Ok(())
}

fn render(installed: &Installed, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Downloaded to: {}", installed.path.display())?;
    writeln!(out, "  Size: {} bytes", installed.size)?;
    writeln!(out, "  SHA-256: {}", installed.sha256)?;
    if let Some(count) = installed.extracted {
        writeln!(out, "Extracted {count} files.")?;
    }
    writeln!(out, "Installation complete!")
}
