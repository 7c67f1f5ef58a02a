//! Client SDK and CLI for the DavyBot resource marketplace.
//!
//! The marketplace hosts four kinds of resources: skills, agents, MCP
//! servers and knowledge bases. [`Client`] wraps its REST API, decoding
//! responses into the typed records of [`davy_core`]. [`install`] downloads
//! and unpacks artifacts, and [`bundle`] gathers files for publishing.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use davy::{install, Client, Config, InstallRequest};
//! use davy::{Format, ResourceType};
//!
//! # async fn example() -> davy::Result<()> {
//! let client = Client::new(&Config::load(&Default::default()))?;
//!
//! let installed = install(
//!     &client,
//!     &InstallRequest {
//!         kind: ResourceType::Skill,
//!         id: "web-scraper",
//!         format: Format::Zip,
//!         version: None,
//!         output: Path::new("./skills"),
//!     },
//! )
//! .await?;
//! println!("{} ({} entries)", installed.path.display(), installed.extracted.unwrap_or(0));
//! # Ok(())
//! # }
//! ```

pub mod bundle;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod exit;
pub mod install;

pub use client::{Artifact, Client, Resources};
pub use config::Config;
pub use error::{Error, Result};
pub use exit::ExitStatus;
pub use install::{install, InstallRequest, Installed};

pub use davy_core::{
    AverageRating, DecodeError, Format, NewResource, Rating, Resource, ResourceListResponse,
    ResourceType, ResourceUpdate, SearchRequest, SearchResult,
};
