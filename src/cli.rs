use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

use davy_core::{Format, ResourceType};

use crate::config::Overrides;

/// DavyBot Market - AI agent resources CLI
///
/// Examples:
///
///   davy search "web scraping"
///
///   davy install skill://web-scraper
///
///   davy info agent://data-analyst --similar
///
///   davy publish skill ./my-skill --name my-skill --description "Does cool stuff"
#[derive(Parser, Debug)]
#[command(name = "davy")]
#[command(version, about, long_about, verbatim_doc_comment)]
pub struct Args {
    /// API URL [env: DAVYBOT_API_URL] (default: http://localhost:8000/api/v1)
    #[arg(long, value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// API key sent as a bearer token [env: DAVYBOT_API_KEY]
    #[arg(long, value_name = "KEY", global = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds [env: DAVYBOT_TIMEOUT]
    #[arg(
        long,
        value_name = "SECONDS",
        global = true,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: Option<u64>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Log requests to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            timeout_secs: self.timeout,
            insecure: self.insecure,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search for resources in the market
    Search(SearchArgs),
    /// Download and install a resource
    Install(InstallArgs),
    /// Publish a resource to the market
    Publish(PublishArgs),
    /// Show detailed information about a resource
    Info(InfoArgs),
    /// Check API health status
    Health,
}

#[derive(ClapArgs, Debug)]
pub struct SearchArgs {
    pub query: String,

    /// Filter by resource type (skill, agent, mcp, knowledge)
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub kind: Option<ResourceType>,

    /// Maximum number of results
    #[arg(short, long, default_value_t = 20)]
    pub limit: u32,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

#[derive(ClapArgs, Debug)]
pub struct InstallArgs {
    /// skill://name, skill:name, or a bare ID or name
    #[arg(value_name = "RESOURCE_URI")]
    pub uri: String,

    /// Package format (zip, python)
    #[arg(short, long, default_value_t = Format::Zip)]
    pub format: Format,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    /// Install in development mode (accepted, has no effect)
    #[arg(long)]
    pub dev: bool,
}

#[derive(ClapArgs, Debug)]
pub struct PublishArgs {
    /// Resource type (skill, agent, mcp, knowledge)
    #[arg(value_name = "TYPE")]
    pub kind: ResourceType,

    /// Directory, .zip or .tar.gz holding the resource files
    pub path: PathBuf,

    /// Resource name
    #[arg(short, long)]
    pub name: String,

    /// Resource description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Author name
    #[arg(short, long)]
    pub author: Option<String>,

    /// Resource tag (can be used multiple times)
    #[arg(short, long = "tags", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Path to a JSON metadata file
    #[arg(short, long, value_name = "FILE")]
    pub metadata: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct InfoArgs {
    /// skill://name, skill:name, or a bare ID or name
    #[arg(value_name = "RESOURCE_URI")]
    pub uri: String,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Show similar resources
    #[arg(short, long)]
    pub similar: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
