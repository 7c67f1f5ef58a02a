use std::io::{self, Write};

use serde_json::{Map, Value};

use crate::client::Client;
use crate::error::{Error, Result};

pub async fn run(client: &Client) -> Result<()> {
    let status = client.health().await.map_err(|e| match e {
        e @ (Error::Network(_) | Error::Timeout(_)) => e,
        other => Error::Unhealthy(other.to_string()),
    })?;

    render(&status, &mut io::stdout().lock())?;
    Ok(())
}

fn render(status: &Map<String, Value>, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "[OK] API is healthy")?;
    writeln!(out, "  Status: {}", field(status, "status"))?;
    writeln!(out, "  Database: {}", field(status, "database"))
}

fn field(status: &Map<String, Value>, key: &str) -> String {
    match status.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "unknown".to_string(),
        Some(other) => other.to_string(),
    }
}
