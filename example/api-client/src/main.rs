//! SDK example for the DavyBot marketplace
//!
//! Walks through search, listing, details, ratings and similar resources
//! using `davy::Client`.
//!
//! Usage:
//!   cargo run -p api-client [--url http://localhost:8000/api/v1]

use davy::config::{Config, Overrides};
use davy::{Client, SearchRequest};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let api_url = std::env::args().skip_while(|arg| arg != "--url").nth(1);
    let config = Config::load(&Overrides {
        api_url,
        ..Default::default()
    });

    println!("DavyBot Market SDK Demo");
    println!("=======================\n");
    println!("Connecting to: {}\n", config.api_url);

    let client = Client::new(&config)?;

    // 1. Health
    println!("1. Checking health...\n");
    let health = client.health().await?;
    println!("   {}\n", serde_json::Value::Object(health));

    // 2. List skills
    println!("2. Listing skills...\n");
    let page = client.skills().list(0, 10).await?;
    println!(
        "   Found {} skill(s) (page {}, {} per page):\n",
        page.total, page.page, page.page_size
    );
    for skill in &page.items {
        println!("   - {} v{} [{}]", skill.name, skill.version, skill.id);
        if let Some(description) = &skill.description {
            println!("     {}", description);
        }
    }
    println!();

    // 3. Search
    println!("3. Searching for \"data\"...\n");
    let found = client.search(&SearchRequest::new("data").limit(5)).await?;
    for resource in &found.results {
        println!(
            "   - {} ({:.1}, {} downloads)",
            resource.uri(),
            resource.rating,
            resource.downloads
        );
    }
    println!();

    // Pick the first hit for further demo
    let Some(first) = found.results.first() else {
        println!("No resources found in the market.");
        return Ok(());
    };

    // 4. Details
    println!("4. Getting details for '{}'...\n", first.id);
    let details = client.get(first.kind, &first.id).await?;
    println!("   Name: {}", details.name);
    println!("   Type: {}", details.kind.label());
    println!("   Author: {}", details.author.as_deref().unwrap_or("Unknown"));
    if !details.tags.is_empty() {
        println!("   Tags: {}", details.tags.join(", "));
    }
    if let Some(created) = details.created_at {
        println!("   Created: {}", created);
    }
    println!();

    // 5. Ratings
    println!("5. Ratings...\n");
    let average = client.average_rating(&details.id).await?;
    println!(
        "   Average {:.2} over {} rating(s)",
        average.average_rating, average.total_ratings
    );
    for rating in client.ratings(&details.id, 0, 5).await? {
        println!(
            "   - {}/5 {}",
            rating.score,
            rating.comment.as_deref().unwrap_or("")
        );
    }
    println!();

    // 6. Similar
    println!("6. Similar resources...\n");
    let similar = client.find_similar(&details.id, 3).await?;
    for resource in &similar.results {
        println!("   - {}", resource.uri());
    }

    println!("\nDone!");
    Ok(())
}
