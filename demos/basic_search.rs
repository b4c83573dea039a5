//! Basic search example.
//!
//! This example shows how to run a web search.
//!
//! Run with: `PARALLEL_API_KEY=your-key cargo run --example basic_search`

use parallel::{Client, SearchRequest};

#[tokio::main]
async fn main() -> Result<(), parallel::Error> {
    // Reads PARALLEL_API_KEY (and optionally PARALLEL_BASE_URL)
    let client = Client::from_env()?;

    let response = client
        .search(SearchRequest {
            objective: "Find the latest news on AI.".into(),
            search_queries: vec!["latest AI news".into()],
            max_results: 5,
            max_chars_per_result: 1500,
        })
        .await?;

    println!("Search ID: {}", response.search_id);
    for (i, result) in response.results.iter().enumerate() {
        println!("{}. {} ({})", i + 1, result.title, result.url);
        for excerpt in &result.excerpts {
            println!("     {}", excerpt);
        }
    }

    Ok(())
}
