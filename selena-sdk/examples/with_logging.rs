// Logging example: switch log levels at runtime and inspect errors
//
// Prerequisites: Set SELENA_API_KEY environment variable
//
// Run with: cargo run --example with_logging

use selena_sdk::{ChatRequest, ErrorKind, LogLevel, Selena};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api_key = std::env::var("SELENA_API_KEY")?;

    let client = Selena::builder()
        .api_key(api_key)
        .log_level(LogLevel::Info)
        .build()?;

    // Info level: request start/finish only
    let response = client
        .chat()
        .completions(ChatRequest::new("Say hello in three languages."))
        .await?;
    println!("{}\n", response.response);

    // Debug level: full HTTP exchange, including timings
    client.set_log_level(LogLevel::Debug);
    client
        .chat()
        .completions(ChatRequest::new("Give me one fun fact."))
        .await?;

    // Invalid input is rejected before any request is made
    client.set_log_level(LogLevel::Error);
    match client.chat().completions(ChatRequest::new("")).await {
        Err(e) if e.kind() == ErrorKind::Validation => {
            println!("Rejected locally: {} (field: {:?})", e, e.field());
        }
        other => println!("Unexpected result: {:?}", other.map(|r| r.response)),
    }

    println!("\n{:?}", client.info());

    Ok(())
}
