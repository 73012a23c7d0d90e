// Streaming example: print tokens as they are parsed from the response
//
// Prerequisites: Set SELENA_API_KEY environment variable
//
// Run with: cargo run --example streaming

use selena_sdk::{ChatRequest, Selena};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Selena Streaming Example\n");

    let client = Selena::from_env()?;

    let token_count = Arc::new(AtomicUsize::new(0));
    let token_count_clone = Arc::clone(&token_count);

    let question = "Explain artificial intelligence in two paragraphs.";
    println!("> {}\n", question);

    let request = ChatRequest::new(question)
        .stream(true)
        .on_token(move |token| {
            print!("{}", token);
            let _ = std::io::stdout().flush();
            token_count_clone.fetch_add(1, Ordering::Relaxed);
        });

    let start = Instant::now();
    let response = client.chat().completions(request).await?;

    println!("\n\n{}", "=".repeat(60));
    println!(
        "  {} tokens, {} chars in {:.2}s",
        token_count.load(Ordering::Relaxed),
        response.response.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
