// Minimal Selena example: one plain chat completion
//
// Prerequisites: Set SELENA_API_KEY environment variable
//
// Run with: cargo run --example basic_usage

use selena_sdk::{ChatRequest, Selena};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = Selena::from_env()?;

    let request = ChatRequest::new("What is the capital of France?").model("selena-pro-v1");
    let response = client.chat().completions(request).await?;

    println!("{}", response.response);

    let info = client.info();
    println!("\nSDK v{} talking to {}", info.version, info.base_url);

    Ok(())
}
