use connectors_http::{ClientOptions, HttpClient, RequestOptions};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = HttpClient::from_env()
        .map_err(anyhow::Error::msg)?
        .with_options(ClientOptions {
            max_retries: 2,
            ..ClientOptions::default()
        });

    let tools = client.get("/api/tools", RequestOptions::default()).await?;
    println!("tools ({}): {:?}", tools.status, tools.body);

    let result = client
        .post(
            "/api/tools/call",
            json!({"name": "search", "arguments": {"query": "rust"}}),
            RequestOptions::new().timeout_ms(10_000),
        )
        .await?;
    println!("call ({}): {:?}", result.status, result.body);

    Ok(())
}
