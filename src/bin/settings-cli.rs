use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "settings-cli")]
#[command(about = "Management CLI for the campaign settings service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:9000")]
    url: String,

    /// API key; omit when the service runs without auth.
    #[arg(short, long, env = "CAMPAIGN_SETTINGS_API_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current settings (secrets blanked)
    Get,
    /// Replace the settings with the JSON document in FILE
    Update { file: PathBuf },
    /// Show restart state and running campaigns
    Status,
    /// Ask the service to reload its settings
    Reload,
    /// List campaigns currently sending
    Campaigns,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);
    }

    let res = match cli.command {
        Commands::Get => {
            client
                .get(format!("{}/api/settings", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Update { file } => {
            let body = std::fs::read(&file)?;
            client
                .put(format!("{}/api/settings", cli.url))
                .headers(headers)
                .header(CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .await?
        }
        Commands::Status => {
            client
                .get(format!("{}/api/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Reload => {
            client
                .post(format!("{}/api/admin/reload", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Campaigns => {
            client
                .get(format!("{}/api/admin/campaigns/running", cli.url))
                .headers(headers)
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let json: Value = res.json().await.unwrap_or(Value::Null);

    if !status.is_success() {
        let message = json
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("no message");
        eprintln!("Error: API returned status {}: {}", status, message);
        std::process::exit(1);
    }

    if json.pointer("/data/needs_restart") == Some(&Value::Bool(true)) {
        eprintln!("Settings saved. Campaigns are running; restart pending until they finish.");
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
