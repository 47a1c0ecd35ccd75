use std::process::ExitCode;

use clap::Parser;
use oxdb_client::{ClientConfig, PushClient, PushRequest};
use sonic_rs::Value;
use tracing_subscriber::EnvFilter;

/// Push one record to an ox-db server.
#[derive(Debug, Parser)]
#[command(name = "oxdb-push", version)]
struct Args {
    /// Record to store. Parsed as JSON when valid, sent as a string otherwise.
    data: String,

    /// Server root. Defaults to $OXDB_BASE_URL, then http://127.0.0.1:8000.
    #[arg(long)]
    base_url: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    key: Option<String>,

    /// Ask the server not to compute embeddings for this record.
    #[arg(long)]
    no_embeddings: bool,

    /// Metadata entry as KEY=VALUE; may be repeated.
    #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_meta)]
    metadata: Vec<(String, String)>,
}

fn parse_json_or_string(raw: &str) -> Value {
    sonic_rs::from_str(raw).unwrap_or_else(|_| Value::from(raw))
}

fn parse_meta(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    if key.is_empty() {
        return Err(format!("empty metadata key in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn client_config(base_url: Option<String>) -> ClientConfig {
    base_url
        .map(ClientConfig::new)
        .unwrap_or_else(ClientConfig::from_env)
}

fn build_request(args: Args) -> PushRequest {
    let mut request = PushRequest::new(parse_json_or_string(&args.data))
        .with_embeddings(!args.no_embeddings);
    if let Some(description) = args.description {
        request = request.with_description(description);
    }
    if let Some(key) = args.key {
        request = request.with_key(key);
    }
    for (key, value) in args.metadata {
        request = request.with_metadata(key, parse_json_or_string(&value));
    }
    request
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = Args::parse();
    let client = PushClient::with_config(client_config(args.base_url.take()));
    let request = build_request(args);

    match client.push(&request).await {
        Ok(receipt) => {
            println!("{receipt}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
