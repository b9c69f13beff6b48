//! # Quarry CLI Entry Point
//!
//! Issues single requests through the quarry client and prints the decoded
//! response as JSON on stdout. Logs go to stderr so the output can be piped
//! straight into `jq`.
//!
//! ## Usage
//!
//! ```bash
//! # Cluster health from the default endpoint (localhost:9200)
//! quarry call GET _cluster/health
//!
//! # Index a document, refreshing immediately
//! quarry call -u localhost:9200 PUT tweets/tweet/1 -d '{"user": "dan"}' -p refresh=true
//!
//! # Round-robin over two hosts, one of them speaking RPC
//! quarry call -u search-1:9200 -u search-2:9500 GET tweets/_search
//!
//! # Show how base URLs resolve
//! quarry endpoints localhost:9550 https://search-1
//! ```
//!
//! When no `-u` is given, the comma-separated `QUARRY_URL` environment
//! variable is used, then `localhost:9200`.

use std::time::Duration;

use anyhow::{Context, Result};
use argh::FromArgs;
use quarry_client::{Client, RequestOptions};
use quarry_common::{Endpoint, Method};

/// Environment variable consulted when no base URL is given.
const URL_ENV: &str = "QUARRY_URL";

#[derive(FromArgs)]
/// quarry - blocking search engine client
struct Cli {
    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Call(CallArgs),
    Endpoints(EndpointsArgs),
}

#[derive(FromArgs)]
#[argh(subcommand, name = "call")]
/// issue one request and print the response as JSON
struct CallArgs {
    /// base URL, [scheme://]host[:port][/path]; repeat for a round-robin pool
    #[argh(option, short = 'u', long = "url")]
    urls: Vec<String>,

    /// request verb (GET, PUT, POST, DELETE, HEAD, OPTIONS, PATCH)
    #[argh(positional)]
    method: String,

    /// resource path relative to the base URL
    #[argh(positional, default = "String::new()")]
    path: String,

    /// request body as JSON
    #[argh(option, short = 'd', long = "data")]
    data: Option<String>,

    /// raw request body, sent without re-encoding (e.g. bulk payloads)
    #[argh(option, short = 'r', long = "raw")]
    raw: Option<String>,

    /// query parameter as key=value; repeatable
    #[argh(option, short = 'p', long = "param")]
    params: Vec<String>,

    /// request header as key=value; repeatable
    #[argh(option, short = 'H', long = "header")]
    headers: Vec<String>,

    /// per-request timeout in seconds (default 30)
    #[argh(option, short = 't', long = "timeout")]
    timeout_secs: Option<u64>,

    /// exit non-zero when the response status is 400 or above
    #[argh(switch, long = "raise")]
    raise: bool,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "endpoints")]
/// show the endpoint and path prefix each base URL resolves to
struct EndpointsArgs {
    /// base URLs to resolve
    #[argh(positional)]
    urls: Vec<String>,
}

fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // Default to WARN so stdout stays clean; RUST_LOG overrides
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Call(args) => run_call(args),
        Commands::Endpoints(args) => run_endpoints(args),
    }
}

fn run_call(args: CallArgs) -> Result<()> {
    let method: Method = args.method.parse()?;
    let urls = resolve_urls(args.urls, std::env::var(URL_ENV).ok());
    tracing::debug!(?urls, %method, path = %args.path, "Resolved call");

    let mut builder = Client::builder().urls(urls).raise_on_error(args.raise);
    if let Some(secs) = args.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let client = builder.build().context("Failed to set up client")?;

    let mut options = RequestOptions::new();
    match (args.data, args.raw) {
        (Some(_), Some(_)) => anyhow::bail!("--data and --raw cannot be combined"),
        (Some(data), None) => {
            let body: serde_json::Value = serde_json::from_str(&data)
                .map_err(|e| anyhow::anyhow!("Invalid JSON in --data: {}", e))?;
            options = options.with_data(body);
        }
        (None, Some(raw)) => options = options.with_data(raw),
        (None, None) => {}
    }
    for param in &args.params {
        let (key, value) = parse_pair(param, "--param")?;
        options = options.with_param(key, value);
    }
    for header in &args.headers {
        let (key, value) = parse_pair(header, "--header")?;
        options = options.with_header(key, value);
    }

    let result = client.request(method, args.path, options)?;

    // Output raw JSON to stdout
    println!("{}", result);

    Ok(())
}

fn run_endpoints(args: EndpointsArgs) -> Result<()> {
    for url in &args.urls {
        let (endpoint, path) = Endpoint::parse(url)?;
        println!("{}", describe(url, &endpoint, path.as_str()));
    }
    Ok(())
}

fn describe(url: &str, endpoint: &Endpoint, path: &str) -> serde_json::Value {
    serde_json::json!({
        "url": url,
        "scheme": endpoint.scheme.as_str(),
        "host": endpoint.host,
        "port": endpoint.port,
        "path": path,
    })
}

/// Command-line URLs win; otherwise the comma-separated environment value.
/// An empty result lets the client fall back to its default URL.
fn resolve_urls(cli_urls: Vec<String>, env_value: Option<String>) -> Vec<String> {
    if !cli_urls.is_empty() {
        return cli_urls;
    }
    env_value
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_pair(pair: &str, flag: &str) -> Result<(String, String)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => anyhow::bail!("Invalid {} '{}': expected key=value", flag, pair),
    }
}
