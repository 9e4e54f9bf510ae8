//! fetch - api-dispatch demo
//!
//! Fetches a JSON document through the full api-dispatch loop:
//! 1. `Fetch` action carrying an `ApiCall` is dispatched to the store
//! 2. The reducer marks the state as loading
//! 3. `ApiMiddleware` performs the request on a detached task
//! 4. The derived `DidLoad` / `DidFail` action comes back over the channel
//!    and is dispatched like any other action
//!
//! # Usage
//!
//! ```sh
//! cargo run -p fetch-demo -- https://jsonplaceholder.typicode.com/todos/1
//!
//! # Relative URL against a base, with debug logging
//! RUST_LOG=api_dispatch_core=debug cargo run -p fetch-demo -- \
//!     --base-url https://jsonplaceholder.typicode.com /users/1
//! ```

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use api_dispatch::prelude::*;
use clap::Parser;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Fetch JSON through an api-dispatch store
#[derive(Parser, Debug)]
#[command(name = "fetch")]
#[command(about = "Fetch a URL through the api-dispatch middleware")]
struct Args {
    /// URL to fetch (absolute, or relative to --base-url)
    url: String,

    /// Base URL for relative paths
    #[arg(long)]
    base_url: Option<String>,

    /// HTTP method
    #[arg(long, short = 'X', default_value = "GET")]
    method: String,

    /// Request body (JSON)
    #[arg(long, short)]
    data: Option<String>,

    /// Extra header, as `Name: value` (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,
}

#[derive(Action, Clone, Debug)]
enum FetchAction {
    #[action(api)]
    Fetch(ApiCall<FetchAction>),
    DidLoad(Value),
    DidFail(ApiError),
}

#[derive(Debug, Default)]
struct FetchState {
    loading: bool,
    body: Option<Value>,
    error: Option<ApiError>,
}

fn reducer(state: &mut FetchState, action: FetchAction) -> bool {
    match action {
        FetchAction::Fetch(_) => {
            state.loading = true;
            state.error = None;
            true
        }
        FetchAction::DidLoad(body) => {
            state.loading = false;
            state.body = Some(body);
            true
        }
        FetchAction::DidFail(error) => {
            state.loading = false;
            state.error = Some(error);
            true
        }
    }
}

/// Invalid command-line input
#[derive(Debug, thiserror::Error)]
enum ArgsError {
    #[error("header {0:?} is not in `Name: value` form")]
    Header(String),

    #[error("invalid method {0:?}")]
    Method(String),

    #[error("--data is not valid JSON: {0}")]
    Data(#[from] serde_json::Error),
}

fn parse_header(raw: &str) -> Result<(String, String), ArgsError> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| ArgsError::Header(raw.to_string()))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

fn build_fetch(args: &Args) -> Result<FetchAction, ArgsError> {
    let method = Method::from_bytes(args.method.to_uppercase().as_bytes())
        .map_err(|_| ArgsError::Method(args.method.clone()))?;

    let mut call = ApiCall::builder(FetchAction::DidLoad, FetchAction::DidFail)
        .url(args.url.clone())
        .method(method)
        .headers(args.headers.clone());
    if let Some(raw) = &args.data {
        let data: Value = serde_json::from_str(raw)?;
        call = call.data(data);
    }

    Ok(FetchAction::Fetch(call.build()))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = HttpConfig::new().with_timeout(Duration::from_secs(args.timeout));
    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url.clone());
    }
    let transport = match HttpTransport::new(config) {
        Ok(transport) => Arc::new(transport),
        Err(e) => {
            eprintln!("Error: could not create HTTP client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let fetch = match build_fetch(&args) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };

    // ===== Store wiring =====
    let (action_tx, mut action_rx) = mpsc::unbounded_channel();
    let middleware = ComposedMiddleware::new()
        .with(LoggingMiddleware::verbose())
        .with(ApiMiddleware::new(transport, action_tx));
    let mut store = StoreWithMiddleware::new(FetchState::default(), reducer, middleware);

    tracing::info!(url = %args.url, method = %args.method, "fetching");
    store.dispatch(fetch);

    // Exactly one derived action per call
    while store.state().loading {
        match action_rx.recv().await {
            Some(action) => {
                store.dispatch(action);
            }
            None => break,
        }
    }

    let state = store.state();
    match (&state.body, &state.error) {
        (Some(body), _) => {
            match serde_json::to_string_pretty(body) {
                Ok(pretty) => println!("{pretty}"),
                Err(_) => println!("{body}"),
            }
            ExitCode::SUCCESS
        }
        (None, Some(error)) => {
            eprintln!("Error: {error}");
            if let ApiError::Status { body, .. } = error {
                if !body.is_empty() {
                    eprintln!("{body}");
                }
            }
            ExitCode::FAILURE
        }
        (None, None) => {
            eprintln!("Error: no response");
            ExitCode::FAILURE
        }
    }
}
