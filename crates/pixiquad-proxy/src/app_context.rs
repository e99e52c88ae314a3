use crate::cli::Args;
use crate::errors::StartupError;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Shared, immutable state handed to every handler.
#[derive(Clone)]
pub struct AppContext {
    pub http_client: reqwest::Client,
    pub upstream_url: Url,
    pub api_key: Arc<str>,
}

pub fn init(args: &Args) -> Result<AppContext, StartupError> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()
        .map_err(StartupError::HttpClient)?;
    tracing::info!(timeout_secs = args.timeout_secs, "Initialized upstream HTTP client.");

    Ok(AppContext {
        http_client,
        upstream_url: args.upstream_url.clone(),
        api_key: Arc::from(args.api_key.as_str()),
    })
}
