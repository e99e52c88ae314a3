use axum::http::HeaderValue;
use clap::Parser;
use pixiquad_media::removal::REMOVE_BG_URL;
use std::fmt;
use std::net::SocketAddr;
use url::Url;
#[cfg(test)]
pub mod tests;

#[derive(Parser)]
#[command(
    name = "pixiquad-proxy",
    about = "Forwards background removal requests to remove.bg with a server-side API key"
)]
pub struct Args {
    #[arg(long, env = "PIXIQUAD_LISTEN")]
    #[arg(default_value = "0.0.0.0:8787")]
    pub listen_address: SocketAddr,
    #[arg(long, env = "REMOVE_BG_API_KEY", hide_env_values = true)]
    pub api_key: String,
    #[arg(long, env = "PIXIQUAD_UPSTREAM_URL")]
    #[arg(default_value = REMOVE_BG_URL)]
    pub upstream_url: Url,
    #[arg(long, env = "PIXIQUAD_UPSTREAM_TIMEOUT_SECS")]
    #[arg(default_value_t = 60)]
    pub timeout_secs: u64,
    /// Browser origin allowed to call the proxy. Repeat for several.
    #[arg(long = "allowed-origin")]
    #[arg(default_value = "http://localhost:8080")]
    pub allowed_origins: Vec<HeaderValue>,
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("listen_address", &self.listen_address)
            .field("api_key", &"<redacted>")
            .field("upstream_url", &self.upstream_url.as_str())
            .field("timeout_secs", &self.timeout_secs)
            .field("allowed_origins", &self.allowed_origins)
            .finish()
    }
}
