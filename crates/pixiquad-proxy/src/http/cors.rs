use crate::cli::Args;
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::CorsLayer;

pub fn layer(args: &Args) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(args.allowed_origins.clone())
        .allow_headers([CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
}
