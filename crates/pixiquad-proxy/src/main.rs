use clap::Parser;

mod app_context;
mod cli;
mod errors;
mod health;
mod http;
mod logging;
mod removebg;

#[tokio::main]
async fn main() -> Result<(), errors::StartupError> {
    let args = cli::Args::parse();
    logging::init();

    let app_context = app_context::init(&args)?;
    let router = http::router::new(&args, app_context);

    let listener = tokio::net::TcpListener::bind(args.listen_address)
        .await
        .map_err(errors::StartupError::Bind)?;
    tracing::info!(
        listen_address = %args.listen_address,
        upstream_url = %args.upstream_url,
        "Listening for background removal requests."
    );
    axum::serve(listener, router)
        .await
        .map_err(errors::StartupError::Serve)
}
