//! Minimal HTTP echo responder for exercising SDK HTTP clients.
//!
//! Prints each request's headers (and a POST body) to stdout and answers with a
//! fixed plain-text line.

mod routes;

use std::net::SocketAddr;

use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Parser)]
#[command(name = "echo-server")]
#[command(about = "Print incoming HTTP requests and acknowledge them")]
struct Args {
    /// Address to bind the server to
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Port to listen on
    #[arg(long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("echo_server=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let app = routes::app().layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "starting echo server");
    axum::serve(listener, app).await?;

    Ok(())
}
