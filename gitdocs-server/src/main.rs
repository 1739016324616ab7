//! HTTP server exposing a gitdocs document store.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use gitdocs::{DocStore, OpenOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod routes;

#[derive(Parser, Debug)]
#[command(name = "gitdocs-server", version, about = "Serve a git-backed JSON document store over HTTP")]
struct Args {
    /// URL of the git remote to serve.
    #[arg(long, env = "GITDOCS_REMOTE")]
    remote: String,

    /// Directory for the local checkout (cloned on first start).
    #[arg(long, env = "GITDOCS_CHECKOUT")]
    checkout: PathBuf,

    /// Branch served by /latest.
    #[arg(long, env = "GITDOCS_BRANCH", default_value = "main")]
    branch: String,

    /// Address to listen on.
    #[arg(long, env = "GITDOCS_LISTEN", default_value = "0.0.0.0:8080")]
    listen: SocketAddr,

    /// Author name for commits created by writes.
    #[arg(long, env = "GITDOCS_AUTHOR", default_value = "gitdocs")]
    author: String,

    /// Author email for commits created by writes.
    #[arg(long, env = "GITDOCS_EMAIL", default_value = "gitdocs@localhost")]
    email: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if let Err(err) = run(args).await {
        tracing::error!("fatal: {err}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let options = OpenOptions {
        url: Some(args.remote.clone()),
        branch: Some(args.branch.clone()),
        author: Some(args.author),
        email: Some(args.email),
    };
    let checkout = args.checkout.clone();
    // Opening may clone over the network; keep it off the async runtime.
    let store = tokio::task::spawn_blocking(move || DocStore::open(checkout, options)).await??;
    info!(
        remote = %args.remote,
        checkout = %args.checkout.display(),
        branch = %args.branch,
        "store opened"
    );

    let app = routes::router(store);
    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    info!(listen = %args.listen, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutting down");
}
