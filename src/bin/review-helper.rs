use std::future::IntoFuture;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use secrecy::SecretString;
use tokio::sync::watch;
use tracing_subscriber::filter::EnvFilter;

use review_helper::github::api::{create_github_client, GithubClient};
use review_helper::github::server::{create_app, ServerState};
use review_helper::github::WebhookSecret;
use review_helper::review::gitops::{CommitIdentity, Git};
use review_helper::review::ReviewContext;

/// How long in-flight requests may keep running after a shutdown signal.
const SHUTDOWN_DRAIN_PERIOD: Duration = Duration::from_secs(10);

#[derive(clap::Parser)]
struct Opts {
    /// Port on which the webhook server listens.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Secret used to authenticate webhooks.
    #[arg(long, env = "GITHUB_SECRET")]
    webhook_secret: String,

    /// Personal access token used to talk to the GitHub API.
    #[arg(long, env = "GITHUB_ACCESS_TOKEN")]
    access_token: String,

    /// Directory where local clones are kept.
    /// A temporary directory is used (and removed on exit) if it is not set.
    #[arg(long, env = "REPOS_DIR")]
    repos_dir: Option<PathBuf>,

    /// Maximum number of seconds spent on a single webhook request.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 300)]
    request_timeout: u64,

    /// Committer name used when rebasing pull requests.
    #[arg(long, env = "GIT_USER_NAME", default_value = "review-helper")]
    git_user_name: String,

    /// Committer email used when rebasing pull requests.
    #[arg(long, env = "GIT_USER_EMAIL", default_value = "review-helper@localhost")]
    git_user_email: String,
}

async fn shutdown_signal(tx: watch::Sender<bool>) {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!("Cannot listen for Ctrl-C: {error:?}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("Cannot listen for SIGTERM: {error:?}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("Shutdown signal received, draining in-flight requests");
    let _ = tx.send(true);
}

async fn server(state: ServerState, port: u16) -> anyhow::Result<()> {
    let app = create_app(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Cannot bind to {addr}"))?;
    tracing::info!("Listening on {addr}");

    let (tx, mut rx) = watch::channel(false);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(tx))
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        res = &mut server => res.context("Server has failed")?,
        _ = async {
            let _ = rx.changed().await;
            tokio::time::sleep(SHUTDOWN_DRAIN_PERIOD).await;
        } => {
            tracing::warn!("In-flight requests did not finish within {SHUTDOWN_DRAIN_PERIOD:?}");
        }
    }
    Ok(())
}

fn try_main(opts: Opts) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Cannot build tokio runtime")?;

    // Keeps the temporary directory alive until the server stops.
    let (repos_dir, _temp_dir) = match opts.repos_dir {
        Some(dir) => (dir, None),
        None => {
            let dir = tempfile::Builder::new()
                .prefix("review-helper")
                .tempdir()
                .context("Cannot create a directory for local clones")?;
            (dir.path().to_path_buf(), Some(dir))
        }
    };
    tracing::info!("Storing local clones in {}", repos_dir.display());

    let git = Git::try_init(
        repos_dir,
        CommitIdentity {
            name: opts.git_user_name,
            email: opts.git_user_email,
        },
    )?;
    let client = {
        let _guard = runtime.enter();
        create_github_client(None, SecretString::new(opts.access_token))?
    };

    let ctx = ReviewContext::new(
        Arc::new(GithubClient::new(client)),
        Arc::new(git),
        Duration::from_secs(opts.request_timeout),
    );
    let state = ServerState::new(ctx, WebhookSecret::new(opts.webhook_secret));

    runtime.block_on(server(state, opts.port))?;
    tracing::info!("Server has stopped");
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let opts = Opts::parse();
    if let Err(error) = try_main(opts) {
        eprintln!("Error: {error:?}");
        std::process::exit(1);
    }
}
