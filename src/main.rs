use anyhow::Context;
use clap::Parser; // for cli
use message_board::config::Args;
use message_board::credentials::{CredentialStore, hash_password};
use message_board::logging::init_logger;
use message_board::message_log::MessageLog;
use message_board::rate_limit::{PerClientRateLimiter, idle_sweeper};
use message_board::state::AppState;
use message_board::throttle::SlidingWindowThrottle;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

// this is main async function with tokio
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // parse cli arguments
    let args = Args::parse();

    if let Some(plaintext) = &args.hash_password {
        println!("{}", hash_password(plaintext));
        return Ok(());
    }

    init_logger(&args.log_level, args.log_json);

    let credentials = CredentialStore::load(&args.credentials);

    // creating shared state
    let state = Arc::new(AppState::new(
        SlidingWindowThrottle::new(args.global_capacity, args.global_window()),
        PerClientRateLimiter::new(args.client_limit, args.client_window(), args.max_clients),
        credentials,
        MessageLog::new(),
    ));

    // spawn the idle client sweeper
    let sweeper_limiter = Arc::clone(&state.rate_limiter);
    let sweep_interval = args.sweep_interval();
    tokio::spawn(async move {
        idle_sweeper(sweeper_limiter, sweep_interval).await;
    });

    let app = message_board::router(state);

    let addr = args.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Message board running on http://{}", addr);
    info!(
        "Global throttle: {} requests per {} seconds",
        args.global_capacity, args.global_window
    );
    info!(
        "Per-client limit: {} posts per {} seconds ({} clients tracked at most)",
        args.client_limit, args.client_window, args.max_clients
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}
