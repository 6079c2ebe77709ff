use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use homework_common::config::AppConfig;
use homework_notifier::TelegramNotifier;
use homework_poller::api::ApiPoller;
use homework_poller::poll_loop::PollLoop;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "homework_poller=info,homework_notifier=info,homework_common=info".into()
            }),
        )
        .init();

    tracing::info!("Homework bot starting...");

    // Load configuration
    let config = AppConfig::from_env()?;
    let credentials = config.ready_credentials()?;

    let source = ApiPoller::new(config.endpoint.clone(), &credentials, config.http_timeout)?;
    let notifier = TelegramNotifier::new(
        config.telegram_api_url.clone(),
        &credentials,
        config.http_timeout,
    )?;

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received shutdown signal, stopping gracefully...");
            shutdown.cancel();
        }
    });

    let mut poll_loop = PollLoop::new(
        Arc::new(source),
        Arc::new(notifier),
        config.poll_interval,
        cancel,
    );
    poll_loop.run().await;

    tracing::info!("Homework bot stopped.");
    Ok(())
}
