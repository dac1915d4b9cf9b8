pub mod routes;
pub mod state;

use std::net::SocketAddr;

use color_eyre::eyre;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;
use burst_cli::Args;

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = burst_config::load(&args.config)?;

	burst_cli::init_tracing(&config.service.log_level);

	let http_addr: SocketAddr = config.service.http_bind.parse()?;
	let admin_addr: SocketAddr = config.service.admin_bind.parse()?;

	if !admin_addr.ip().is_loopback() {
		return Err(eyre::eyre!("admin_bind must be a loopback address."));
	}

	let state = AppState::connect(&config).await?;
	let cancel = CancellationToken::new();
	let listener = if config.listener.enabled {
		Some(state.service.listener().start(cancel.clone()).await?)
	} else {
		tracing::info!("Expiry listener disabled; run burst-worker to flush idle bursts.");

		None
	};
	let app = routes::router(state.clone());
	let admin_app = routes::admin_router(state);
	let http_listener = TcpListener::bind(http_addr).await?;

	tracing::info!(%http_addr, "HTTP server listening.");

	let http_server =
		axum::serve(http_listener, app).with_graceful_shutdown(cancel.clone().cancelled_owned());
	let admin_listener = TcpListener::bind(admin_addr).await?;

	tracing::info!(%admin_addr, "Admin server listening.");

	let admin_server = axum::serve(admin_listener, admin_app)
		.with_graceful_shutdown(cancel.clone().cancelled_owned());

	tokio::spawn({
		let cancel = cancel.clone();

		async move {
			burst_cli::shutdown_signal().await;
			cancel.cancel();
		}
	});

	let serve = {
		let cancel = cancel.clone();

		async move {
			let result = tokio::try_join!(http_server, admin_server);

			cancel.cancel();

			result
		}
	};
	// A listener that stops on its own takes the servers down with it.
	let watch_listener = async move {
		let Some(handle) = listener else {
			return Ok(());
		};
		let result = handle.join().await;

		if let Err(err) = &result {
			tracing::error!(error = %err, "Expiry listener stopped.");
		}

		cancel.cancel();

		result
	};
	let (served, listened) = tokio::join!(serve, watch_listener);

	served?;
	listened?;

	tracing::info!("Shutdown complete.");

	Ok(())
}
