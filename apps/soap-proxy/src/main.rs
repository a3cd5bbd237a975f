use std::net::SocketAddr;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod routes;

/// Forwards SOAP traffic from the dashboard to the legacy ERP hosts.
#[derive(Parser, Debug, Clone)]
#[command(name = "dms-soap-proxy")]
struct Args {
	/// Port to listen on (IPv4 and IPv6)
	#[arg(long, env = "PORT", default_value_t = 5173)]
	port: u16,

	/// Upstream behind `/api`
	#[arg(
		long,
		env = "DMS_API_UPSTREAM",
		default_value = "http://103.168.19.35/iStWebClient_Demo/istreamssmartservice.asmx"
	)]
	api_upstream: String,

	/// Upstream behind `/public`
	#[arg(
		long,
		env = "DMS_PUBLIC_UPSTREAM",
		default_value = "http://103.168.19.35/iStWebPublic/iStreamsSmartPublic.asmx"
	)]
	public_upstream: String,

	/// Upstream the JSON relay forwards to
	#[arg(
		long,
		env = "DMS_RELAY_UPSTREAM",
		default_value = "https://istreamserp-001-site1.anytempurl.com/iStreamsSmartPublic.asmx"
	)]
	relay_upstream: String,

	/// Path of the JSON relay
	#[arg(long, env = "DMS_RELAY_PATH", default_value = "/.netlify/functions/soap-proxy")]
	relay_path: String,
}

#[tokio::main]
async fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| EnvFilter::new("info,dms_soap_proxy=debug,dms_erp_client=debug")),
		)
		.init();

	let args = Args::parse();

	let state = routes::ProxyState::new(routes::Upstreams {
		api: args.api_upstream,
		public: args.public_upstream,
		relay: args.relay_upstream,
	});
	let app = routes::router(state, &args.relay_path);

	let mut addr = "[::]:5173".parse::<SocketAddr>()?; // This listens on IPv6 and IPv4
	addr.set_port(args.port);
	info!("Listening on http://localhost:{}", args.port);

	axum::Server::bind(&addr)
		.serve(app.into_make_service())
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	Ok(())
}

async fn shutdown_signal() {
	match tokio::signal::ctrl_c().await {
		Ok(()) => info!("Shutting down"),
		Err(e) => {
			tracing::error!(?e, "Failed to listen for the shutdown signal");
			std::future::pending::<()>().await
		}
	}
}
