use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;

use distributor::event_notify::EventNotifyLookup;
use distributor::types::backoff::ReconnectPolicy;
use distributor::types::error::ClResult;
use distributor::{AppBuilder, DistributorConfig};
use distributor_feed_adapter_postgres::{PgChangeFeed, PgFeedConfig};
use distributor_registry_client_http::{HttpRegistryClient, HttpSubscriberClient};

async fn run() -> ClResult<()> {
	let config = DistributorConfig::from_env()?;

	let reconnect = ReconnectPolicy::new(config.reconnect_min, config.reconnect_max);
	let change_feed = PgChangeFeed::new(
		PgFeedConfig::new(config.database_url.clone())
			.with_connect_timeout(config.db_connect_timeout)
			.with_reconnect(reconnect),
	);
	let detail_lookup =
		EventNotifyLookup::connect_lazy(&config.event_notify_url, config.lookup_timeout)?;
	let registry = Arc::new(HttpRegistryClient::new(&config.registry_url, config.http_timeout)?);
	let subscribers = HttpSubscriberClient::new(&config.subscriber_url, config.http_timeout)?;

	let mut app = AppBuilder::new(config);
	app.change_feed(Arc::new(change_feed))
		.detail_lookup(Arc::new(detail_lookup))
		.member_client(registry.clone())
		.network_client(registry)
		.subscriber_client(Arc::new(subscribers));
	app.run().await
}

#[tokio::main]
async fn main() -> ExitCode {
	distributor::app::init_runtime();

	match run().await {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			error!("Distributor exited: {}", err);
			ExitCode::FAILURE
		}
	}
}

// vim: ts=4
