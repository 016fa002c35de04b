//! App builder - wires collaborators and runs the distributor

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use distributor_core::{ChangeFeedPump, PumpConfig, RegistryConfig, SubscriptionRegistry};
use distributor_types::change_feed::ChangeFeed;
use distributor_types::detail_lookup::DetailLookup;
use distributor_types::registry_client::{MemberClient, NetworkClient, SubscriberClient};

use crate::config::DistributorConfig;
use crate::prelude::*;
use crate::service::DistributorServer;
use crate::stream::StreamAdapter;
use crate::validate::RequestValidator;
use crate::VERSION;

#[derive(Default)]
struct Adapters {
	change_feed: Option<Arc<dyn ChangeFeed>>,
	detail_lookup: Option<Arc<dyn DetailLookup>>,
	member_client: Option<Arc<dyn MemberClient>>,
	network_client: Option<Arc<dyn NetworkClient>>,
	subscriber_client: Option<Arc<dyn SubscriberClient>>,
}

pub struct AppBuilder {
	config: DistributorConfig,
	adapters: Adapters,
}

/// Install logging and the TLS crypto provider. Safe to call more than once.
pub fn init_runtime() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_target(false)
		.try_init();

	// sqlx and hyper-rustls both pull in rustls, the provider must be chosen
	// before the first TLS client is built
	if rustls::crypto::CryptoProvider::get_default().is_none()
		&& rustls::crypto::CryptoProvider::install_default(
			rustls::crypto::aws_lc_rs::default_provider(),
		)
		.is_err()
	{
		warn!("crypto provider was installed concurrently");
	}
}

impl AppBuilder {
	pub fn new(config: DistributorConfig) -> Self {
		init_runtime();
		AppBuilder { config, adapters: Adapters::default() }
	}

	pub fn config(&self) -> &DistributorConfig {
		&self.config
	}

	// Adapters
	pub fn change_feed(&mut self, change_feed: Arc<dyn ChangeFeed>) -> &mut Self {
		self.adapters.change_feed = Some(change_feed);
		self
	}
	pub fn detail_lookup(&mut self, detail_lookup: Arc<dyn DetailLookup>) -> &mut Self {
		self.adapters.detail_lookup = Some(detail_lookup);
		self
	}
	pub fn member_client(&mut self, member_client: Arc<dyn MemberClient>) -> &mut Self {
		self.adapters.member_client = Some(member_client);
		self
	}
	pub fn network_client(&mut self, network_client: Arc<dyn NetworkClient>) -> &mut Self {
		self.adapters.network_client = Some(network_client);
		self
	}
	pub fn subscriber_client(&mut self, subscriber_client: Arc<dyn SubscriberClient>) -> &mut Self {
		self.adapters.subscriber_client = Some(subscriber_client);
		self
	}

	/// Run until Ctrl-C
	pub async fn run(self) -> ClResult<()> {
		self.run_until(async {
			if let Err(err) = tokio::signal::ctrl_c().await {
				error!("Failed to listen for shutdown signal: {}", err);
			}
		})
		.await
	}

	/// Run until `shutdown` resolves, then stop the pump and end every
	/// open stream
	pub async fn run_until<F>(self, shutdown: F) -> ClResult<()>
	where
		F: Future<Output = ()> + Send + 'static,
	{
		info!("Ukama notification distributor V{}", VERSION);
		info!("org: {} ({})", self.config.org_name, self.config.org_id);

		self.config.validate().inspect_err(|err| error!("FATAL: {}", err))?;
		let addr: SocketAddr = self.config.listen.parse().map_err(|err| {
			error!("FATAL: Invalid listen address {}: {}", self.config.listen, err);
			Error::ConfigError(format!("invalid listen address {}", self.config.listen))
		})?;

		let Some(change_feed) = self.adapters.change_feed else {
			error!("FATAL: No change feed configured");
			return Err(Error::Internal("No change feed configured".to_string()));
		};
		let Some(detail_lookup) = self.adapters.detail_lookup else {
			error!("FATAL: No detail lookup configured");
			return Err(Error::Internal("No detail lookup configured".to_string()));
		};
		let Some(member_client) = self.adapters.member_client else {
			error!("FATAL: No member client configured");
			return Err(Error::Internal("No member client configured".to_string()));
		};
		let Some(network_client) = self.adapters.network_client else {
			error!("FATAL: No network client configured");
			return Err(Error::Internal("No network client configured".to_string()));
		};
		let Some(subscriber_client) = self.adapters.subscriber_client else {
			error!("FATAL: No subscriber client configured");
			return Err(Error::Internal("No subscriber client configured".to_string()));
		};

		let registry = Arc::new(SubscriptionRegistry::with_config(RegistryConfig {
			buffer_size: self.config.buffer_size,
		}));
		let pump = Arc::new(ChangeFeedPump::new(
			Arc::clone(&registry),
			change_feed,
			detail_lookup,
			PumpConfig {
				channel: self.config.change_channel.clone(),
				lookup_timeout: self.config.lookup_timeout,
			},
		));

		pump.start().await.inspect_err(|err| error!("FATAL: Change feed failed: {}", err))?;

		let validator = RequestValidator::new(
			self.config.org_id.clone(),
			member_client,
			network_client,
			subscriber_client,
		);
		let server = DistributorServer::new(
			validator,
			StreamAdapter::new(Arc::clone(&registry)),
			self.config.stream_buffer,
		);

		let shutdown = {
			let pump = Arc::clone(&pump);
			let registry = Arc::clone(&registry);
			async move {
				shutdown.await;
				info!("Shutting down, {} open streams", registry.len());
				pump.stop().await;
				registry.stop();
			}
		};

		info!("Listening on gRPC {}", addr);
		let res = tonic::transport::Server::builder()
			.add_service(server.into_service())
			.serve_with_shutdown(addr, shutdown)
			.await;

		// serve errors skip the shutdown future
		pump.stop().await;
		registry.stop();

		res.map_err(|err| {
			error!("gRPC server failed: {}", err);
			Error::NetworkError(err.to_string())
		})?;

		info!("Stopped");
		Ok(())
	}
}

// vim: ts=4
