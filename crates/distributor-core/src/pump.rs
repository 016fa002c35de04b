//! Change feed pump
//!
//! The single producer of the distributor. It drains the change feed, looks
//! up the details of every changed notification and fans the enriched value
//! out through the subscription registry.
//!
//! ```text
//! Idle -> Listening -> Enriching -> FanningOut -> Listening
//!         Listening -> Reconnecting -> Listening
//!         Listening -> Stopped
//! ```

use futures::StreamExt;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use distributor_types::change_feed::{ChangeEvent, ChangeFeed, FeedEvent, FeedStream};
use distributor_types::detail_lookup::DetailLookup;

use crate::prelude::*;
use crate::registry::SubscriptionRegistry;

pub const DEFAULT_CHANNEL: &str = "notification_changes";

#[derive(Clone, Debug)]
pub struct PumpConfig {
	/// Change feed channel name
	pub channel: Box<str>,
	/// Upper bound for a single detail lookup
	pub lookup_timeout: Duration,
}

impl Default for PumpConfig {
	fn default() -> Self {
		Self { channel: DEFAULT_CHANNEL.into(), lookup_timeout: Duration::from_secs(3) }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
	Idle,
	Listening,
	Enriching,
	FanningOut,
	Reconnecting,
	Stopped,
}

/// Pump counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
	/// Payloads received from the feed
	pub received: u64,
	/// Payloads that could not be parsed
	pub malformed: u64,
	/// Events dropped because the lookup failed or timed out
	pub lookup_failures: u64,
	/// Notifications handed to the registry
	pub fanned_out: u64,
	/// Transport losses reported by the feed
	pub disconnects: u64,
}

#[derive(Debug, Default)]
struct Counters {
	received: AtomicU64,
	malformed: AtomicU64,
	lookup_failures: AtomicU64,
	fanned_out: AtomicU64,
	disconnects: AtomicU64,
}

#[derive(Debug)]
struct Shared {
	registry: Arc<SubscriptionRegistry>,
	lookup: Arc<dyn DetailLookup>,
	config: PumpConfig,
	state: Mutex<PumpState>,
	counters: Counters,
}

impl Shared {
	fn set_state(&self, state: PumpState) {
		*self.state.lock() = state;
	}

	async fn run(self: Arc<Self>, mut stream: FeedStream, cancel: CancellationToken) {
		info!(channel = %self.config.channel, "change feed pump listening");

		loop {
			tokio::select! {
				biased;
				() = cancel.cancelled() => break,
				event = stream.next() => match event {
					Some(FeedEvent::Payload(payload)) => self.handle_payload(&payload).await,
					Some(FeedEvent::Disconnected { reason }) => {
						self.counters.disconnects.fetch_add(1, Ordering::Relaxed);
						self.set_state(PumpState::Reconnecting);
						warn!(channel = %self.config.channel, reason = %reason, "change feed disconnected, waiting for reconnect");
					}
					Some(FeedEvent::Reconnected { attempts }) => {
						self.set_state(PumpState::Listening);
						info!(channel = %self.config.channel, attempts, "change feed reconnected");
					}
					None => {
						error!(channel = %self.config.channel, "change feed ended, pump exits");
						break;
					}
				}
			}
		}

		self.set_state(PumpState::Stopped);
		info!(channel = %self.config.channel, "change feed pump stopped");
	}

	async fn handle_payload(&self, payload: &str) {
		self.counters.received.fetch_add(1, Ordering::Relaxed);

		let event = match ChangeEvent::parse(payload) {
			Ok(event) => event,
			Err(err) => {
				self.counters.malformed.fetch_add(1, Ordering::Relaxed);
				warn!(payload = %payload, error = %err, "malformed change payload dropped");
				return;
			}
		};

		self.set_state(PumpState::Enriching);
		let lookup = tokio::time::timeout(
			self.config.lookup_timeout,
			self.lookup.get(&event.entity_id),
		)
		.await
		.map_err(Error::from)
		.and_then(|res| res);

		let mut detail = match lookup {
			Ok(detail) => detail,
			Err(err) => {
				self.counters.lookup_failures.fetch_add(1, Ordering::Relaxed);
				self.set_state(PumpState::Listening);
				warn!(entity_id = %event.entity_id, action = ?event.action, error = %err, "notification lookup failed, event dropped");
				return;
			}
		};

		if detail.id.is_empty() {
			detail.id = event.entity_id.clone();
		}
		let Some(notification) = Notification::from_detail(detail, event.is_read) else {
			self.counters.lookup_failures.fetch_add(1, Ordering::Relaxed);
			self.set_state(PumpState::Listening);
			warn!(entity_id = %event.entity_id, "notification has no valid scope, event dropped");
			return;
		};

		self.set_state(PumpState::FanningOut);
		let stats = self.registry.fan_out(&notification);
		self.counters.fanned_out.fetch_add(1, Ordering::Relaxed);
		self.set_state(PumpState::Listening);

		debug!(
			notification_id = %notification.id,
			scope = %notification.scope,
			delivered = stats.delivered,
			dropped = stats.dropped,
			disconnected = stats.disconnected,
			"notification fanned out"
		);
	}
}

/// Background loop bridging the change feed to the subscription registry
#[derive(Debug)]
pub struct ChangeFeedPump {
	shared: Arc<Shared>,
	feed: Arc<dyn ChangeFeed>,
	cancel: CancellationToken,
	task: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl ChangeFeedPump {
	pub fn new(
		registry: Arc<SubscriptionRegistry>,
		feed: Arc<dyn ChangeFeed>,
		lookup: Arc<dyn DetailLookup>,
		config: PumpConfig,
	) -> Self {
		Self {
			shared: Arc::new(Shared {
				registry,
				lookup,
				config,
				state: Mutex::new(PumpState::Idle),
				counters: Counters::default(),
			}),
			feed,
			cancel: CancellationToken::new(),
			task: tokio::sync::Mutex::new(None),
		}
	}

	/// Open the change feed and spawn the pump loop.
	///
	/// Calling it again while running is a no-op. Once the loop has exited
	/// because the feed ended, the feed is listened on again. A feed that cannot be
	/// opened is reported to the caller, the process is not expected to run
	/// without its change feed.
	pub async fn start(&self) -> ClResult<()> {
		let mut task = self.task.lock().await;
		match task.as_ref() {
			Some(handle) if !handle.is_finished() => {
				debug!("change feed pump already started");
				return Ok(());
			}
			Some(_) => {
				// the previous loop exited on its own, listen again
				debug!("change feed pump restarting after feed end");
				*task = None;
			}
			None => {}
		}
		if self.cancel.is_cancelled() {
			return Err(Error::Internal("change feed pump was stopped".into()));
		}

		let stream = self.feed.listen(&self.shared.config.channel).await.map_err(|err| {
			error!(channel = %self.shared.config.channel, error = %err, "failed to open change feed");
			err
		})?;

		self.shared.set_state(PumpState::Listening);
		let shared = self.shared.clone();
		*task = Some(tokio::spawn(shared.run(stream, self.cancel.clone())));
		Ok(())
	}

	/// Stop the pump loop and wait for it to exit. The feed stream is
	/// dropped with the loop.
	pub async fn stop(&self) {
		self.cancel.cancel();

		let handle = self.task.lock().await.take();
		if let Some(handle) = handle
			&& let Err(err) = handle.await
		{
			warn!(error = %err, "change feed pump task failed");
		}
		self.shared.set_state(PumpState::Stopped);
	}

	pub fn state(&self) -> PumpState {
		*self.shared.state.lock()
	}

	pub fn stats(&self) -> PumpStats {
		let counters = &self.shared.counters;
		PumpStats {
			received: counters.received.load(Ordering::Relaxed),
			malformed: counters.malformed.load(Ordering::Relaxed),
			lookup_failures: counters.lookup_failures.load(Ordering::Relaxed),
			fanned_out: counters.fanned_out.load(Ordering::Relaxed),
			disconnects: counters.disconnects.load(Ordering::Relaxed),
		}
	}

	pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
		&self.shared.registry
	}
}

// vim: ts=4
