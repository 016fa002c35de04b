//! Subscription registry
//!
//! Concurrency-safe table of connected subscribers. Every subscriber owns a
//! bounded notification queue; fan-out never waits on it. When a queue is
//! full the notification is dropped for that subscriber only, so one slow
//! consumer cannot stall the shared producer. Delivery is at-most-once.

use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;

use crate::prelude::*;

/// Registry configuration
#[derive(Clone, Debug)]
pub struct RegistryConfig {
	/// Capacity of every subscriber's notification queue
	pub buffer_size: usize,
}

impl Default for RegistryConfig {
	fn default() -> Self {
		Self { buffer_size: 10 }
	}
}

/// Server-side state of one connected subscriber
#[derive(Debug)]
struct Sub {
	org_id: Box<str>,
	network_id: Box<str>,
	subscriber_id: Box<str>,
	user_id: Box<str>,
	scopes: Box<[Scope]>,
	sender: mpsc::Sender<Notification>,
	quit: CancellationToken,
}

impl Sub {
	fn matches(&self, notification: &Notification) -> bool {
		self.scopes.contains(&notification.scope)
			&& dimension_matches(&self.org_id, &notification.org_id)
			&& dimension_matches(&self.network_id, &notification.network_id)
			&& dimension_matches(&self.subscriber_id, &notification.subscriber_id)
			&& dimension_matches(&self.user_id, &notification.user_id)
	}
}

/// An empty value on either side does not filter
fn dimension_matches(sub: &str, notification: &str) -> bool {
	sub.is_empty() || notification.is_empty() || sub == notification
}

/// Receiving side of a subscription, held by the stream adapter
#[derive(Debug)]
pub struct SubHandle {
	pub id: Box<str>,
	receiver: mpsc::Receiver<Notification>,
	quit: CancellationToken,
}

impl SubHandle {
	/// Wait for the next notification.
	///
	/// Returns `None` once the subscription is told to quit, or when it has
	/// been removed from the registry and its queue is drained.
	pub async fn recv(&mut self) -> Option<Notification> {
		tokio::select! {
			biased;
			() = self.quit.cancelled() => None,
			notification = self.receiver.recv() => notification,
		}
	}

	/// Take a queued notification without waiting
	pub fn try_recv(&mut self) -> Option<Notification> {
		self.receiver.try_recv().ok()
	}

	pub fn is_quit(&self) -> bool {
		self.quit.is_cancelled()
	}
}

/// Outcome of one fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOutStats {
	/// Matching subscribers that received the notification
	pub delivered: usize,
	/// Matching subscribers whose queue was full
	pub dropped: usize,
	/// Matching subscribers whose receiving side is gone
	pub disconnected: usize,
}

impl FanOutStats {
	pub fn matched(&self) -> usize {
		self.delivered + self.dropped + self.disconnected
	}
}

/// Registry statistics
#[derive(Debug, Clone)]
pub struct RegistryStats {
	pub subscriptions: usize,
	/// Number of subscriptions interested in each scope
	pub subscriptions_per_scope: HashMap<Scope, usize>,
}

/// Table of active subscriptions
#[derive(Debug)]
pub struct SubscriptionRegistry {
	subs: RwLock<HashMap<Box<str>, Sub>>,
	/// Parent of every subscription's quit token
	shutdown: CancellationToken,
	config: RegistryConfig,
}

impl SubscriptionRegistry {
	pub fn new() -> Self {
		Self::with_config(RegistryConfig::default())
	}

	pub fn with_config(config: RegistryConfig) -> Self {
		Self { subs: RwLock::new(HashMap::new()), shutdown: CancellationToken::new(), config }
	}

	/// Register a subscription.
	///
	/// Unknown scope names are ignored and duplicates collapsed. Empty
	/// dimensions match every notification.
	pub fn register<S: AsRef<str>>(
		&self,
		org_id: &str,
		network_id: &str,
		subscriber_id: &str,
		user_id: &str,
		scopes: &[S],
	) -> (Box<str>, SubHandle) {
		let mut parsed: Vec<Scope> = Vec::with_capacity(scopes.len());
		for name in scopes {
			match Scope::parse(name.as_ref()) {
				Some(scope) if !parsed.contains(&scope) => parsed.push(scope),
				Some(_) => {}
				None => debug!(scope = %name.as_ref(), "ignoring unknown scope"),
			}
		}

		let (sender, receiver) = mpsc::channel(self.config.buffer_size.max(1));
		let quit = self.shutdown.child_token();
		let sub = Sub {
			org_id: org_id.into(),
			network_id: network_id.into(),
			subscriber_id: subscriber_id.into(),
			user_id: user_id.into(),
			scopes: parsed.into_boxed_slice(),
			sender,
			quit: quit.clone(),
		};

		let id: Box<str> = {
			let mut subs = self.subs.write();
			let mut id: Box<str> = uuid::Uuid::new_v4().to_string().into();
			while subs.contains_key(&id) {
				id = uuid::Uuid::new_v4().to_string().into();
			}
			debug!(sub_id = %id, org_id = %org_id, network_id = %network_id, subscriber_id = %subscriber_id, user_id = %user_id, scopes = ?sub.scopes, "subscription registered");
			subs.insert(id.clone(), sub);
			id
		};

		(id.clone(), SubHandle { id, receiver, quit })
	}

	/// Remove a subscription. Fails with `Error::NotFound` for unknown ids.
	pub fn deregister(&self, id: &str) -> ClResult<()> {
		let removed = self.subs.write().remove(id);
		match removed {
			Some(_) => {
				debug!(sub_id = %id, "subscription deregistered");
				Ok(())
			}
			None => Err(Error::NotFound),
		}
	}

	/// Offer a notification to every matching subscription without waiting.
	pub fn fan_out(&self, notification: &Notification) -> FanOutStats {
		let mut stats = FanOutStats::default();
		let subs = self.subs.read();

		for (id, sub) in subs.iter() {
			if !sub.matches(notification) {
				continue;
			}
			match sub.sender.try_send(notification.clone()) {
				Ok(()) => stats.delivered += 1,
				Err(TrySendError::Full(_)) => {
					stats.dropped += 1;
					debug!(sub_id = %id, notification_id = %notification.id, "subscriber queue full, notification dropped");
				}
				Err(TrySendError::Closed(_)) => {
					stats.disconnected += 1;
					debug!(sub_id = %id, notification_id = %notification.id, "subscriber gone, notification dropped");
				}
			}
		}

		stats
	}

	/// Signal every subscription to quit. Subscriptions registered
	/// afterwards start out quit.
	pub fn stop(&self) {
		info!(subscriptions = self.len(), "stopping subscription registry");
		self.shutdown.cancel();
	}

	pub fn is_stopped(&self) -> bool {
		self.shutdown.is_cancelled()
	}

	pub fn len(&self) -> usize {
		self.subs.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.subs.read().is_empty()
	}

	pub fn contains(&self, id: &str) -> bool {
		self.subs.read().contains_key(id)
	}

	/// Ids of all registered subscriptions
	pub fn ids(&self) -> Vec<Box<str>> {
		self.subs.read().keys().cloned().collect()
	}

	pub fn stats(&self) -> RegistryStats {
		let subs = self.subs.read();

		let mut subscriptions_per_scope = HashMap::new();
		for sub in subs.values() {
			for scope in &sub.scopes {
				*subscriptions_per_scope.entry(*scope).or_insert(0) += 1;
			}
		}

		RegistryStats { subscriptions: subs.len(), subscriptions_per_scope }
	}
}

impl Default for SubscriptionRegistry {
	fn default() -> Self {
		Self::new()
	}
}


// vim: ts=4
