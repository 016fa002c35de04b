//! Stream adapter: one client stream bound to one subscription

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

use distributor_core::SubscriptionRegistry;
use distributor_proto::distributor::v1 as pb;

use crate::prelude::*;
use crate::validate::Registration;

/// Client side of a notification stream
#[async_trait]
pub trait NotificationSink: Send + Sync {
	async fn send(&mut self, notification: &Notification) -> ClResult<()>;

	/// Resolves once the client has gone away
	async fn closed(&self);
}

#[async_trait]
impl NotificationSink for mpsc::Sender<Result<pb::Notification, tonic::Status>> {
	async fn send(&mut self, notification: &Notification) -> ClResult<()> {
		mpsc::Sender::send(self, Ok(to_proto(notification)))
			.await
			.map_err(|_| Error::SendFailure("client stream closed".into()))
	}

	async fn closed(&self) {
		mpsc::Sender::closed(self).await;
	}
}

pub fn to_proto(notification: &Notification) -> pb::Notification {
	pb::Notification {
		id: notification.id.to_string(),
		title: notification.title.to_string(),
		description: notification.description.to_string(),
		org_id: notification.org_id.to_string(),
		network_id: notification.network_id.to_string(),
		subscriber_id: notification.subscriber_id.to_string(),
		user_id: notification.user_id.to_string(),
		for_role: notification.for_role.as_str().to_string(),
		r#type: notification.notification_type.as_str().to_string(),
		scope: notification.scope.as_str().to_string(),
		is_read: notification.is_read,
	}
}

/// Why a stream ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
	/// Server shutdown signalled the subscription
	Quit,
	/// The client disconnected or cancelled the call
	ClientGone,
	/// The subscription was removed from the registry by someone else
	Removed,
}

/// Removes the subscription when the stream task ends, however it ends
struct Deregister<'a> {
	registry: &'a SubscriptionRegistry,
	id: &'a str,
}

impl Drop for Deregister<'_> {
	fn drop(&mut self) {
		if let Err(err) = self.registry.deregister(self.id) {
			debug!(sub_id = %self.id, error = %err, "subscription already deregistered");
		}
	}
}

#[derive(Debug, Clone)]
pub struct StreamAdapter {
	registry: Arc<SubscriptionRegistry>,
}

impl StreamAdapter {
	pub fn new(registry: Arc<SubscriptionRegistry>) -> Self {
		Self { registry }
	}

	/// Register a subscription and forward its notifications to `sink`
	/// until the subscription quits or the client goes away.
	///
	/// Failed sends are logged and skipped.
	pub async fn serve<K: NotificationSink>(
		&self,
		registration: &Registration,
		mut sink: K,
	) -> StreamEnd {
		let (id, mut handle) = self.registry.register(
			&registration.org_id,
			&registration.network_id,
			&registration.subscriber_id,
			&registration.user_id,
			&registration.scopes,
		);
		// dropped before `handle`, so the sending side is gone first
		let _deregister = Deregister { registry: &self.registry, id: &id };
		info!(sub_id = %id, role = %registration.role, scopes = ?registration.scopes, "notification stream opened");

		let end = loop {
			let notification = tokio::select! {
				biased;
				() = sink.closed() => break StreamEnd::ClientGone,
				notification = handle.recv() => match notification {
					Some(notification) => notification,
					None if handle.is_quit() => break StreamEnd::Quit,
					None => break StreamEnd::Removed,
				},
			};

			if let Err(err) = sink.send(&notification).await {
				warn!(sub_id = %id, notification_id = %notification.id, error = %err, "failed to send notification");
			}
		};

		info!(sub_id = %id, reason = ?end, "notification stream closed");
		end
	}
}

// vim: ts=4
