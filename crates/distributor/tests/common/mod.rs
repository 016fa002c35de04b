//! Test collaborators shared by the distributor integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use distributor::stream::NotificationSink;
use distributor::validate::RequestValidator;
use distributor_types::error::{ClResult, Error};
use distributor_types::notification::Notification;
use distributor_types::registry_client::{
	MemberClient, MemberInfo, NetworkClient, NetworkInfo, SubscriberClient, SubscriberInfo,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Notify;

pub const ORG_ID: &str = "8c6c2bec-5f90-4fee-8ffd-ee6456abf4fc";

pub fn setup_test_logging() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Member, network and subscriber registries in one in-memory fake
#[derive(Debug, Default)]
pub struct FakeRegistry {
	members: HashMap<String, MemberInfo>,
	networks: HashMap<String, NetworkInfo>,
	subscribers: HashMap<String, SubscriberInfo>,
}

impl FakeRegistry {
	pub fn with_member(mut self, user_id: &str, role: &str, is_deactivated: bool) -> Self {
		self.members.insert(
			user_id.to_string(),
			MemberInfo {
				member_id: format!("member-{}", user_id).into(),
				user_id: user_id.into(),
				role: role.into(),
				is_deactivated,
				created_at: None,
			},
		);
		self
	}

	pub fn with_network(mut self, network_id: &str) -> Self {
		self.networks.insert(
			network_id.to_string(),
			NetworkInfo {
				id: network_id.into(),
				name: format!("network {}", network_id).into(),
				org_id: ORG_ID.into(),
				is_deactivated: false,
			},
		);
		self
	}

	pub fn with_subscriber(mut self, subscriber_id: &str) -> Self {
		self.subscribers.insert(
			subscriber_id.to_string(),
			SubscriberInfo {
				subscriber_id: subscriber_id.into(),
				name: "John Doe".into(),
				network_id: "".into(),
				email: "john@example.com".into(),
			},
		);
		self
	}

	pub fn validator(self) -> RequestValidator {
		let registry = Arc::new(self);
		RequestValidator::new(ORG_ID, registry.clone(), registry.clone(), registry)
	}
}

#[async_trait]
impl MemberClient for FakeRegistry {
	async fn get_by_user_id(&self, user_id: &str) -> ClResult<MemberInfo> {
		self.members.get(user_id).cloned().ok_or(Error::NotFound)
	}
}

#[async_trait]
impl NetworkClient for FakeRegistry {
	async fn get(&self, network_id: &str) -> ClResult<NetworkInfo> {
		self.networks.get(network_id).cloned().ok_or(Error::NotFound)
	}
}

#[async_trait]
impl SubscriberClient for FakeRegistry {
	async fn get(&self, subscriber_id: &str) -> ClResult<SubscriberInfo> {
		self.subscribers.get(subscriber_id).cloned().ok_or(Error::NotFound)
	}
}

/// Sink recording what was sent; ids listed in `fail_ids` fail to send
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
	pub sent: Arc<Mutex<Vec<Box<str>>>>,
	pub fail_ids: Arc<Mutex<Vec<Box<str>>>>,
	pub gone: Arc<Notify>,
}

impl RecordingSink {
	pub fn sent_ids(&self) -> Vec<Box<str>> {
		self.sent.lock().clone()
	}

	pub fn fail_on(&self, id: &str) {
		self.fail_ids.lock().push(id.into());
	}

	/// Simulate the client going away
	pub fn disconnect(&self) {
		self.gone.notify_one();
	}
}

#[async_trait]
impl NotificationSink for RecordingSink {
	async fn send(&mut self, notification: &Notification) -> ClResult<()> {
		if self.fail_ids.lock().contains(&notification.id) {
			return Err(Error::SendFailure("broken pipe".into()));
		}
		self.sent.lock().push(notification.id.clone());
		Ok(())
	}

	async fn closed(&self) {
		self.gone.notified().await;
	}
}

// vim: ts=4
