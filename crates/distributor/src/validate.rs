//! Stream request validation
//!
//! Resolves the identity behind a stream request against the platform
//! registries and produces the filter the subscription is registered with.

use std::sync::Arc;

use distributor_types::registry_client::{MemberClient, NetworkClient, SubscriberClient};

use crate::prelude::*;

/// Stream request as received from a client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamRequest {
	pub org_id: String,
	pub network_id: String,
	pub subscriber_id: String,
	pub user_id: String,
	pub scopes: Vec<String>,
}

/// Validated subscription filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
	pub org_id: Box<str>,
	pub network_id: Box<str>,
	pub subscriber_id: Box<str>,
	pub user_id: Box<str>,
	pub role: RoleType,
	pub scopes: Vec<Box<str>>,
}

#[derive(Debug, Clone)]
pub struct RequestValidator {
	org_id: Box<str>,
	members: Arc<dyn MemberClient>,
	networks: Arc<dyn NetworkClient>,
	subscribers: Arc<dyn SubscriberClient>,
}

impl RequestValidator {
	pub fn new(
		org_id: impl Into<Box<str>>,
		members: Arc<dyn MemberClient>,
		networks: Arc<dyn NetworkClient>,
		subscribers: Arc<dyn SubscriberClient>,
	) -> Self {
		Self { org_id: org_id.into(), members, networks, subscribers }
	}

	pub async fn validate(&self, req: &StreamRequest) -> ClResult<Registration> {
		let org_id = req.org_id.trim();
		if !org_id.is_empty() && org_id != self.org_id.as_ref() {
			return Err(Error::ValidationError("invalid org id".into()));
		}

		let user_id = req.user_id.trim();
		let subscriber_id = req.subscriber_id.trim();
		let network_id = req.network_id.trim();

		let role = if !subscriber_id.is_empty() {
			self.subscribers.get(subscriber_id).await.map_err(|err| {
				debug!(subscriber_id = %subscriber_id, error = %err, "subscriber lookup failed");
				Error::ValidationError("invalid subscriber id".into())
			})?;
			RoleType::Subscriber
		} else if !user_id.is_empty() {
			let member = self.members.get_by_user_id(user_id).await.map_err(|err| {
				debug!(user_id = %user_id, error = %err, "member lookup failed");
				Error::ValidationError("invalid user id".into())
			})?;
			if member.is_deactivated {
				warn!(user_id = %user_id, "deactivated member requested a notification stream");
				return Err(Error::PermissionDenied);
			}
			member.role_type()
		} else {
			RoleType::Invalid
		};

		if !role.is_valid() {
			return Err(Error::ValidationError("invalid role for user".into()));
		}

		if !network_id.is_empty() {
			self.networks.get(network_id).await.map_err(|err| {
				debug!(network_id = %network_id, error = %err, "network lookup failed");
				Error::ValidationError("invalid network id".into())
			})?;
		}

		let scopes: Vec<Box<str>> = if req.scopes.iter().all(|scope| scope.trim().is_empty()) {
			role.default_scopes().iter().map(|scope| scope.as_str().into()).collect()
		} else {
			req.scopes.iter().map(|scope| scope.trim().into()).collect()
		};

		// subscribers are addressed by subscriber id, members by user id
		let (subscriber_id, user_id) = if role == RoleType::Subscriber {
			(subscriber_id, "")
		} else {
			("", user_id)
		};

		Ok(Registration {
			org_id: self.org_id.clone(),
			network_id: network_id.into(),
			subscriber_id: subscriber_id.into(),
			user_id: user_id.into(),
			role,
			scopes,
		})
	}
}

// vim: ts=4
