//! Notification value delivered to subscribers

use crate::types::{NotificationType, RoleType, Scope};

/// Notification attributes as returned by the detail lookup service
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotificationDetail {
	pub id: Box<str>,
	pub title: Box<str>,
	pub description: Box<str>,
	pub org_id: Box<str>,
	pub network_id: Box<str>,
	pub subscriber_id: Box<str>,
	pub user_id: Box<str>,
	pub for_role: RoleType,
	pub notification_type: NotificationType,
	/// `None` when the upstream scope is missing or unknown
	pub scope: Option<Scope>,
}

/// Enriched notification, immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
	pub id: Box<str>,
	pub title: Box<str>,
	pub description: Box<str>,
	pub org_id: Box<str>,
	pub network_id: Box<str>,
	pub subscriber_id: Box<str>,
	pub user_id: Box<str>,
	pub for_role: RoleType,
	pub notification_type: NotificationType,
	pub scope: Scope,
	pub is_read: bool,
}

impl Notification {
	/// Create a bare notification, mostly useful for tests and synthetic events
	pub fn new(id: impl Into<Box<str>>, scope: Scope) -> Self {
		Self {
			id: id.into(),
			title: "".into(),
			description: "".into(),
			org_id: "".into(),
			network_id: "".into(),
			subscriber_id: "".into(),
			user_id: "".into(),
			for_role: RoleType::Invalid,
			notification_type: NotificationType::Info,
			scope,
			is_read: false,
		}
	}

	/// Build a notification from looked-up details.
	///
	/// Returns `None` if the detail carries no valid scope, such a
	/// notification could never be routed.
	pub fn from_detail(detail: NotificationDetail, is_read: bool) -> Option<Self> {
		let scope = detail.scope?;
		Some(Self {
			id: detail.id,
			title: detail.title,
			description: detail.description,
			org_id: detail.org_id,
			network_id: detail.network_id,
			subscriber_id: detail.subscriber_id,
			user_id: detail.user_id,
			for_role: detail.for_role,
			notification_type: detail.notification_type,
			scope,
			is_read,
		})
	}

	pub fn with_title(mut self, title: impl Into<Box<str>>) -> Self {
		self.title = title.into();
		self
	}

	pub fn with_org(mut self, org_id: impl Into<Box<str>>) -> Self {
		self.org_id = org_id.into();
		self
	}

	pub fn with_network(mut self, network_id: impl Into<Box<str>>) -> Self {
		self.network_id = network_id.into();
		self
	}

	pub fn with_subscriber(mut self, subscriber_id: impl Into<Box<str>>) -> Self {
		self.subscriber_id = subscriber_id.into();
		self
	}

	pub fn with_user(mut self, user_id: impl Into<Box<str>>) -> Self {
		self.user_id = user_id.into();
		self
	}
}


// vim: ts=4
