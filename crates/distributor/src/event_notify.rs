//! Detail lookup over the event-notify gRPC service

use async_trait::async_trait;
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};

use distributor_proto::eventnotify::v1 as enpb;
use distributor_proto::eventnotify::v1::event_to_notify_service_client::EventToNotifyServiceClient;
use distributor_types::detail_lookup::DetailLookup;
use distributor_types::notification::NotificationDetail;

use crate::prelude::*;

/// Event-notify client. The channel connects lazily, so an unreachable
/// service surfaces as lookup failures rather than a startup error.
#[derive(Debug, Clone)]
pub struct EventNotifyLookup {
	client: EventToNotifyServiceClient<Channel>,
}

impl EventNotifyLookup {
	pub fn connect_lazy(url: &str, timeout: Duration) -> ClResult<Self> {
		let endpoint = Endpoint::from_shared(url.to_string())
			.map_err(|err| Error::ConfigError(format!("invalid event-notify url {}: {}", url, err)))?
			.connect_timeout(timeout)
			.timeout(timeout);

		Ok(Self { client: EventToNotifyServiceClient::new(endpoint.connect_lazy()) })
	}
}

#[async_trait]
impl DetailLookup for EventNotifyLookup {
	async fn get(&self, id: &str) -> ClResult<NotificationDetail> {
		let mut client = self.client.clone();
		let res = client.get(enpb::GetRequest { id: id.to_string() }).await.map_err(|status| {
			match Error::from(status) {
				err @ Error::Timeout => err,
				err => Error::LookupFailure(err.to_string()),
			}
		})?;

		let notification = res
			.into_inner()
			.notification
			.ok_or_else(|| Error::LookupFailure(format!("empty response for {}", id)))?;
		Ok(detail_from_proto(notification))
	}
}

pub fn detail_from_proto(notification: enpb::Notification) -> NotificationDetail {
	NotificationDetail {
		id: notification.id.into(),
		title: notification.title.into(),
		description: notification.description.into(),
		org_id: notification.org_id.into(),
		network_id: notification.network_id.into(),
		subscriber_id: notification.subscriber_id.into(),
		user_id: notification.user_id.into(),
		for_role: RoleType::parse(&notification.for_role),
		notification_type: NotificationType::parse(&notification.r#type),
		scope: Scope::parse(&notification.scope),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_detail_from_proto() {
		let detail = detail_from_proto(enpb::Notification {
			id: "n-1".into(),
			title: "Node offline".into(),
			org_id: "o1".into(),
			network_id: "net-1".into(),
			for_role: "ROLE_OWNER".into(),
			r#type: "TYPE_WARNING".into(),
			scope: "SCOPE_NETWORK".into(),
			..enpb::Notification::default()
		});

		assert_eq!(detail.id.as_ref(), "n-1");
		assert_eq!(detail.for_role, RoleType::Owner);
		assert_eq!(detail.notification_type, NotificationType::Warning);
		assert_eq!(detail.scope, Some(Scope::Network));
	}

	#[test]
	fn test_detail_from_proto_unknown_scope() {
		let detail = detail_from_proto(enpb::Notification {
			id: "n-2".into(),
			scope: "SCOPE_INVALID".into(),
			..enpb::Notification::default()
		});
		assert_eq!(detail.scope, None);
		assert_eq!(detail.notification_type, NotificationType::Invalid);
	}

	#[tokio::test]
	async fn test_invalid_url() {
		let res = EventNotifyLookup::connect_lazy("not a url", Duration::from_secs(1));
		assert!(matches!(res, Err(Error::ConfigError(_))));
	}
}

// vim: ts=4
