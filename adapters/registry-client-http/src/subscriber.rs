//! Subscriber lookups against the subscriber registry

use async_trait::async_trait;
use std::time::Duration;

use crate::http::JsonClient;
use distributor_types::error::ClResult;
use distributor_types::registry_client::{SubscriberClient, SubscriberInfo, SubscriberInfoResponse};

#[derive(Debug, Clone)]
pub struct HttpSubscriberClient {
	http: JsonClient,
}

impl HttpSubscriberClient {
	pub fn new(subscriber_url: &str, timeout: Duration) -> ClResult<Self> {
		Ok(Self { http: JsonClient::new(subscriber_url, timeout)? })
	}
}

#[async_trait]
impl SubscriberClient for HttpSubscriberClient {
	async fn get(&self, subscriber_id: &str) -> ClResult<SubscriberInfo> {
		let res: SubscriberInfoResponse =
			self.http.get(&["v1", "subscriber", subscriber_id]).await?;
		Ok(res.subscriber)
	}
}

// vim: ts=4
