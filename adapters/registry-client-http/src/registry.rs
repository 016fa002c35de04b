//! Member and network lookups against the registry service

use async_trait::async_trait;
use std::time::Duration;

use crate::http::JsonClient;
use distributor_types::error::ClResult;
use distributor_types::registry_client::{
	MemberClient, MemberInfo, MemberInfoResponse, NetworkClient, NetworkInfo, NetworkInfoResponse,
};

#[derive(Debug, Clone)]
pub struct HttpRegistryClient {
	http: JsonClient,
}

impl HttpRegistryClient {
	pub fn new(registry_url: &str, timeout: Duration) -> ClResult<Self> {
		Ok(Self { http: JsonClient::new(registry_url, timeout)? })
	}
}

#[async_trait]
impl MemberClient for HttpRegistryClient {
	async fn get_by_user_id(&self, user_id: &str) -> ClResult<MemberInfo> {
		let res: MemberInfoResponse = self.http.get(&["v1", "members", "user", user_id]).await?;
		Ok(res.member)
	}
}

#[async_trait]
impl NetworkClient for HttpRegistryClient {
	async fn get(&self, network_id: &str) -> ClResult<NetworkInfo> {
		let res: NetworkInfoResponse = self.http.get(&["v1", "networks", network_id]).await?;
		Ok(res.network)
	}
}

// vim: ts=4
