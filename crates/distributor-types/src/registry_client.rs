//! Identity lookups used to resolve the context of a stream request
//!
//! Member, network and subscriber records live in other platform services
//! and are only ever read here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::prelude::*;

/// Organization member record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
	pub member_id: Box<str>,
	pub user_id: Box<str>,
	/// Wire role name (`ROLE_OWNER`, ...)
	pub role: Box<str>,
	#[serde(default)]
	pub is_deactivated: bool,
	#[serde(default)]
	pub created_at: Option<Box<str>>,
}

impl MemberInfo {
	pub fn role_type(&self) -> RoleType {
		RoleType::parse(&self.role)
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberInfoResponse {
	pub member: MemberInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
	pub id: Box<str>,
	pub name: Box<str>,
	#[serde(default)]
	pub org_id: Box<str>,
	#[serde(default)]
	pub is_deactivated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkInfoResponse {
	pub network: NetworkInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberInfo {
	pub subscriber_id: Box<str>,
	#[serde(default)]
	pub name: Box<str>,
	#[serde(default)]
	pub network_id: Box<str>,
	#[serde(default)]
	pub email: Box<str>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriberInfoResponse {
	pub subscriber: SubscriberInfo,
}

#[async_trait]
pub trait MemberClient: Debug + Send + Sync {
	async fn get_by_user_id(&self, user_id: &str) -> ClResult<MemberInfo>;
}

#[async_trait]
pub trait NetworkClient: Debug + Send + Sync {
	async fn get(&self, network_id: &str) -> ClResult<NetworkInfo>;
}

#[async_trait]
pub trait SubscriberClient: Debug + Send + Sync {
	async fn get(&self, subscriber_id: &str) -> ClResult<SubscriberInfo>;
}


// vim: ts=4
