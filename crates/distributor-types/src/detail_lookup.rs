//! Detail lookup collaborator: resolves a changed entity id to its full
//! notification attributes

use async_trait::async_trait;
use std::fmt::Debug;

use crate::notification::NotificationDetail;
use crate::prelude::*;

#[async_trait]
pub trait DetailLookup: Debug + Send + Sync {
	/// Fetch notification details by entity id.
	///
	/// Implementations apply their own per-call timeout and report it as
	/// `Error::Timeout`.
	async fn get(&self, id: &str) -> ClResult<NotificationDetail>;
}

// vim: ts=4
