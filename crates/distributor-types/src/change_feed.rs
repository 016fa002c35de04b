//! Change feed collaborator: asynchronous push notification of store mutations
//!
//! A feed is opened on a channel name and yields [`FeedEvent`]s until it is
//! dropped. Reconnection after transport loss is the feed's own business,
//! consumers only observe `Disconnected` / `Reconnected` markers between
//! payloads.
//!
//! # Payload format
//!
//! Two payload encodings are understood by [`ChangeEvent::parse`]:
//!
//! ```text
//! {"v":1,"action":"INSERT","id":"<entity id>","is_read":false}   versioned JSON
//! INSERT,<entity id>,false[,extra...]                             legacy positional
//! ```

use async_trait::async_trait;
use futures_core::Stream;
use serde::Deserialize;
use std::fmt::Debug;
use std::pin::Pin;

use crate::prelude::*;

pub const PAYLOAD_VERSION: u32 = 1;

/// Item yielded by a change feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
	/// Raw trigger payload of one change notification
	Payload(Box<str>),
	/// Transport lost; the feed is reconnecting with backoff
	Disconnected { reason: Box<str> },
	/// Transport re-established after `attempts` tries
	Reconnected { attempts: u32 },
}

pub type FeedStream = Pin<Box<dyn Stream<Item = FeedEvent> + Send>>;

#[async_trait]
pub trait ChangeFeed: Debug + Send + Sync {
	/// Open the feed on `channel`.
	///
	/// Errors are returned only for the initial connection, once the stream
	/// is handed out transport failures are retried internally.
	async fn listen(&self, channel: &str) -> ClResult<FeedStream>;
}

/// Row operation reported by the trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
	Insert,
	Update,
	Delete,
	Other,
}

impl ChangeAction {
	pub fn parse(s: &str) -> ChangeAction {
		match s.trim().to_ascii_uppercase().as_str() {
			"INSERT" => ChangeAction::Insert,
			"UPDATE" => ChangeAction::Update,
			"DELETE" => ChangeAction::Delete,
			_ => ChangeAction::Other,
		}
	}
}

/// Parsed change notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
	pub action: ChangeAction,
	pub entity_id: Box<str>,
	pub is_read: bool,
	/// Trailing positional fields of a legacy payload
	pub extra: Vec<Box<str>>,
}

#[derive(Deserialize)]
struct PayloadV1 {
	v: u32,
	action: String,
	id: String,
	#[serde(default)]
	is_read: bool,
}

impl ChangeEvent {
	pub fn parse(payload: &str) -> ClResult<ChangeEvent> {
		let payload = payload.trim();
		if payload.starts_with('{') {
			Self::parse_json(payload)
		} else {
			Self::parse_positional(payload)
		}
	}

	fn parse_json(payload: &str) -> ClResult<ChangeEvent> {
		let parsed: PayloadV1 = serde_json::from_str(payload)?;
		if parsed.v != PAYLOAD_VERSION {
			return Err(Error::Parse(format!("unsupported payload version {}", parsed.v)));
		}
		let entity_id = parsed.id.trim();
		if entity_id.is_empty() {
			return Err(Error::Parse("empty entity id".into()));
		}

		Ok(ChangeEvent {
			action: ChangeAction::parse(&parsed.action),
			entity_id: entity_id.into(),
			is_read: parsed.is_read,
			extra: Vec::new(),
		})
	}

	fn parse_positional(payload: &str) -> ClResult<ChangeEvent> {
		let fields: Vec<&str> = payload.split(',').map(str::trim).collect();
		let [action, entity_id, is_read, extra @ ..] = fields.as_slice() else {
			return Err(Error::Parse(format!(
				"expected at least 3 fields, got {}: {:?}",
				fields.len(),
				payload
			)));
		};
		if entity_id.is_empty() {
			return Err(Error::Parse("empty entity id".into()));
		}

		Ok(ChangeEvent {
			action: ChangeAction::parse(action),
			entity_id: (*entity_id).into(),
			is_read: parse_flag(is_read)?,
			extra: extra.iter().map(|field| (*field).into()).collect(),
		})
	}
}

fn parse_flag(s: &str) -> ClResult<bool> {
	match s.to_ascii_lowercase().as_str() {
		"true" | "t" | "1" => Ok(true),
		"false" | "f" | "0" => Ok(false),
		_ => Err(Error::Parse(format!("invalid is_read flag {:?}", s))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_positional() {
		let event = ChangeEvent::parse("INSERT,5c2b3b4e,false").expect("valid payload");
		assert_eq!(event.action, ChangeAction::Insert);
		assert_eq!(event.entity_id.as_ref(), "5c2b3b4e");
		assert!(!event.is_read);
		assert!(event.extra.is_empty());
	}

	#[test]
	fn test_parse_positional_extra_fields() {
		let event = ChangeEvent::parse("update, n-1 ,t,user-9,org-2").expect("valid payload");
		assert_eq!(event.action, ChangeAction::Update);
		assert_eq!(event.entity_id.as_ref(), "n-1");
		assert!(event.is_read);
		assert_eq!(event.extra, vec![Box::from("user-9"), Box::from("org-2")]);
	}

	#[test]
	fn test_parse_positional_too_short() {
		assert!(matches!(ChangeEvent::parse("INSERT,n-1"), Err(Error::Parse(_))));
		assert!(matches!(ChangeEvent::parse(""), Err(Error::Parse(_))));
		assert!(matches!(ChangeEvent::parse("INSERT,,false"), Err(Error::Parse(_))));
		assert!(matches!(ChangeEvent::parse("INSERT,n-1,maybe"), Err(Error::Parse(_))));
	}

	#[test]
	fn test_parse_json() {
		let event = ChangeEvent::parse(r#"{"v":1,"action":"DELETE","id":"n-7","is_read":true}"#)
			.expect("valid payload");
		assert_eq!(event.action, ChangeAction::Delete);
		assert_eq!(event.entity_id.as_ref(), "n-7");
		assert!(event.is_read);

		let event = ChangeEvent::parse(r#"{"v":1,"action":"INSERT","id":"n-8"}"#)
			.expect("is_read defaults to false");
		assert!(!event.is_read);
	}

	#[test]
	fn test_parse_json_rejects_unknown_version() {
		let res = ChangeEvent::parse(r#"{"v":2,"action":"INSERT","id":"n-7"}"#);
		assert!(matches!(res, Err(Error::Parse(_))));

		let res = ChangeEvent::parse(r#"{"v":1,"action":"INSERT"}"#);
		assert!(matches!(res, Err(Error::Parse(_))));
	}
}

// vim: ts=4
