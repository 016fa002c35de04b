//! Platform enumerations: notification scope, notification type, member role
//!
//! Wire names follow the platform protobuf enums (`SCOPE_ORG`, `ROLE_OWNER`,
//! ...). Parsing is lenient: the canonical name and the bare lower-case name
//! are both accepted, case-insensitively.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Coarse-to-fine audience selector of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
	Owner = 1,
	Org = 2,
	Networks = 3,
	Network = 4,
	Sites = 5,
	Site = 6,
	Subscribers = 7,
	Subscriber = 8,
	Users = 9,
	User = 10,
	Node = 11,
}

impl Scope {
	pub const ALL: [Scope; 11] = [
		Scope::Owner,
		Scope::Org,
		Scope::Networks,
		Scope::Network,
		Scope::Sites,
		Scope::Site,
		Scope::Subscribers,
		Scope::Subscriber,
		Scope::Users,
		Scope::User,
		Scope::Node,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Scope::Owner => "SCOPE_OWNER",
			Scope::Org => "SCOPE_ORG",
			Scope::Networks => "SCOPE_NETWORKS",
			Scope::Network => "SCOPE_NETWORK",
			Scope::Sites => "SCOPE_SITES",
			Scope::Site => "SCOPE_SITE",
			Scope::Subscribers => "SCOPE_SUBSCRIBERS",
			Scope::Subscriber => "SCOPE_SUBSCRIBER",
			Scope::Users => "SCOPE_USERS",
			Scope::User => "SCOPE_USER",
			Scope::Node => "SCOPE_NODE",
		}
	}

	/// Parse a scope name. `SCOPE_INVALID` and unknown names yield `None`.
	pub fn parse(name: &str) -> Option<Scope> {
		let name = name.trim();
		let bare = strip_prefix_ci(name, "SCOPE_").unwrap_or(name);
		Scope::ALL.into_iter().find(|scope| scope.as_str()[6..].eq_ignore_ascii_case(bare))
	}

	/// Map a protobuf enum value to a scope
	pub fn from_value(value: i32) -> Option<Scope> {
		Scope::ALL.into_iter().find(|scope| *scope as i32 == value)
	}
}

impl fmt::Display for Scope {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl AsRef<str> for Scope {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}

impl FromStr for Scope {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Scope::parse(s).ok_or_else(|| Error::ValidationError(format!("unknown scope {}", s)))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NotificationType {
	#[default]
	Invalid,
	Info,
	Warning,
	Error,
	Critical,
}

impl NotificationType {
	pub fn as_str(self) -> &'static str {
		match self {
			NotificationType::Invalid => "TYPE_INVALID",
			NotificationType::Info => "TYPE_INFO",
			NotificationType::Warning => "TYPE_WARNING",
			NotificationType::Error => "TYPE_ERROR",
			NotificationType::Critical => "TYPE_CRITICAL",
		}
	}

	pub fn parse(name: &str) -> NotificationType {
		let name = name.trim();
		let bare = strip_prefix_ci(name, "TYPE_").unwrap_or(name);
		[
			NotificationType::Info,
			NotificationType::Warning,
			NotificationType::Error,
			NotificationType::Critical,
		]
		.into_iter()
		.find(|t| t.as_str()[5..].eq_ignore_ascii_case(bare))
		.unwrap_or_default()
	}
}

impl fmt::Display for NotificationType {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Role of the identity opening a notification stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoleType {
	#[default]
	Invalid,
	Owner,
	Admin,
	NetworkOwner,
	Vendor,
	Users,
	Subscriber,
}

impl RoleType {
	pub fn as_str(self) -> &'static str {
		match self {
			RoleType::Invalid => "ROLE_INVALID",
			RoleType::Owner => "ROLE_OWNER",
			RoleType::Admin => "ROLE_ADMIN",
			RoleType::NetworkOwner => "ROLE_NETWORK_OWNER",
			RoleType::Vendor => "ROLE_VENDOR",
			RoleType::Users => "ROLE_USERS",
			RoleType::Subscriber => "ROLE_SUBSCRIBER",
		}
	}

	/// Parse a role name, unknown names map to `RoleType::Invalid`
	pub fn parse(name: &str) -> RoleType {
		let name = name.trim();
		let bare = strip_prefix_ci(name, "ROLE_").unwrap_or(name);
		[
			RoleType::Owner,
			RoleType::Admin,
			RoleType::NetworkOwner,
			RoleType::Vendor,
			RoleType::Users,
			RoleType::Subscriber,
		]
		.into_iter()
		.find(|role| role.as_str()[5..].eq_ignore_ascii_case(bare))
		.unwrap_or_default()
	}

	pub fn is_valid(self) -> bool {
		self != RoleType::Invalid
	}

	/// Scopes a role receives when a client does not ask for any
	pub fn default_scopes(self) -> &'static [Scope] {
		match self {
			RoleType::Owner | RoleType::Admin => &[
				Scope::Org,
				Scope::Network,
				Scope::Site,
				Scope::Subscriber,
				Scope::User,
				Scope::Node,
			],
			RoleType::NetworkOwner => &[Scope::Network, Scope::Site, Scope::Subscriber, Scope::Node],
			RoleType::Vendor => &[Scope::Network],
			RoleType::Users => &[Scope::User],
			RoleType::Subscriber => &[Scope::Subscriber],
			RoleType::Invalid => &[],
		}
	}
}

impl fmt::Display for RoleType {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
	if s.len() >= prefix.len() && s.is_char_boundary(prefix.len()) {
		let (head, tail) = s.split_at(prefix.len());
		head.eq_ignore_ascii_case(prefix).then_some(tail)
	} else {
		None
	}
}


// vim: ts=4
