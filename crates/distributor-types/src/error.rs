//! Error type shared by every distributor crate

use std::fmt;

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// Subscription (or remote entity) does not exist
	NotFound,
	PermissionDenied,
	ValidationError(String),
	/// Notification detail could not be fetched for a change event
	LookupFailure(String),
	/// Change feed connection failed or was lost
	FeedTransport(String),
	/// Sending to a client stream failed
	SendFailure(String),
	Timeout,
	NetworkError(String),
	ServiceUnavailable(String),
	ConfigError(String),
	Parse(String),
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::LookupFailure(msg) => write!(f, "lookup failure: {}", msg),
			Error::FeedTransport(msg) => write!(f, "change feed transport error: {}", msg),
			Error::SendFailure(msg) => write!(f, "send failure: {}", msg),
			Error::Timeout => write!(f, "timeout"),
			Error::NetworkError(msg) => write!(f, "network error: {}", msg),
			Error::ServiceUnavailable(msg) => write!(f, "service unavailable: {}", msg),
			Error::ConfigError(msg) => write!(f, "config error: {}", msg),
			Error::Parse(msg) => write!(f, "parse error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			_ => None,
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Parse(err.to_string())
	}
}

impl From<tokio::time::error::Elapsed> for Error {
	fn from(_: tokio::time::error::Elapsed) -> Self {
		Self::Timeout
	}
}

#[cfg(feature = "grpc")]
impl From<Error> for tonic::Status {
	fn from(err: Error) -> Self {
		match err {
			Error::ValidationError(msg) => tonic::Status::invalid_argument(msg),
			Error::NotFound => tonic::Status::not_found("not found"),
			Error::PermissionDenied => tonic::Status::permission_denied("permission denied"),
			Error::Timeout => tonic::Status::deadline_exceeded("timeout"),
			Error::ServiceUnavailable(msg) | Error::FeedTransport(msg) => {
				tonic::Status::unavailable(msg)
			}
			err => tonic::Status::internal(err.to_string()),
		}
	}
}

#[cfg(feature = "grpc")]
impl From<tonic::Status> for Error {
	fn from(status: tonic::Status) -> Self {
		match status.code() {
			tonic::Code::NotFound => Error::NotFound,
			tonic::Code::PermissionDenied | tonic::Code::Unauthenticated => {
				Error::PermissionDenied
			}
			tonic::Code::InvalidArgument => Error::ValidationError(status.message().to_string()),
			tonic::Code::DeadlineExceeded => Error::Timeout,
			tonic::Code::Unavailable => Error::ServiceUnavailable(status.message().to_string()),
			code => Error::NetworkError(format!("{:?}: {}", code, status.message())),
		}
	}
}


// vim: ts=4
