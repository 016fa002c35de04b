use distributor_types::error::Error as DistributorError;
use std::fmt;

/// Internal error type for the postgres change feed
#[derive(Debug)]
pub enum Error {
	Connect(String),
	Listen(String),
	Receive(String),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::Connect(msg) => write!(f, "connect failed: {}", msg),
			Error::Listen(msg) => write!(f, "listen failed: {}", msg),
			Error::Receive(msg) => write!(f, "receive failed: {}", msg),
		}
	}
}

impl std::error::Error for Error {}

impl From<Error> for DistributorError {
	fn from(e: Error) -> Self {
		DistributorError::FeedTransport(e.to_string())
	}
}

// vim: ts=4
