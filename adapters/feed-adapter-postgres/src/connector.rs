//! Connection seam between the feed stream and the database

use async_trait::async_trait;
use sqlx::postgres::{PgListener, PgPoolOptions};
use std::time::Duration;

use crate::error::Error;

/// An open, listening feed connection
#[async_trait]
pub trait FeedConnection: Send {
	/// Wait for the next payload. `Ok(None)` means the server closed the
	/// connection.
	async fn next_payload(&mut self) -> Result<Option<Box<str>>, Error>;
}

/// Opens feed connections already listening on a channel
#[async_trait]
pub trait FeedConnector: Send + Sync + 'static {
	type Connection: FeedConnection + 'static;

	async fn connect(&self, channel: &str) -> Result<Self::Connection, Error>;
}

#[async_trait]
impl FeedConnection for PgListener {
	async fn next_payload(&mut self) -> Result<Option<Box<str>>, Error> {
		match self.try_recv().await {
			Ok(notification) => Ok(notification.map(|n| n.payload().into())),
			Err(err) => Err(Error::Receive(err.to_string())),
		}
	}
}

/// `LISTEN` connections on a single-connection pool.
///
/// `connect_timeout` bounds each attempt; a refused connection fails once
/// the pool gives up acquiring instead of retrying in the background.
#[derive(Clone)]
pub struct PgConnector {
	database_url: Box<str>,
	connect_timeout: Duration,
}

impl PgConnector {
	pub fn new(database_url: impl Into<Box<str>>, connect_timeout: Duration) -> Self {
		Self { database_url: database_url.into(), connect_timeout }
	}
}

// The connection string carries credentials, keep it out of logs
impl std::fmt::Debug for PgConnector {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PgConnector")
			.field("database_url", &"<redacted>")
			.field("connect_timeout", &self.connect_timeout)
			.finish()
	}
}

#[async_trait]
impl FeedConnector for PgConnector {
	type Connection = PgListener;

	async fn connect(&self, channel: &str) -> Result<PgListener, Error> {
		let pool = PgPoolOptions::new()
			.max_connections(1)
			.acquire_timeout(self.connect_timeout)
			.connect_lazy(&self.database_url)
			.map_err(|e| Error::Connect(e.to_string()))?;
		let mut listener =
			PgListener::connect_with(&pool).await.map_err(|e| Error::Connect(e.to_string()))?;
		listener.listen(channel).await.map_err(|e| Error::Listen(e.to_string()))?;
		Ok(listener)
	}
}

// vim: ts=4
