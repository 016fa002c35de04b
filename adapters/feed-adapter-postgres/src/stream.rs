//! Feed stream with reconnect handling

use async_stream::stream;
use tracing::{debug, info, warn};

use crate::connector::{FeedConnection, FeedConnector};
use distributor_types::backoff::ReconnectPolicy;
use distributor_types::change_feed::{FeedEvent, FeedStream};

/// Reconnect with backoff until the channel is listened on again.
///
/// Returns the new connection and the number of attempts it took.
async fn reconnect<C: FeedConnector>(
	connector: &C,
	channel: &str,
	policy: ReconnectPolicy,
) -> (C::Connection, u32) {
	let mut attempts: u32 = 0;
	loop {
		attempts = attempts.saturating_add(1);
		let delay = policy.delay_for_attempt(attempts);
		debug!(channel, attempts, delay_ms = delay.as_millis(), "Waiting before reconnect");
		tokio::time::sleep(delay).await;

		match connector.connect(channel).await {
			Ok(connection) => return (connection, attempts),
			Err(err) => warn!(channel, attempts, error = %err, "Change feed reconnect failed"),
		}
	}
}

/// Turn an open connection into a [`FeedStream`] that survives connection loss.
pub fn feed_stream<C: FeedConnector>(
	connector: C,
	connection: C::Connection,
	channel: Box<str>,
	policy: ReconnectPolicy,
) -> FeedStream {
	Box::pin(stream! {
		let mut connection = connection;
		loop {
			let reason = match connection.next_payload().await {
				Ok(Some(payload)) => {
					yield FeedEvent::Payload(payload);
					continue;
				}
				Ok(None) => "connection closed".to_string(),
				Err(err) => err.to_string(),
			};

			warn!(channel = %channel, reason = %reason, "Change feed connection lost");
			yield FeedEvent::Disconnected { reason: reason.into() };

			let (next, attempts) = reconnect(&connector, &channel, policy).await;
			connection = next;
			info!(channel = %channel, attempts, "Change feed reconnected");
			yield FeedEvent::Reconnected { attempts };
		}
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::Error;
	use async_trait::async_trait;
	use futures::StreamExt;
	use std::collections::VecDeque;
	use std::sync::atomic::{AtomicU32, Ordering};
	use std::sync::{Arc, Mutex};
	use std::time::Duration;
	use tokio::time::Instant;

	/// Plays back canned receive results, then waits forever
	struct ScriptedConnection {
		script: VecDeque<Result<Option<Box<str>>, Error>>,
	}

	impl ScriptedConnection {
		fn new(script: Vec<Result<Option<&str>, Error>>) -> Self {
			let script = script.into_iter().map(|item| item.map(|p| p.map(Box::from))).collect();
			Self { script }
		}
	}

	#[async_trait]
	impl FeedConnection for ScriptedConnection {
		async fn next_payload(&mut self) -> Result<Option<Box<str>>, Error> {
			match self.script.pop_front() {
				Some(item) => item,
				None => std::future::pending().await,
			}
		}
	}

	/// Refuses the first `failures` connects, then hands out `connection`
	struct ScriptedConnector {
		failures: AtomicU32,
		connection: Mutex<Option<ScriptedConnection>>,
		attempted_at: Arc<Mutex<Vec<Instant>>>,
	}

	impl ScriptedConnector {
		fn new(failures: u32, connection: ScriptedConnection) -> Self {
			Self {
				failures: AtomicU32::new(failures),
				connection: Mutex::new(Some(connection)),
				attempted_at: Arc::new(Mutex::new(Vec::new())),
			}
		}
	}

	#[async_trait]
	impl FeedConnector for ScriptedConnector {
		type Connection = ScriptedConnection;

		async fn connect(&self, _channel: &str) -> Result<ScriptedConnection, Error> {
			self.attempted_at.lock().unwrap().push(Instant::now());
			if self.failures.load(Ordering::SeqCst) > 0 {
				self.failures.fetch_sub(1, Ordering::SeqCst);
				return Err(Error::Connect("connection refused".into()));
			}
			Ok(self
				.connection
				.lock()
				.unwrap()
				.take()
				.unwrap_or_else(|| ScriptedConnection::new(vec![])))
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_reconnect_after_connection_closed() {
		let policy = ReconnectPolicy::new(Duration::from_secs(1), Duration::from_secs(4));
		let first = ScriptedConnection::new(vec![Ok(Some("a")), Ok(None)]);
		let connector = ScriptedConnector::new(3, ScriptedConnection::new(vec![Ok(Some("b"))]));
		let attempted_at = Arc::clone(&connector.attempted_at);

		let start = Instant::now();
		let mut stream = feed_stream(connector, first, "notifications".into(), policy);

		assert_eq!(stream.next().await, Some(FeedEvent::Payload("a".into())));
		assert_eq!(
			stream.next().await,
			Some(FeedEvent::Disconnected { reason: "connection closed".into() })
		);
		assert_eq!(stream.next().await, Some(FeedEvent::Reconnected { attempts: 4 }));
		assert_eq!(stream.next().await, Some(FeedEvent::Payload("b".into())));

		// waits of 1s, 2s, 4s and 4s precede the four attempts
		let offsets: Vec<Duration> =
			attempted_at.lock().unwrap().iter().map(|at| at.duration_since(start)).collect();
		assert_eq!(
			offsets,
			vec![
				Duration::from_secs(1),
				Duration::from_secs(3),
				Duration::from_secs(7),
				Duration::from_secs(11),
			]
		);
	}

	#[tokio::test(start_paused = true)]
	async fn test_receive_error_reconnects() {
		let policy = ReconnectPolicy::new(Duration::from_millis(500), Duration::from_secs(10));
		let first = ScriptedConnection::new(vec![Err(Error::Receive("connection reset".into()))]);
		let connector = ScriptedConnector::new(0, ScriptedConnection::new(vec![Ok(Some("c"))]));

		let start = Instant::now();
		let mut stream = feed_stream(connector, first, "notifications".into(), policy);

		assert_eq!(
			stream.next().await,
			Some(FeedEvent::Disconnected { reason: "receive failed: connection reset".into() })
		);
		assert_eq!(stream.next().await, Some(FeedEvent::Reconnected { attempts: 1 }));
		assert_eq!(start.elapsed(), Duration::from_millis(500));
		assert_eq!(stream.next().await, Some(FeedEvent::Payload("c".into())));
	}

	#[tokio::test(start_paused = true)]
	async fn test_repeated_loss() {
		let policy = ReconnectPolicy::new(Duration::from_secs(1), Duration::from_secs(1));
		let first = ScriptedConnection::new(vec![Ok(None)]);
		let connector =
			ScriptedConnector::new(0, ScriptedConnection::new(vec![Ok(Some("d")), Ok(None)]));
		let mut stream = feed_stream(connector, first, "notifications".into(), policy);

		let mut events = Vec::new();
		for _ in 0..5 {
			events.push(stream.next().await.unwrap());
		}
		assert_eq!(
			events,
			vec![
				FeedEvent::Disconnected { reason: "connection closed".into() },
				FeedEvent::Reconnected { attempts: 1 },
				FeedEvent::Payload("d".into()),
				FeedEvent::Disconnected { reason: "connection closed".into() },
				FeedEvent::Reconnected { attempts: 1 },
			]
		);
	}
}

// vim: ts=4
