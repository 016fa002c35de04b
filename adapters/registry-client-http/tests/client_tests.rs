//! Registry clients against a canned HTTP responder

use distributor_registry_client_http::{HttpRegistryClient, HttpSubscriberClient};
use distributor_types::error::Error;
use distributor_types::registry_client::{MemberClient, NetworkClient, SubscriberClient};
use distributor_types::types::RoleType;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve one canned response per connection, recording request lines
struct Responder {
	url: String,
	requests: Arc<Mutex<Vec<String>>>,
}

async fn respond_with(status: &'static str, body: &'static str) -> Responder {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let url = format!("http://{}", listener.local_addr().unwrap());
	let requests = Arc::new(Mutex::new(Vec::new()));
	let seen = Arc::clone(&requests);

	tokio::spawn(async move {
		while let Ok((mut socket, _)) = listener.accept().await {
			let mut buf = vec![0u8; 4096];
			let n = socket.read(&mut buf).await.unwrap_or(0);
			let head = String::from_utf8_lossy(&buf[..n]);
			if let Some(line) = head.lines().next() {
				seen.lock().unwrap().push(line.to_string());
			}
			let response = format!(
				"HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
				status,
				body.len(),
				body
			);
			let _ = socket.write_all(response.as_bytes()).await;
			let _ = socket.shutdown().await;
		}
	});

	Responder { url, requests }
}

fn first_request(responder: &Responder) -> String {
	responder.requests.lock().unwrap().first().cloned().unwrap_or_default()
}

#[tokio::test]
async fn test_member_lookup() {
	let responder = respond_with(
		"200 OK",
		r#"{"member":{"member_id":"m-1","user_id":"u-1","role":"ROLE_OWNER","is_deactivated":false}}"#,
	)
	.await;
	let client = HttpRegistryClient::new(&responder.url, Duration::from_secs(2)).unwrap();

	let member = client.get_by_user_id("u-1").await.unwrap();
	assert_eq!(member.member_id.as_ref(), "m-1");
	assert_eq!(member.role_type(), RoleType::Owner);
	assert_eq!(first_request(&responder), "GET /v1/members/user/u-1 HTTP/1.1");
}

#[tokio::test]
async fn test_network_lookup() {
	let responder =
		respond_with("200 OK", r#"{"network":{"id":"n-1","name":"milky-way","org_id":"o-1"}}"#)
			.await;
	let client = HttpRegistryClient::new(&responder.url, Duration::from_secs(2)).unwrap();

	let network = client.get("n-1").await.unwrap();
	assert_eq!(network.name.as_ref(), "milky-way");
	assert_eq!(first_request(&responder), "GET /v1/networks/n-1 HTTP/1.1");
}

#[tokio::test]
async fn test_subscriber_lookup() {
	let responder =
		respond_with("200 OK", r#"{"subscriber":{"subscriber_id":"s-1","name":"John"}}"#).await;
	let client = HttpSubscriberClient::new(&responder.url, Duration::from_secs(2)).unwrap();

	let subscriber = client.get("s-1").await.unwrap();
	assert_eq!(subscriber.subscriber_id.as_ref(), "s-1");
	assert_eq!(first_request(&responder), "GET /v1/subscriber/s-1 HTTP/1.1");
}

#[tokio::test]
async fn test_id_cannot_escape_its_route() {
	let responder =
		respond_with("200 OK", r#"{"network":{"id":"n-1","name":"milky-way","org_id":"o-1"}}"#)
			.await;
	let client = HttpRegistryClient::new(&responder.url, Duration::from_secs(2)).unwrap();

	client.get("n-1/../../members/user/admin").await.unwrap();
	assert_eq!(
		first_request(&responder),
		"GET /v1/networks/n-1%2F..%2F..%2Fmembers%2Fuser%2Fadmin HTTP/1.1"
	);

	// a bare parent segment is refused before any request is made
	assert!(matches!(
		NetworkClient::get(&client, "..").await,
		Err(Error::ValidationError(_))
	));
	assert_eq!(responder.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_not_found() {
	let responder = respond_with("404 Not Found", r#"{"error":"member not found"}"#).await;
	let client = HttpRegistryClient::new(&responder.url, Duration::from_secs(2)).unwrap();

	assert!(matches!(client.get_by_user_id("ghost").await, Err(Error::NotFound)));
}

#[tokio::test]
async fn test_server_error() {
	let responder = respond_with("500 Internal Server Error", r#"{"error":"boom"}"#).await;
	let client = HttpSubscriberClient::new(&responder.url, Duration::from_secs(2)).unwrap();

	match client.get("s-1").await {
		Err(Error::NetworkError(msg)) => assert!(msg.contains("500")),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[tokio::test]
async fn test_malformed_body() {
	let responder = respond_with("200 OK", r#"{"member":"#).await;
	let client = HttpRegistryClient::new(&responder.url, Duration::from_secs(2)).unwrap();

	assert!(matches!(client.get_by_user_id("u-1").await, Err(Error::Parse(_))));
}

#[tokio::test]
async fn test_timeout() {
	// accepts connections but never answers
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let url = format!("http://{}", listener.local_addr().unwrap());
	tokio::spawn(async move {
		let mut held = Vec::new();
		while let Ok((socket, _)) = listener.accept().await {
			held.push(socket);
		}
	});

	let client = HttpRegistryClient::new(&url, Duration::from_millis(100)).unwrap();
	assert!(matches!(client.get_by_user_id("u-1").await, Err(Error::Timeout)));
}

// vim: ts=4
