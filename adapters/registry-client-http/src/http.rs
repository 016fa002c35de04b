//! Minimal JSON-over-HTTP GET client

use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use distributor_types::error::{ClResult, Error};

type HttpClient = Client<HttpsConnector<HttpConnector>, Empty<Bytes>>;

/// GETs JSON documents below a base URL with a per-request timeout
#[derive(Clone)]
pub struct JsonClient {
	base_url: Url,
	timeout: Duration,
	client: HttpClient,
}

impl std::fmt::Debug for JsonClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("JsonClient")
			.field("base_url", &self.base_url)
			.field("timeout", &self.timeout)
			.finish_non_exhaustive()
	}
}

fn connector() -> ClResult<HttpsConnector<HttpConnector>> {
	let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
	let builder = match HttpsConnectorBuilder::new().with_provider_and_native_roots(provider.clone())
	{
		Ok(builder) => builder,
		Err(err) => {
			// Registry endpoints are usually plain http inside the cluster
			warn!(error = %err, "No native root certificates, https endpoints will fail");
			let tls = rustls::ClientConfig::builder_with_provider(provider)
				.with_safe_default_protocol_versions()
				.map_err(|e| Error::ConfigError(format!("TLS error: {}", e)))?
				.with_root_certificates(rustls::RootCertStore::empty())
				.with_no_client_auth();
			HttpsConnectorBuilder::new().with_tls_config(tls)
		}
	};
	Ok(builder.https_or_http().enable_http1().build())
}

impl JsonClient {
	pub fn new(base_url: &str, timeout: Duration) -> ClResult<Self> {
		let invalid = || Error::ConfigError(format!("invalid service url: {}", base_url));
		let base_url = Url::parse(base_url.trim()).map_err(|_| invalid())?;
		if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
			return Err(invalid());
		}
		let client = Client::builder(TokioExecutor::new()).build(connector()?);
		Ok(Self { base_url, timeout, client })
	}

	pub fn base_url(&self) -> &str {
		self.base_url.as_str().trim_end_matches('/')
	}

	/// Absolute URL below the base, one percent-encoded path segment per item.
	///
	/// `.`, `..` and empty segments are refused so a caller supplied id can
	/// never address a different route.
	pub fn url(&self, segments: &[&str]) -> ClResult<Url> {
		if segments.iter().any(|s| matches!(*s, "" | "." | "..")) {
			return Err(Error::ValidationError(format!("invalid path segment in {:?}", segments)));
		}
		let mut url = self.base_url.clone();
		url.path_segments_mut()
			.map_err(|()| Error::ConfigError(format!("invalid service url: {}", self.base_url)))?
			.pop_if_empty()
			.extend(segments);
		Ok(url)
	}

	/// GET the document at `segments` and decode the JSON body.
	///
	/// 404 maps to [`Error::NotFound`], any other non-success status to
	/// [`Error::NetworkError`].
	pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> ClResult<T> {
		let url = self.url(segments)?;
		let request = hyper::Request::builder()
			.method(hyper::Method::GET)
			.uri(url.as_str())
			.header("Accept", "application/json")
			.body(Empty::new())
			.map_err(|e| Error::Internal(format!("Request build error: {}", e)))?;

		let body = tokio::time::timeout(self.timeout, async {
			let response = self
				.client
				.request(request)
				.await
				.map_err(|e| Error::NetworkError(format!("Network error: {}", e)))?;
			let status = response.status();
			let body = response
				.into_body()
				.collect()
				.await
				.map_err(|e| Error::NetworkError(format!("Body read error: {}", e)))?
				.to_bytes();

			if status == hyper::StatusCode::NOT_FOUND {
				return Err(Error::NotFound);
			}
			if !status.is_success() {
				let text = std::str::from_utf8(&body).unwrap_or("");
				return Err(Error::NetworkError(format!("HTTP {}: {}", status, text.trim())));
			}
			Ok(body)
		})
		.await??;

		debug!(url = %url, bytes = body.len(), "Registry lookup");
		Ok(serde_json::from_slice(&body)?)
	}
}


// vim: ts=4
