//! Notification distributor gRPC service.
//!
//! Clients open a server-streaming `GetNotificationStream` call. Every call
//! is validated against the platform registries, registered with the
//! subscription registry and then fed from its private queue until the
//! client goes away or the server shuts down.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod config;
pub mod event_notify;
pub mod prelude;
pub mod service;
pub mod stream;
pub mod validate;

pub use app::AppBuilder;
pub use config::DistributorConfig;

pub use distributor_core as core;
pub use distributor_types as types;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// vim: ts=4
