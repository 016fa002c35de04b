//! Shared types, collaborator traits, and core utilities for the notification
//! distributor.
//!
//! The distributor core, the gRPC service and every adapter crate depend on
//! this crate only, so adapters can be compiled (and swapped) independently
//! of the fan-out engine.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod backoff;
pub mod change_feed;
pub mod detail_lookup;
pub mod error;
pub mod notification;
pub mod prelude;
pub mod registry_client;
pub mod types;

// vim: ts=4
