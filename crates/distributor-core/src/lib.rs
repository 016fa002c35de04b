//! Fan-out engine of the notification distributor.
//!
//! [`SubscriptionRegistry`] owns the connected subscribers and routes each
//! notification to the ones whose filters match. [`ChangeFeedPump`] is the
//! single producer: it drains the change feed, enriches every event through
//! the detail lookup and hands the result to the registry.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod prelude;
pub mod pump;
pub mod registry;

pub use pump::{ChangeFeedPump, PumpConfig, PumpState, PumpStats};
pub use registry::{FanOutStats, RegistryConfig, RegistryStats, SubHandle, SubscriptionRegistry};

// vim: ts=4
