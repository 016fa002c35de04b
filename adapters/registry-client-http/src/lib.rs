//! HTTP clients for the identity services consulted when a stream is opened.
//!
//! The registry service answers member and network lookups, the subscriber
//! registry answers subscriber lookups. Both speak JSON over plain REST and
//! wrap every record in a single-field envelope (`{"member": {...}}`).

#![forbid(unsafe_code)]

mod http;
mod registry;
mod subscriber;

pub use http::JsonClient;
pub use registry::HttpRegistryClient;
pub use subscriber::HttpSubscriberClient;

// vim: ts=4
