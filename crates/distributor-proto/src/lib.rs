//! Generated gRPC bindings.

#![allow(clippy::pedantic, clippy::derive_partial_eq_without_eq)]

pub mod distributor {
	pub mod v1 {
		tonic::include_proto!("ukama.distributor.v1");
	}
}

pub mod eventnotify {
	pub mod v1 {
		tonic::include_proto!("ukama.eventnotify.v1");
	}
}

// vim: ts=4
