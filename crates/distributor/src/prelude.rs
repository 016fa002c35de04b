pub use distributor_types::prelude::*;

pub use distributor_types::notification::Notification;

// vim: ts=4
