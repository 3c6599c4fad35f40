//! Viewport visibility multiplexing.

pub mod broker;

pub use broker::{ROOT_MARGIN_PX, SubscriptionId, VisibilityBroker, VisibleCallback};
