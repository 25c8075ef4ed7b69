//! EventBus - process-wide publish/subscribe between dashboard components.
//!
//! Completed work in one component (a city activation) is announced here so
//! that other components (cost observer, scenario runner, selector UI) can
//! react without sharing a parent.
//!
//! Two consumption styles share one publish call:
//! - synchronous listeners registered per topic, invoked in registration
//!   order before `publish` returns
//! - async receivers from [`EventBus::watch`] (tokio broadcast)

/// Core event bus implementation.
pub mod bus;
/// Topic and payload definitions.
pub mod types;

pub use bus::{EventBus, ListenerError, ListenerResult, Subscription};
pub use types::{BusEvent, BusTopic};

#[cfg(test)]
mod tests;
