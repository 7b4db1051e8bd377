//! Alert core: the rule engine that turns snapshots into alerts and the
//! store that owns the current alert and its bounded history.
//!
//! Callers never build alerts by hand; they go through [`RuleEngine`] or
//! [`AlertStore`].

mod clock;
mod rules;
mod store;

pub use clock::{SystemClock, TimestampIds};
pub use rules::{DemoScenario, RuleEngine};
pub use store::AlertStore;

#[cfg(test)]
pub use clock::{FixedClock, SequentialIds};
