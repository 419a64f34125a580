//! Common types used across the workspace.

pub mod id;
pub mod money;
pub mod period;

pub use id::*;
pub use period::{InvalidPeriod, Period};
