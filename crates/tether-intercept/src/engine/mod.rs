//! The interception engine.
//!
//! ## Module Structure
//!
//! - `core`: `InterceptEngine`, its rule stores and the control-plane surface
//! - `evaluate`: per-exchange evaluation producing a `Decision`

mod core;
mod evaluate;

#[cfg(test)]
mod tests;

pub use core::{ActiveStub, InterceptEngine};
pub use evaluate::Decision;
