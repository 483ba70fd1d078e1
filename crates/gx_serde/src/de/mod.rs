//! The deserialize half of the engine.
//!
//! - [`PendingRef`] / [`Resolved`]: the sentinel for not-yet-constructed
//!   referents, and the per-node return shape carrying it.
//! - [`DeserializeContext`]: id → instance registry, deferred-patch queue,
//!   and freeze list; owns the two-phase register-then-patch protocol.
//! - [`DeserializeNode`] and the root drivers [`from_node`] /
//!   [`from_json_str`]: the uniform per-call algorithm — deserialize,
//!   reject a reference at the root, apply patches, optionally freeze.

mod context;
mod driver;
mod pending;

pub use context::DeserializeContext;
pub use driver::{DeserializeNode, DeserializeOptions, from_json_str, from_node};
pub use pending::{PendingRef, Resolved};
