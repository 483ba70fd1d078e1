//! The serialize half of the engine.
//!
//! - [`SerializeContext`]: per-call identity registry assigning ids in
//!   first-visit order.
//! - [`SerializeNode`]: the contract every per-type serializer follows.
//! - [`to_node`] / [`to_json_string`]: the root drivers creating exactly one
//!   context per call tree.

mod context;
mod driver;

pub use context::SerializeContext;
pub use driver::{SerializeNode, to_json_string, to_json_string_pretty, to_node};
