#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod collections;

pub mod cell;
pub mod de;
pub mod error;
pub mod node;
pub mod ser;
pub mod validate;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use cell::{Freeze, GraphCell, Shared, shared};
pub use de::{
    DeserializeContext, DeserializeNode, DeserializeOptions, PendingRef, Resolved, from_json_str,
    from_node,
};
pub use error::{DeserializeError, FieldError, FieldErrors, ROOT_FIELD};
pub use node::NodeId;
pub use ser::{SerializeContext, SerializeNode, to_json_string, to_node};
