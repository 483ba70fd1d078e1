//! The wire shape: tagged nodes, reference markers, and typed field readers.
//!
//! Objects are encoded as JSON maps carrying the reserved keys [`TYPE_KEY`]
//! and [`ID_KEY`] alongside their ordinary fields. A repeat visit of an
//! already-emitted instance is encoded as `{ "__ref": id }` with no sibling
//! keys. Identity ids are assigned in first-visit order, **starting at 0**;
//! the deserializer trusts the ids embedded in the payload rather than
//! keeping a counter of its own.

use alloc::borrow::Cow;
use alloc::string::String;
use core::fmt;

use serde_json::{Map, Value};

use crate::error::{DeserializeError, FieldErrors, ROOT_FIELD};

// -----------------------------------------------------------------------------
// Reserved keys

/// Reserved key carrying the type tag of a node.
pub const TYPE_KEY: &str = "__type";
/// Reserved key carrying the identity id of a node.
pub const ID_KEY: &str = "__id";
/// Reserved key of a reference marker standing in for an earlier node.
pub const REF_KEY: &str = "__ref";

/// Whether `key` is one of the reserved wire keys.
#[inline]
pub fn is_reserved(key: &str) -> bool {
    matches!(key, TYPE_KEY | ID_KEY | REF_KEY)
}

// -----------------------------------------------------------------------------
// NodeId

/// An identity id, unique within one serialize or one deserialize call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    #[inline]
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<NodeId> for u64 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

impl From<NodeId> for Value {
    #[inline]
    fn from(id: NodeId) -> Self {
        Value::from(id.0)
    }
}

// -----------------------------------------------------------------------------
// Node constructors

/// Creates the map of a tagged node, pre-seeded with `__type` and `__id`.
/// Per-type serializers insert their ordinary fields afterwards.
pub fn tagged(type_tag: &str, id: NodeId) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(TYPE_KEY.into(), Value::String(type_tag.into()));
    map.insert(ID_KEY.into(), Value::from(id));
    map
}

/// Creates a reference marker `{ "__ref": id }`.
pub fn reference(id: NodeId) -> Value {
    let mut map = Map::new();
    map.insert(REF_KEY.into(), Value::from(id));
    Value::Object(map)
}

// -----------------------------------------------------------------------------
// Node probes

/// The id of a reference marker, if `value` carries one.
///
/// Presence of the `__ref` key alone decides reference-ness; canonical
/// payloads never put sibling keys next to it. A marker whose id is not a
/// non-negative integer is structurally broken — it can never resolve, so
/// it fails the call instead of being mistaken for an ordinary node.
pub fn ref_id(value: &Value) -> Result<Option<NodeId>, DeserializeError> {
    let Some(raw) = value.as_object().and_then(|map| map.get(REF_KEY)) else {
        return Ok(None);
    };
    match raw.as_u64() {
        Some(id) => Ok(Some(NodeId::new(id))),
        None => Err(DeserializeError::MalformedRef {
            field: Cow::Borrowed(ROOT_FIELD),
        }),
    }
}

/// The identity id embedded in a tagged node, if any.
pub fn embedded_id(map: &Map<String, Value>) -> Option<NodeId> {
    map.get(ID_KEY)?.as_u64().map(NodeId::new)
}

/// Shape check of a per-node deserializer: the input must be a JSON object
/// (not an array, not `null`). On failure no fields can be read, so a
/// single root-scoped batch is raised immediately.
pub fn expect_object<'a>(
    value: &'a Value,
    type_name: &str,
) -> Result<&'a Map<String, Value>, DeserializeError> {
    value.as_object().ok_or_else(|| {
        DeserializeError::root(alloc::format!("{type_name}: expected an object"))
    })
}

// -----------------------------------------------------------------------------
// Field readers

/// Reads a string field, accumulating a type error on mismatch.
///
/// An absent key yields `None` silently; required-field presence is checked
/// separately, before any field is read.
pub fn get_str<'a>(
    map: &'a Map<String, Value>,
    key: &'static str,
    errors: &mut FieldErrors,
) -> Option<&'a str> {
    match map.get(key)? {
        Value::String(value) => Some(value),
        _ => {
            errors.push(key, "expected a string");
            None
        }
    }
}

/// Reads a non-negative integer field, accumulating a type error on mismatch.
pub fn get_u64(map: &Map<String, Value>, key: &'static str, errors: &mut FieldErrors) -> Option<u64> {
    let value = map.get(key)?;
    match value.as_u64() {
        Some(number) => Some(number),
        None => {
            errors.push(key, "expected a non-negative integer");
            None
        }
    }
}

/// Reads a signed integer field, accumulating a type error on mismatch.
pub fn get_i64(map: &Map<String, Value>, key: &'static str, errors: &mut FieldErrors) -> Option<i64> {
    let value = map.get(key)?;
    match value.as_i64() {
        Some(number) => Some(number),
        None => {
            errors.push(key, "expected an integer");
            None
        }
    }
}

/// Reads a numeric field, accumulating a type error on mismatch.
pub fn get_f64(map: &Map<String, Value>, key: &'static str, errors: &mut FieldErrors) -> Option<f64> {
    let value = map.get(key)?;
    match value.as_f64() {
        Some(number) => Some(number),
        None => {
            errors.push(key, "expected a number");
            None
        }
    }
}

/// Reads a boolean field, accumulating a type error on mismatch.
pub fn get_bool(
    map: &Map<String, Value>,
    key: &'static str,
    errors: &mut FieldErrors,
) -> Option<bool> {
    let value = map.get(key)?;
    match value.as_bool() {
        Some(flag) => Some(flag),
        None => {
            errors.push(key, "expected a boolean");
            None
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
