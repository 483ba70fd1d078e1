use alloc::string::String;

use serde_json::Value;

use crate::cell::Shared;
use crate::ser::SerializeContext;

// -----------------------------------------------------------------------------
// SerializeNode

/// The contract every per-type serializer follows.
///
/// Implementations are normally emitted by the code generator, one per user
/// type, and all have the same shape:
///
/// 1. [`get_id`](SerializeContext::get_id) — on a hit, emit
///    [`node::reference`](crate::node::reference) and stop recursing into
///    this instance's fields.
/// 2. Otherwise [`register`](SerializeContext::register), emit a
///    [`node::tagged`](crate::node::tagged) map with the fresh id, and
///    recursively serialize each field value through the *same* context.
///
/// # Examples
///
/// ```
/// use gx_serde::cell::{Shared, shared};
/// use gx_serde::node;
/// use gx_serde::ser::{SerializeContext, SerializeNode, to_node};
/// use serde_json::{Value, json};
///
/// struct Point {
///     x: i64,
///     y: i64,
/// }
///
/// impl SerializeNode for Point {
///     fn serialize_node(this: &Shared<Self>, ctx: &mut SerializeContext) -> Value {
///         if let Some(id) = ctx.get_id(this) {
///             return node::reference(id);
///         }
///         let id = ctx.register(this);
///         let mut map = node::tagged("Point", id);
///         let point = this.borrow();
///         map.insert("x".into(), json!(point.x));
///         map.insert("y".into(), json!(point.y));
///         Value::Object(map)
///     }
/// }
///
/// let point = shared(Point { x: 3, y: 4 });
/// assert_eq!(
///     to_node(&point),
///     json!({ "__type": "Point", "__id": 0, "x": 3, "y": 4 })
/// );
/// ```
pub trait SerializeNode: Sized + 'static {
    /// Serializes one instance through the call's shared context.
    fn serialize_node(this: &Shared<Self>, ctx: &mut SerializeContext) -> Value;
}

// -----------------------------------------------------------------------------
// Drivers

/// Serializes a graph to its tagged node representation.
///
/// Creates exactly one [`SerializeContext`] for the whole call tree and
/// discards it when the call returns.
pub fn to_node<T: SerializeNode>(value: &Shared<T>) -> Value {
    let mut ctx = SerializeContext::new();
    T::serialize_node(value, &mut ctx)
}

/// Serializes a graph to a JSON string.
pub fn to_json_string<T: SerializeNode>(value: &Shared<T>) -> Result<String, serde_json::Error> {
    serde_json::to_string(&to_node(value))
}

/// Serializes a graph to a pretty-printed JSON string.
pub fn to_json_string_pretty<T: SerializeNode>(
    value: &Shared<T>,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&to_node(value))
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::cell::shared;
    use crate::node;

    use super::*;

    /// A singly-linked node, possibly circular.
    struct Link {
        label: &'static str,
        next: Option<Shared<Link>>,
    }

    impl SerializeNode for Link {
        fn serialize_node(this: &Shared<Self>, ctx: &mut SerializeContext) -> Value {
            if let Some(id) = ctx.get_id(this) {
                return node::reference(id);
            }
            let id = ctx.register(this);
            let mut map = node::tagged("Link", id);
            let link = this.borrow();
            map.insert("label".into(), json!(link.label));
            let next = match &link.next {
                Some(next) => Link::serialize_node(next, ctx),
                None => Value::Null,
            };
            map.insert("next".into(), next);
            Value::Object(map)
        }
    }

    #[test]
    fn acyclic_chain() {
        let tail = shared(Link {
            label: "tail",
            next: None,
        });
        let head = shared(Link {
            label: "head",
            next: Some(tail),
        });

        assert_eq!(
            to_node(&head),
            json!({
                "__type": "Link", "__id": 0, "label": "head",
                "next": { "__type": "Link", "__id": 1, "label": "tail", "next": null },
            })
        );
    }

    #[test]
    fn cycle_terminates_with_reference_marker() {
        let link = shared(Link {
            label: "loop",
            next: None,
        });
        link.borrow_mut().next = Some(link.clone());

        assert_eq!(
            to_node(&link),
            json!({
                "__type": "Link", "__id": 0, "label": "loop",
                "next": { "__ref": 0 },
            })
        );
    }

    #[test]
    fn string_driver_matches_node_driver() {
        let link = shared(Link {
            label: "solo",
            next: None,
        });
        let raw = to_json_string(&link).unwrap();
        let parsed: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, to_node(&link));
    }
}
