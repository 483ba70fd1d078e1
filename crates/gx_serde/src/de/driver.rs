use alloc::string::ToString;

use serde_json::Value;

use crate::cell::Shared;
use crate::error::DeserializeError;

use super::context::DeserializeContext;
use super::pending::Resolved;

// -----------------------------------------------------------------------------
// DeserializeNode

/// The contract every per-node deserializer follows.
///
/// Implementations are normally emitted by the code generator, one per user
/// type, and all follow the same sequence:
///
/// 1. If the input carries a reference marker, return
///    [`get_or_defer`](DeserializeContext::get_or_defer) directly — no
///    further validation for this node.
/// 2. Check the shape with [`node::expect_object`](crate::node::expect_object);
///    without a container there are no fields to read.
/// 3. Check presence of every statically-required field, accumulating one
///    "missing required field" error per absence, then raise the batch.
/// 4. Construct a shell instance and immediately
///    [`register`](DeserializeContext::register) it under the node's
///    embedded `__id` — *before* populating any field, so self- and
///    mutually-referential fields resolve to this exact instance.
/// 5. [`track_for_freeze`](DeserializeContext::track_for_freeze) it.
/// 6. For each field, deserialize recursively through the same context;
///    route possibly-pending results through
///    [`assign_or_defer`](DeserializeContext::assign_or_defer); accumulate
///    validator errors.
/// 7. Raise the accumulated batch if any, otherwise return the instance.
pub trait DeserializeNode: Sized + 'static {
    /// Deserializes one node through the call's shared context.
    fn deserialize_node(
        raw: &Value,
        ctx: &mut DeserializeContext,
    ) -> Result<Resolved<Self>, DeserializeError>;
}

// -----------------------------------------------------------------------------
// DeserializeOptions

/// Options of a top-level deserialize call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeserializeOptions {
    /// Freeze every constructed instance once all patches are applied.
    pub freeze: bool,
}

impl DeserializeOptions {
    #[inline]
    pub const fn new() -> Self {
        Self { freeze: false }
    }

    /// Enables freezing of the returned graph.
    #[inline]
    pub const fn freeze(mut self) -> Self {
        self.freeze = true;
        self
    }
}

// -----------------------------------------------------------------------------
// Drivers

/// Deserializes a graph from its tagged node representation.
///
/// Creates exactly one [`DeserializeContext`] for the whole call tree:
/// deserializes the root node, rejects a bare reference at the root (there
/// is nothing earlier in the same call it could refer to), applies the
/// deferred patches, and — when [`DeserializeOptions::freeze`] is set —
/// freezes every constructed instance.
///
/// The public contract is always a `Result`: field validation failures come
/// back as an [`Invalid`](DeserializeError::Invalid) batch, structurally
/// broken payloads as the distinct reference-error variants.
pub fn from_node<T: DeserializeNode>(
    raw: &Value,
    options: DeserializeOptions,
) -> Result<Shared<T>, DeserializeError> {
    let mut ctx = DeserializeContext::new();
    let instance = match T::deserialize_node(raw, &mut ctx)? {
        Resolved::Obj(instance) => instance,
        Resolved::Pending(_) => {
            return Err(DeserializeError::root("root cannot be a forward reference"));
        }
    };
    ctx.apply_patches()?;
    if options.freeze {
        ctx.freeze_all();
    }
    Ok(instance)
}

/// Deserializes a graph from a JSON string.
///
/// A parse failure surfaces as a single `_root` field error, keeping the
/// outward contract uniform with every other failure.
pub fn from_json_str<T: DeserializeNode>(
    raw: &str,
    options: DeserializeOptions,
) -> Result<Shared<T>, DeserializeError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|error| DeserializeError::root(error.to_string()))?;
    from_node(&value, options)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::String;

    use serde_json::json;

    use crate::cell::shared;
    use crate::error::{FieldErrors, ROOT_FIELD};
    use crate::node;
    use crate::ser::{SerializeContext, SerializeNode, to_node};

    use super::*;

    /// Hand-written stand-in for generated per-type code.
    #[derive(Debug, Default)]
    struct User {
        name: String,
        age: u64,
        friend: Option<Shared<User>>,
    }

    impl SerializeNode for User {
        fn serialize_node(this: &Shared<Self>, ctx: &mut SerializeContext) -> Value {
            if let Some(id) = ctx.get_id(this) {
                return node::reference(id);
            }
            let id = ctx.register(this);
            let mut map = node::tagged("User", id);
            let user = this.borrow();
            map.insert("name".into(), json!(user.name));
            map.insert("age".into(), json!(user.age));
            let friend = match &user.friend {
                Some(friend) => User::serialize_node(friend, ctx),
                None => Value::Null,
            };
            map.insert("friend".into(), friend);
            Value::Object(map)
        }
    }

    impl DeserializeNode for User {
        fn deserialize_node(
            raw: &Value,
            ctx: &mut DeserializeContext,
        ) -> Result<Resolved<Self>, DeserializeError> {
            if let Some(id) = node::ref_id(raw)? {
                return ctx.get_or_defer(id);
            }
            let map = node::expect_object(raw, "User")?;

            let mut errors = FieldErrors::new();
            for required in ["name", "age"] {
                if !map.contains_key(required) {
                    errors.missing(required);
                }
            }
            errors.check()?;

            let instance = shared(User::default());
            if let Some(id) = node::embedded_id(map) {
                ctx.register(id, &instance);
            }
            ctx.track_for_freeze(&instance);

            if let Some(name) = node::get_str(map, "name", &mut errors) {
                instance.borrow_mut().name = name.into();
            }
            if let Some(age) = node::get_u64(map, "age", &mut errors) {
                instance.borrow_mut().age = age;
            }
            if let Some(raw_friend) = map.get("friend").filter(|value| !value.is_null()) {
                let friend = User::deserialize_node(raw_friend, ctx)
                    .map_err(|error| error.prefix("friend"))?;
                ctx.assign_or_defer(friend, &instance, "friend", |user, friend| {
                    user.friend = Some(friend)
                });
            }

            errors.check()?;
            Ok(Resolved::Obj(instance))
        }
    }

    /// Two possibly-shared users; no statically-required fields.
    #[derive(Debug, Default)]
    struct Pair {
        first: Option<Shared<User>>,
        second: Option<Shared<User>>,
    }

    impl SerializeNode for Pair {
        fn serialize_node(this: &Shared<Self>, ctx: &mut SerializeContext) -> Value {
            if let Some(id) = ctx.get_id(this) {
                return node::reference(id);
            }
            let id = ctx.register(this);
            let mut map = node::tagged("Pair", id);
            let pair = this.borrow();
            for (key, slot) in [("first", &pair.first), ("second", &pair.second)] {
                let value = match slot {
                    Some(user) => User::serialize_node(user, ctx),
                    None => Value::Null,
                };
                map.insert(key.into(), value);
            }
            Value::Object(map)
        }
    }

    impl DeserializeNode for Pair {
        fn deserialize_node(
            raw: &Value,
            ctx: &mut DeserializeContext,
        ) -> Result<Resolved<Self>, DeserializeError> {
            if let Some(id) = node::ref_id(raw)? {
                return ctx.get_or_defer(id);
            }
            let map = node::expect_object(raw, "Pair")?;

            let instance = shared(Pair::default());
            if let Some(id) = node::embedded_id(map) {
                ctx.register(id, &instance);
            }
            ctx.track_for_freeze(&instance);

            if let Some(raw_first) = map.get("first").filter(|value| !value.is_null()) {
                let first =
                    User::deserialize_node(raw_first, ctx).map_err(|error| error.prefix("first"))?;
                ctx.assign_or_defer(first, &instance, "first", |pair, user| {
                    pair.first = Some(user)
                });
            }
            if let Some(raw_second) = map.get("second").filter(|value| !value.is_null()) {
                let second = User::deserialize_node(raw_second, ctx)
                    .map_err(|error| error.prefix("second"))?;
                ctx.assign_or_defer(second, &instance, "second", |pair, user| {
                    pair.second = Some(user)
                });
            }

            Ok(Resolved::Obj(instance))
        }
    }

    #[test]
    fn round_trip_acyclic() {
        let friend = shared(User {
            name: "grace".into(),
            age: 36,
            friend: None,
        });
        let user = shared(User {
            name: "ada".into(),
            age: 28,
            friend: Some(friend),
        });

        let restored: Shared<User> =
            from_node(&to_node(&user), DeserializeOptions::new()).unwrap();

        let restored = restored.borrow();
        assert_eq!(restored.name, "ada");
        assert_eq!(restored.age, 28);
        let friend = restored.friend.clone().unwrap();
        let friend = friend.borrow();
        assert_eq!(friend.name, "grace");
        assert_eq!(friend.age, 36);
        assert!(friend.friend.is_none());
    }

    #[test]
    fn self_reference_identity() {
        let user = shared(User {
            name: "loop".into(),
            age: 1,
            friend: None,
        });
        user.borrow_mut().friend = Some(user.clone());

        let restored: Shared<User> =
            from_node(&to_node(&user), DeserializeOptions::new()).unwrap();

        let friend = restored.borrow().friend.clone().unwrap();
        assert!(Rc::ptr_eq(&restored, &friend));
    }

    #[test]
    fn shared_reference_dedup() {
        let common = shared(User {
            name: "common".into(),
            age: 5,
            friend: None,
        });
        let pair = shared(Pair {
            first: Some(common.clone()),
            second: Some(common),
        });

        let encoded = to_node(&pair);
        // The shared user is emitted once; its second occurrence is a marker.
        assert_eq!(encoded["first"]["__type"], json!("User"));
        assert_eq!(encoded["second"], json!({ "__ref": 1 }));

        let restored: Shared<Pair> = from_node(&encoded, DeserializeOptions::new()).unwrap();
        let pair = restored.borrow();
        let first = pair.first.clone().unwrap();
        let second = pair.second.clone().unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.borrow().name, "common");
    }

    #[test]
    fn forward_reference_resolves_after_full_walk() {
        // `first` references an id whose definition appears later.
        let payload = json!({
            "__type": "Pair", "__id": 0,
            "first": { "__ref": 5 },
            "second": { "__type": "User", "__id": 5, "name": "late", "age": 9, "friend": null },
        });

        let restored: Shared<Pair> = from_node(&payload, DeserializeOptions::new()).unwrap();
        let pair = restored.borrow();
        let first = pair.first.clone().unwrap();
        let second = pair.second.clone().unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.borrow().name, "late");
    }

    #[test]
    fn dangling_reference_is_a_structural_failure() {
        let payload = json!({
            "__type": "Pair", "__id": 0,
            "first": { "__ref": 999 },
            "second": null,
        });

        let error = from_node::<Pair>(&payload, DeserializeOptions::new()).unwrap_err();
        assert!(error.is_structural());
        assert!(matches!(
            error,
            DeserializeError::DanglingRef { id, .. } if id.get() == 999
        ));
    }

    #[test]
    fn missing_fields_are_batched() {
        let payload = json!({ "__type": "User", "__id": 0 });

        let error = from_node::<User>(&payload, DeserializeOptions::new()).unwrap_err();
        let batch = error.field_errors().unwrap();
        assert_eq!(batch.len(), 2);
        for (field_error, expected) in batch.iter().zip(["name", "age"]) {
            assert_eq!(field_error.field, expected);
            assert_eq!(field_error.message, "missing required field");
        }
    }

    #[test]
    fn type_errors_are_batched_across_fields() {
        let payload = json!({ "__type": "User", "__id": 0, "name": 1, "age": "old" });

        let error = from_node::<User>(&payload, DeserializeOptions::new()).unwrap_err();
        assert_eq!(error.field_errors().unwrap().len(), 2);
    }

    #[test]
    fn nested_errors_carry_dotted_paths() {
        let payload = json!({
            "__type": "User", "__id": 0, "name": "ada", "age": 1,
            "friend": { "__type": "User", "__id": 1 },
        });

        let error = from_node::<User>(&payload, DeserializeOptions::new()).unwrap_err();
        let batch = error.field_errors().unwrap();
        let fields: alloc::vec::Vec<_> =
            batch.iter().map(|error| error.field.as_ref()).collect();
        assert_eq!(fields, ["friend.name", "friend.age"]);
    }

    #[test]
    fn root_cannot_be_a_reference() {
        let error =
            from_node::<User>(&json!({ "__ref": 0 }), DeserializeOptions::new()).unwrap_err();
        let batch = error.field_errors().unwrap();
        assert_eq!(batch.len(), 1);
        let first = batch.iter().next().unwrap();
        assert_eq!(first.field, ROOT_FIELD);
        assert_eq!(first.message, "root cannot be a forward reference");
    }

    #[test]
    fn non_object_root_is_a_shape_error() {
        let error =
            from_node::<User>(&json!([1, 2, 3]), DeserializeOptions::new()).unwrap_err();
        let batch = error.field_errors().unwrap();
        assert_eq!(batch.iter().next().unwrap().message, "User: expected an object");
    }

    #[test]
    fn reference_to_wrong_type_is_rejected() {
        // Id 0 is the Pair itself, but `first` expects a User.
        let payload = json!({
            "__type": "Pair", "__id": 0,
            "first": { "__ref": 0 },
            "second": null,
        });

        let error = from_node::<Pair>(&payload, DeserializeOptions::new()).unwrap_err();
        // The resolution site does not know the field name; the enclosing
        // caller rescopes the error to the field it was reading.
        assert!(matches!(
            error,
            DeserializeError::MismatchedRef { id, ref field, .. }
                if id.get() == 0 && field == "first"
        ));
    }

    #[test]
    fn malformed_reference_marker_fails_structurally() {
        let payload = json!({
            "__type": "Pair", "__id": 0,
            "first": { "__ref": "abc" },
            "second": null,
        });

        let error = from_node::<Pair>(&payload, DeserializeOptions::new()).unwrap_err();
        assert!(error.is_structural());
        assert!(matches!(
            error,
            DeserializeError::MalformedRef { ref field } if field == "first"
        ));
    }

    #[test]
    fn parse_failure_maps_to_root_error() {
        let error =
            from_json_str::<User>("{ not json", DeserializeOptions::new()).unwrap_err();
        let batch = error.field_errors().unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.iter().next().unwrap().field, ROOT_FIELD);
    }

    #[test]
    fn string_round_trip() {
        let user = shared(User {
            name: "ada".into(),
            age: 28,
            friend: None,
        });
        let raw = crate::ser::to_json_string(&user).unwrap();
        let restored: Shared<User> =
            from_json_str(&raw, DeserializeOptions::new()).unwrap();
        assert_eq!(restored.borrow().name, "ada");
    }

    #[test]
    fn freeze_covers_patched_fields() {
        let payload = json!({
            "__type": "Pair", "__id": 0,
            "first": { "__ref": 5 },
            "second": { "__type": "User", "__id": 5, "name": "late", "age": 9, "friend": null },
        });

        let restored: Shared<Pair> =
            from_node(&payload, DeserializeOptions::new().freeze()).unwrap();

        // The deferred patch ran before freezing: the field holds the real
        // instance, and every instance rejects mutation.
        let pair = restored.borrow();
        let first = pair.first.clone().unwrap();
        assert_eq!(first.borrow().name, "late");
        assert!(restored.try_borrow_mut().is_err());
        assert!(first.try_borrow_mut().is_err());
    }

    #[test]
    fn unfrozen_by_default() {
        let payload = json!({
            "__type": "User", "__id": 0, "name": "ada", "age": 1, "friend": null,
        });
        let restored: Shared<User> = from_node(&payload, DeserializeOptions::new()).unwrap();
        restored.borrow_mut().age = 2;
        assert_eq!(restored.borrow().age, 2);
    }
}
