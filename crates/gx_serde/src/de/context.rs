use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::Any;

use crate::cell::{Freeze, GraphCell, Shared};
use crate::collections::HashMap;
use crate::error::{DeserializeError, ROOT_FIELD};
use crate::node::NodeId;

use super::pending::{PendingRef, Resolved};

// -----------------------------------------------------------------------------
// Patch

/// A deferred field assignment, recorded because the referent was not yet
/// constructed when the containing node was built.
///
/// The original `{target, prop, id}` record becomes an applier closure
/// here: Rust has no untyped `target[prop]` assignment, so the closure
/// carries the typed write while `id` and `field` stay alongside for error
/// reporting.
struct Patch {
    id: NodeId,
    field: Cow<'static, str>,
    apply: Box<dyn FnOnce(&Rc<dyn Any>) -> Result<(), DeserializeError>>,
}

// -----------------------------------------------------------------------------
// DeserializeContext

/// Per-call state of a deserialize call tree.
///
/// Owns (a) the id → instance registry, (b) the ordered queue of deferred
/// patches, and (c) the list of instances to freeze. Created at the root,
/// threaded by reference through every recursive per-node call, and
/// discarded when the call completes — never shared across top-level calls.
///
/// The resolution protocol is two-phase: every node registers its shell
/// instance *before* populating fields (so self-references resolve to the
/// same instance), and unresolved references are queued as patches that
/// [`apply_patches`](Self::apply_patches) replays once the whole payload
/// has been walked.
pub struct DeserializeContext {
    instances: HashMap<NodeId, Rc<dyn Any>>,
    patches: Vec<Patch>,
    freeze_list: Vec<Rc<dyn Freeze>>,
}

impl DeserializeContext {
    /// Creates a context with an empty registry, patch queue, and freeze
    /// list.
    #[inline]
    pub fn new() -> Self {
        Self {
            instances: HashMap::default(),
            patches: Vec::new(),
            freeze_list: Vec::new(),
        }
    }

    /// Records the id → instance mapping.
    ///
    /// Must run before the instance's own fields are populated, so a field
    /// referencing the instance's own id resolves to the same, not a new,
    /// instance. Re-registration of an id is last-write-wins: well-formed
    /// input never redefines an id, and a redefinition is not treated as an
    /// error here.
    pub fn register<T: 'static>(&mut self, id: NodeId, instance: &Shared<T>) {
        self.instances.insert(id, instance.clone() as Rc<dyn Any>);
    }

    /// Whether `id` has been registered in this call.
    #[inline]
    pub fn is_registered(&self, id: NodeId) -> bool {
        self.instances.contains_key(&id)
    }

    /// The instance registered under `id`, or a [`PendingRef`] if the
    /// referent has not been constructed yet.
    ///
    /// Unresolved is a normal intermediate state, not a failure. The only
    /// error case is a registered instance of a different concrete type
    /// than `T` — a structurally broken payload.
    pub fn get_or_defer<T: 'static>(&self, id: NodeId) -> Result<Resolved<T>, DeserializeError> {
        match self.instances.get(&id) {
            Some(instance) => {
                downcast_registered::<T>(instance, id, Cow::Borrowed(ROOT_FIELD))
                    .map(Resolved::Obj)
            }
            None => Ok(Resolved::Pending(PendingRef::new(id))),
        }
    }

    /// Writes `value` into `target` through `assign` immediately when it is
    /// resolved, or queues a patch for it when it is pending.
    ///
    /// `field` names the written slot for error reporting.
    pub fn assign_or_defer<T, U, F>(
        &mut self,
        value: Resolved<U>,
        target: &Shared<T>,
        field: &'static str,
        assign: F,
    ) where
        T: 'static,
        U: 'static,
        F: FnOnce(&mut T, Shared<U>) + 'static,
    {
        match value {
            Resolved::Obj(instance) => assign(&mut *target.borrow_mut(), instance),
            Resolved::Pending(pending) => {
                let target = target.clone();
                self.add_patch(pending.id(), field, move |instance: Shared<U>| {
                    assign(&mut *target.borrow_mut(), instance);
                });
            }
        }
    }

    /// Lower-level deferral for callers that already hold a bare unresolved
    /// id rather than a [`PendingRef`] value — collection elements, most
    /// commonly. `apply` receives the resolved instance once
    /// [`apply_patches`](Self::apply_patches) reaches the patch.
    pub fn add_patch<U, F>(&mut self, id: NodeId, field: impl Into<Cow<'static, str>>, apply: F)
    where
        U: 'static,
        F: FnOnce(Shared<U>) + 'static,
    {
        let field = field.into();
        let error_field = field.clone();
        self.patches.push(Patch {
            id,
            field,
            apply: Box::new(move |instance| {
                let instance = downcast_registered::<U>(instance, id, error_field)?;
                apply(instance);
                Ok(())
            }),
        });
    }

    /// Appends `instance` to the freeze list; nothing happens until
    /// [`freeze_all`](Self::freeze_all).
    pub fn track_for_freeze<T: 'static>(&mut self, instance: &Shared<T>) {
        self.freeze_list.push(instance.clone() as Rc<dyn Freeze>);
    }

    /// Replays every recorded patch, in recorded order.
    ///
    /// A patch whose id was never registered is a dangling reference: the
    /// whole call fails with the structural
    /// [`DanglingRef`](DeserializeError::DanglingRef) error. When two
    /// patches write the same slot, the later one wins.
    pub fn apply_patches(&mut self) -> Result<(), DeserializeError> {
        let patches = core::mem::take(&mut self.patches);
        for patch in patches {
            match self.instances.get(&patch.id) {
                Some(instance) => (patch.apply)(instance)?,
                None => {
                    return Err(DeserializeError::DanglingRef {
                        id: patch.id,
                        field: patch.field,
                    });
                }
            }
        }
        Ok(())
    }

    /// Freezes every tracked instance, in tracked order.
    ///
    /// Must run strictly after [`apply_patches`](Self::apply_patches) —
    /// frozen instances reject writes, including a pending patch write.
    pub fn freeze_all(&mut self) {
        for instance in self.freeze_list.drain(..) {
            instance.freeze();
        }
    }
}

/// Downcasts a registered instance to the concrete cell type a caller
/// expects, reporting a structural error on mismatch.
fn downcast_registered<T: 'static>(
    instance: &Rc<dyn Any>,
    id: NodeId,
    field: Cow<'static, str>,
) -> Result<Shared<T>, DeserializeError> {
    instance
        .clone()
        .downcast::<GraphCell<T>>()
        .map_err(|_| DeserializeError::MismatchedRef {
            id,
            field,
            expected: core::any::type_name::<T>(),
        })
}

// -----------------------------------------------------------------------------
// Tests
