use alloc::rc::Rc;

use crate::collections::HashMap;
use crate::node::NodeId;

// -----------------------------------------------------------------------------
// SerializeContext

/// Per-call identity registry of a serialize call tree.
///
/// Assigns monotonically increasing ids, starting at 0, to instances in
/// first-visit order. Identity is the `Rc` allocation address, never
/// structural equality: two instances with equal contents get distinct ids,
/// and only a repeat visit of the *same* instance reports an existing id.
///
/// Per-type serializers check [`get_id`](Self::get_id) first — a hit means
/// the instance was already emitted, so they emit a reference marker and
/// stop recursing (this is what terminates cycles). On a miss they
/// [`register`](Self::register) and emit a full tagged node.
///
/// One context per top-level call: sharing a context across unrelated calls
/// corrupts id numbering and falsely dedupes distinct graphs. The registry
/// stores bare addresses, so it does not extend any instance's lifetime;
/// the flip side is that the context must not outlive the serialize call
/// that created it, or addresses could be reused by unrelated allocations.
///
/// # Examples
///
/// ```
/// use gx_serde::cell::shared;
/// use gx_serde::ser::SerializeContext;
///
/// let mut ctx = SerializeContext::new();
/// let a = shared("a");
/// let b = shared("a"); // equal contents, distinct identity
///
/// assert_eq!(ctx.get_id(&a), None);
/// let id_a = ctx.register(&a);
/// let id_b = ctx.register(&b);
///
/// assert_eq!(id_a.get(), 0);
/// assert_eq!(id_b.get(), 1);
/// assert_eq!(ctx.get_id(&a), Some(id_a));
/// ```
pub struct SerializeContext {
    ids: HashMap<usize, NodeId>,
    next_id: u64,
}

impl SerializeContext {
    /// Creates a context with an empty identity map and the id counter at 0.
    #[inline]
    pub fn new() -> Self {
        Self {
            ids: HashMap::default(),
            next_id: 0,
        }
    }

    /// The id previously assigned to `instance`, compared by identity.
    /// No side effects.
    #[inline]
    pub fn get_id<T: ?Sized>(&self, instance: &Rc<T>) -> Option<NodeId> {
        self.ids.get(&address_of(instance)).copied()
    }

    /// Assigns the next unused id to `instance` and records the mapping.
    ///
    /// Must be called at most once per identity per call; callers check
    /// [`get_id`](Self::get_id) first. A duplicate registration would
    /// silently break cycle detection, so it is rejected in debug builds.
    pub fn register<T: ?Sized>(&mut self, instance: &Rc<T>) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;

        let previous = self.ids.insert(address_of(instance), id);
        debug_assert!(
            previous.is_none(),
            "instance registered twice in one serialize call"
        );
        id
    }
}

/// The allocation address of an `Rc`, used as its identity key.
#[inline]
fn address_of<T: ?Sized>(instance: &Rc<T>) -> usize {
    Rc::as_ptr(instance) as *const () as usize
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::cell::shared;

    use super::*;

    #[test]
    fn ids_are_assigned_in_first_visit_order() {
        let mut ctx = SerializeContext::new();
        let first = shared(1);
        let second = shared(2);
        let third = shared(3);

        assert_eq!(ctx.register(&first).get(), 0);
        assert_eq!(ctx.register(&second).get(), 1);
        assert_eq!(ctx.register(&third).get(), 2);
    }

    #[test]
    fn identity_not_equality() {
        let mut ctx = SerializeContext::new();
        let a = shared([1, 2, 3]);
        let b = shared([1, 2, 3]);

        let id_a = ctx.register(&a);
        let id_b = ctx.register(&b);
        assert_ne!(id_a, id_b);

        // A clone of the handle is the same instance.
        let alias = a.clone();
        assert_eq!(ctx.get_id(&alias), Some(id_a));
    }

    #[test]
    fn get_id_has_no_side_effects() {
        let mut ctx = SerializeContext::new();
        let instance = shared(());

        assert_eq!(ctx.get_id(&instance), None);
        assert_eq!(ctx.get_id(&instance), None);
        assert_eq!(ctx.register(&instance).get(), 0);
    }

    #[test]
    fn fresh_contexts_restart_numbering() {
        let instance = shared("x");

        let mut first_call = SerializeContext::new();
        assert_eq!(first_call.register(&instance).get(), 0);

        let mut second_call = SerializeContext::new();
        assert_eq!(second_call.get_id(&instance), None);
        assert_eq!(second_call.register(&instance).get(), 0);
    }
}
