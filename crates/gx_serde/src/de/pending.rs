use core::fmt;

use crate::cell::Shared;
use crate::node::NodeId;

// -----------------------------------------------------------------------------
// PendingRef

/// Sentinel meaning "the referenced instance is not constructed yet".
///
/// Returned by [`get_or_defer`](crate::de::DeserializeContext::get_or_defer)
/// for a forward reference. It is an immutable marker, distinguishable from
/// any real payload value by construction (a dedicated variant of
/// [`Resolved`], never a magic in-band value), and it is transient: after
/// [`apply_patches`](crate::de::DeserializeContext::apply_patches) succeeds
/// no finished graph contains one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRef {
    id: NodeId,
}

impl PendingRef {
    #[inline]
    pub(crate) const fn new(id: NodeId) -> Self {
        Self { id }
    }

    /// The unresolved id this sentinel stands in for.
    #[inline]
    pub const fn id(self) -> NodeId {
        self.id
    }
}

impl fmt::Display for PendingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pending reference to `{}`", self.id)
    }
}

// -----------------------------------------------------------------------------
// Resolved

/// What a per-node deserializer returns: either the instance, or a
/// [`PendingRef`] for a referent that appears later in traversal order.
///
/// Unresolved is a normal, expected intermediate state — callers queue the
/// write through
/// [`assign_or_defer`](crate::de::DeserializeContext::assign_or_defer)
/// instead of treating it as a failure.
pub enum Resolved<T> {
    /// The constructed (possibly still-being-populated) instance.
    Obj(Shared<T>),
    /// The referent is not constructed yet.
    Pending(PendingRef),
}

impl<T> Resolved<T> {
    /// Whether this is a [`PendingRef`].
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// The instance, if already resolved.
    #[inline]
    pub fn obj(self) -> Option<Shared<T>> {
        match self {
            Self::Obj(instance) => Some(instance),
            Self::Pending(_) => None,
        }
    }
}

impl<T> Clone for Resolved<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Obj(instance) => Self::Obj(instance.clone()),
            Self::Pending(pending) => Self::Pending(*pending),
        }
    }
}

impl<T> fmt::Debug for Resolved<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Obj(_) => f.write_str("Resolved::Obj(..)"),
            Self::Pending(pending) => write!(f, "Resolved::Pending({pending})"),
        }
    }
}
