//! Hash containers used by the contexts, based on *hashbrown* and *foldhash*.

use core::hash::BuildHasher;

use foldhash::fast::{FixedState, FoldHasher};

/// A fixed hash seed, so lookups do not depend on process-global randomness.
const FIXED_STATE: FixedState = FixedState::with_seed(0x6B1E_40F2_9ACD_8735);

/// Hasher created through [`FixedHashState::build_hasher`].
pub type FixedHasher = FoldHasher<'static>;

/// Hash state with a fixed seed; results depend only on the input.
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_STATE.build_hasher()
    }
}

/// The map type shared by [`SerializeContext`] and [`DeserializeContext`].
///
/// [`SerializeContext`]: crate::ser::SerializeContext
/// [`DeserializeContext`]: crate::de::DeserializeContext
pub type HashMap<K, V, S = FixedHashState> = hashbrown::HashMap<K, V, S>;
