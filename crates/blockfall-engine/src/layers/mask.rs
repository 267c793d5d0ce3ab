use core::fmt;
use core::ops::{BitAnd, BitOr};

use super::MAX_LAYERS;

/// Bit position of a layer inside a [`LayerMask`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct LayerIndex(pub(crate) u32);

impl LayerIndex {
    /// Returns `None` when `index` does not fit in a mask.
    #[inline]
    pub const fn new(index: u32) -> Option<Self> {
        if index < MAX_LAYERS { Some(Self(index)) } else { None }
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Bitset over layer indices.
///
/// Owned by exactly one camera or node. A node is visible to a camera iff the
/// two masks share at least one bit.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct LayerMask(u32);

impl LayerMask {
    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    pub const fn all() -> Self {
        Self(u32::MAX)
    }

    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn single(index: LayerIndex) -> Self {
        Self(1 << index.0)
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns a copy with `index` set.
    #[inline]
    #[must_use]
    pub const fn with(self, index: LayerIndex) -> Self {
        Self(self.0 | (1 << index.0))
    }

    #[inline]
    pub fn enable(&mut self, index: LayerIndex) {
        self.0 |= 1 << index.0;
    }

    #[inline]
    pub fn disable(&mut self, index: LayerIndex) {
        self.0 &= !(1 << index.0);
    }

    #[inline]
    pub fn toggle(&mut self, index: LayerIndex) {
        self.0 ^= 1 << index.0;
    }

    #[inline]
    pub const fn contains(self, index: LayerIndex) -> bool {
        self.0 & (1 << index.0) != 0
    }

    /// Mutual visibility test between a camera mask and a node mask.
    #[inline]
    pub const fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    #[must_use]
    pub const fn union(self, other: LayerMask) -> Self {
        Self(self.0 | other.0)
    }

    /// Iterates set indices in ascending order.
    pub fn indices(self) -> impl Iterator<Item = LayerIndex> {
        (0..MAX_LAYERS).filter(move |i| self.0 & (1 << i) != 0).map(LayerIndex)
    }
}

impl Default for LayerMask {
    /// Layer 0 only, matching a freshly created layer set.
    fn default() -> Self {
        Self(1)
    }
}

impl BitOr for LayerMask {
    type Output = LayerMask;
    #[inline]
    fn bitor(self, rhs: LayerMask) -> LayerMask {
        self.union(rhs)
    }
}

impl BitAnd for LayerMask {
    type Output = LayerMask;
    #[inline]
    fn bitand(self, rhs: LayerMask) -> LayerMask {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for LayerMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerMask({:#034b})", self.0)
    }
}
