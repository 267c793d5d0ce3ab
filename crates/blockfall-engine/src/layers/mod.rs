//! Render layers.
//!
//! Responsibilities:
//! - name a fixed set of layers at startup ([`LayerRegistry`])
//! - represent layer membership as a bitset ([`LayerMask`])
//! - own the camera-side mask and its one-shot enable transition ([`Camera`])

mod camera;
mod mask;
mod registry;

pub use camera::{Camera, CameraState};
pub use mask::{LayerIndex, LayerMask};
pub use registry::{Layer, LayerRegistry, LayerRegistryBuilder, names};

/// Number of bits in a [`LayerMask`].
pub const MAX_LAYERS: u32 = 32;

#[cfg(test)]
mod tests {
    use super::*;

    // ── LayerMask ─────────────────────────────────────────────────────────

    fn idx(i: u32) -> LayerIndex {
        LayerIndex::new(i).unwrap()
    }

    #[test]
    fn index_bounds() {
        assert!(LayerIndex::new(31).is_some());
        assert!(LayerIndex::new(32).is_none());
    }

    #[test]
    fn enable_disable_toggle() {
        let mut m = LayerMask::empty();
        m.enable(idx(3));
        assert!(m.contains(idx(3)));
        m.toggle(idx(5));
        assert_eq!(m.bits(), (1 << 3) | (1 << 5));
        m.disable(idx(3));
        m.toggle(idx(5));
        assert!(m.is_empty());
    }

    #[test]
    fn visibility_requires_shared_bit() {
        let cam = LayerMask::single(idx(1)).with(idx(2));
        assert!(cam.intersects(LayerMask::single(idx(2))));
        assert!(!cam.intersects(LayerMask::single(idx(4))));
        assert!(!cam.intersects(LayerMask::empty()));
    }

    #[test]
    fn indices_are_ascending() {
        let m = LayerMask::single(idx(4)) | LayerMask::single(idx(1));
        let got: Vec<u32> = m.indices().map(LayerIndex::get).collect();
        assert_eq!(got, vec![1, 4]);
        assert_eq!((m & LayerMask::single(idx(4))).bits(), 1 << 4);
    }

    #[test]
    fn highest_bit_is_usable() {
        let m = LayerMask::single(idx(31));
        assert_eq!(m.bits(), 1 << 31);
        assert!(LayerMask::all().contains(idx(31)));
    }
}
