use crate::coords::Vec3;

use super::{LayerMask, LayerRegistry};

/// Layer state of a camera.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CameraState {
    /// Only the default mask is set; no registry layers enabled yet.
    Uninitialized,
    /// Every registry layer is enabled on the camera.
    LayersEnabled,
}

/// Perspective camera with a layer mask.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    mask: LayerMask,
    state: CameraState,
}

impl Camera {
    pub fn new(position: Vec3, fov_y: f32) -> Self {
        Self { position, fov_y, mask: LayerMask::default(), state: CameraState::Uninitialized }
    }

    #[inline]
    pub fn mask(&self) -> LayerMask {
        self.mask
    }

    #[inline]
    pub fn state(&self) -> CameraState {
        self.state
    }

    /// Replaces the mask, e.g. for a dedicated per-layer pass.
    pub fn set_mask(&mut self, mask: LayerMask) {
        self.mask = mask;
    }

    /// Enables every layer defined in `registry`.
    ///
    /// The first call replaces the fresh-camera layer 0 with exactly the
    /// defined layers. Later calls only enable layers, so calling this twice
    /// leaves the same mask as calling it once.
    pub fn enable_layers(&mut self, registry: &LayerRegistry) {
        if self.state == CameraState::Uninitialized {
            self.mask = registry.all();
            log::debug!("camera layers enabled: {:?}", self.mask);
            self.state = CameraState::LayersEnabled;
            return;
        }
        for layer in registry.iter() {
            self.mask.enable(layer.index);
        }
    }

    /// Returns whether something carrying `mask` is visible to this camera.
    #[inline]
    pub fn sees(&self, mask: LayerMask) -> bool {
        self.mask.intersects(mask)
    }

    /// Distance from the camera to the `z = 0` plane.
    #[inline]
    pub fn distance_to_origin_plane(&self) -> f32 {
        self.position.z.abs()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 5.0), 75.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::names;

    #[test]
    fn fresh_camera_only_sees_layer_zero() {
        let reg = LayerRegistry::standard();
        let cam = Camera::default();
        assert_eq!(cam.state(), CameraState::Uninitialized);
        assert!(cam.sees(LayerMask::default()));
        assert!(!cam.sees(reg.mask(&[names::STARS]).unwrap()));
    }

    #[test]
    fn enable_layers_transitions_once() {
        let reg = LayerRegistry::standard();
        let mut cam = Camera::default();
        cam.enable_layers(&reg);
        assert_eq!(cam.state(), CameraState::LayersEnabled);
        for layer in reg.iter() {
            assert!(cam.mask().contains(layer.index));
        }
    }

    #[test]
    fn enable_layers_is_idempotent() {
        let reg = LayerRegistry::standard();
        let mut once = Camera::default();
        once.enable_layers(&reg);

        let mut twice = Camera::default();
        twice.enable_layers(&reg);
        twice.enable_layers(&reg);

        assert_eq!(once.mask(), twice.mask());
        assert_eq!(twice.mask(), reg.all());
    }

    #[test]
    fn enabled_mask_drops_fresh_layer_zero() {
        let reg = LayerRegistry::standard();
        let mut cam = Camera::default();
        cam.enable_layers(&reg);
        assert_eq!(cam.mask().bits(), 0b11110);
        assert!(!cam.sees(LayerMask::default()));
    }

    #[test]
    fn restricted_mask_hides_other_layers() {
        let reg = LayerRegistry::standard();
        let mut cam = Camera::default();
        cam.set_mask(reg.mask(&[names::GAME]).unwrap());
        assert!(cam.sees(reg.mask(&[names::GAME, names::LOGO]).unwrap()));
        assert!(!cam.sees(reg.mask(&[names::LOGO]).unwrap()));
    }
}
