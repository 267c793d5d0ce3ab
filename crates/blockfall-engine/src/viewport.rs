//! Viewport snapshots and resize fan-out.

use crate::config::PixelRatioConfig;
use crate::coords::Viewport;
use crate::layers::Camera;

/// Handle returned by [`ViewportOracle::subscribe`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(Viewport)>;

/// Source of the current viewport.
///
/// Listeners are called synchronously from [`resize`](Self::resize), in
/// subscription order.
pub struct ViewportOracle {
    current: Viewport,
    pixel_ratio: PixelRatioConfig,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl ViewportOracle {
    pub fn new(pixel_ratio: PixelRatioConfig) -> Self {
        Self { current: Viewport::unmeasured(), pixel_ratio, listeners: Vec::new(), next_id: 0 }
    }

    #[inline]
    pub fn current(&self) -> Viewport {
        self.current
    }

    pub fn subscribe(&mut self, listener: impl FnMut(Viewport) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    #[inline]
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Publishes a new viewport to every listener.
    pub fn resize(&mut self, viewport: Viewport) {
        log::debug!(
            "viewport {:.3}x{:.3} @{}",
            viewport.width,
            viewport.height,
            viewport.pixel_ratio
        );
        self.current = viewport;
        for (_, listener) in &mut self.listeners {
            listener(viewport);
        }
    }

    /// Publishes the viewport `camera` sees for a window of `px_width × px_height`
    /// logical pixels. The device pixel ratio is clamped to the configured range.
    pub fn resize_from_window(
        &mut self,
        px_width: f32,
        px_height: f32,
        device_pixel_ratio: f32,
        camera: &Camera,
    ) -> Viewport {
        let viewport = Viewport::from_perspective(
            px_width,
            px_height,
            self.pixel_ratio.clamp(device_pixel_ratio),
            camera.fov_y,
            camera.distance_to_origin_plane(),
        );
        self.resize(viewport);
        viewport
    }
}

impl Default for ViewportOracle {
    fn default() -> Self {
        Self::new(PixelRatioConfig::default())
    }
}

impl std::fmt::Debug for ViewportOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportOracle")
            .field("current", &self.current)
            .field("subscribers", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(oracle: &mut ViewportOracle) -> (SubscriptionId, Rc<RefCell<Vec<Viewport>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = oracle.subscribe(move |v| sink.borrow_mut().push(v));
        (id, seen)
    }

    // ── fan-out ───────────────────────────────────────────────────────────

    #[test]
    fn every_subscriber_sees_each_resize() {
        let mut oracle = ViewportOracle::default();
        let (_, a) = recorder(&mut oracle);
        let (_, b) = recorder(&mut oracle);

        oracle.resize(Viewport::new(10.0, 6.0, 1.0));
        oracle.resize(Viewport::new(12.0, 6.0, 1.0));

        assert_eq!(a.borrow().len(), 2);
        assert_eq!(*a.borrow(), *b.borrow());
        assert_eq!(oracle.current().width, 12.0);
    }

    #[test]
    fn unsubscribed_listener_stops_receiving() {
        let mut oracle = ViewportOracle::default();
        let (id, seen) = recorder(&mut oracle);
        oracle.resize(Viewport::new(10.0, 6.0, 1.0));

        assert!(oracle.unsubscribe(id));
        assert!(!oracle.unsubscribe(id));
        oracle.resize(Viewport::new(20.0, 6.0, 1.0));

        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(oracle.subscriber_count(), 0);
    }

    // ── window sizing ─────────────────────────────────────────────────────

    #[test]
    fn window_resize_clamps_pixel_ratio() {
        let mut oracle = ViewportOracle::default();
        let cam = Camera::default();

        assert_eq!(oracle.resize_from_window(800.0, 600.0, 3.0, &cam).pixel_ratio, 2.0);
        assert_eq!(oracle.resize_from_window(800.0, 600.0, 0.5, &cam).pixel_ratio, 1.0);
        assert_eq!(oracle.resize_from_window(800.0, 600.0, f32::NAN, &cam).pixel_ratio, 1.0);
    }

    #[test]
    fn window_resize_uses_camera_frustum() {
        let mut oracle = ViewportOracle::default();
        let cam = Camera::default();
        let v = oracle.resize_from_window(1600.0, 800.0, 1.0, &cam);
        approx::assert_relative_eq!(v.width, 2.0 * v.height, epsilon = 1e-5);
        assert!(v.is_measured());

        let v = oracle.resize_from_window(0.0, 0.0, 1.0, &cam);
        assert!(!v.is_measured());
    }
}
