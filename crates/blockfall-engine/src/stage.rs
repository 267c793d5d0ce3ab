//! Frame driver.
//!
//! [`Stage`] owns the camera, the asset cache and the last composed tree, and
//! advances them once per [`frame`](Stage::frame):
//!
//! 1. take the latest viewport delivered by the oracle subscription
//! 2. apply asset completions
//! 3. rebuild the tree if the viewport or any asset changed
//! 4. enable camera layers before the first submission
//! 5. hand the tree and camera to the [`HostRenderer`] if anything changed

use std::cell::Cell;
use std::rc::Rc;

use crate::assets::{AssetCache, AssetId, AssetProvider, ScopeId};
use crate::config::SceneConfig;
use crate::coords::{Vec3, Viewport};
use crate::error::{AssetLoadError, ConfigurationError};
use crate::layers::{Camera, CameraState, LayerRegistry};
use crate::scene::{SceneAssets, SceneComposer, SceneInputs, SceneTree};
use crate::viewport::{SubscriptionId, ViewportOracle};

/// Consumer of composed scenes, typically a GPU renderer.
pub trait HostRenderer {
    fn submit(&mut self, tree: &SceneTree, camera: &Camera);
}

/// What one [`Stage::frame`] did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub resized: bool,
    pub rebuilt: bool,
    pub submitted: bool,
    /// Camera layers were enabled during this frame.
    pub layers_enabled: bool,
    pub requested: usize,
    pub resolved: usize,
    pub failed_assets: Vec<AssetLoadError>,
    pub discarded: usize,
}

#[derive(Debug)]
struct TitleAssets {
    stars: AssetId,
    logo: AssetId,
    game_box: AssetId,
    status_box: AssetId,
    font: AssetId,
}

#[derive(Debug)]
pub struct Stage {
    registry: LayerRegistry,
    composer: SceneComposer,
    camera: Camera,
    cache: AssetCache,
    scope: ScopeId,
    ids: TitleAssets,

    viewport: Viewport,
    inbox: Rc<Cell<Option<Viewport>>>,
    subscription: Option<SubscriptionId>,

    tree: Option<SceneTree>,
    built_revision: u64,
    frame: u64,
    torn_down: bool,
}

impl Stage {
    pub fn new(config: &SceneConfig, registry: LayerRegistry) -> Result<Self, ConfigurationError> {
        let composer = SceneComposer::new(config, &registry)?;
        let camera = Camera::new(Vec3::from(config.camera.position), config.camera.fov_y);
        let mut cache = AssetCache::new();
        let scope = cache.open_scope();
        let a = &config.assets;
        let ids = TitleAssets {
            stars: AssetId::new(&a.stars),
            logo: AssetId::new(&a.logo),
            game_box: AssetId::new(&a.game_box),
            status_box: AssetId::new(&a.status_box),
            font: AssetId::new(&a.font),
        };

        log::debug!("stage ready with {} layers", registry.len());
        Ok(Self {
            registry,
            composer,
            camera,
            cache,
            scope,
            ids,
            viewport: Viewport::unmeasured(),
            inbox: Rc::new(Cell::new(None)),
            subscription: None,
            tree: None,
            built_revision: 0,
            frame: 0,
            torn_down: false,
        })
    }

    /// Subscribes to `oracle` and takes its current viewport.
    pub fn attach(&mut self, oracle: &mut ViewportOracle) {
        if let Some(id) = self.subscription.take() {
            oracle.unsubscribe(id);
        }
        let inbox = Rc::clone(&self.inbox);
        self.subscription = Some(oracle.subscribe(move |v| inbox.set(Some(v))));
        self.inbox.set(Some(oracle.current()));
    }

    pub fn detach(&mut self, oracle: &mut ViewportOracle) {
        if let Some(id) = self.subscription.take() {
            oracle.unsubscribe(id);
        }
    }

    /// Runs one frame. See the module docs for the order of steps.
    pub fn frame(&mut self, provider: &mut dyn AssetProvider, host: &mut dyn HostRenderer) -> FrameReport {
        self.frame += 1;
        let mut report = FrameReport { frame: self.frame, ..FrameReport::default() };

        if let Some(v) = self.inbox.take() {
            if v != self.viewport {
                self.viewport = v;
                report.resized = true;
            }
        }

        let pumped = self.cache.pump(provider);
        report.requested = pumped.requested;
        report.resolved = pumped.resolved;
        report.discarded = pumped.discarded;
        report.failed_assets = pumped.failed;

        if self.torn_down {
            return report;
        }

        let mut changed = false;
        if self.tree.is_none() || report.resized || self.cache.revision() != self.built_revision {
            let inputs = SceneInputs { viewport: self.viewport, assets: self.acquire() };
            let tree = self.composer.build(&inputs);
            self.built_revision = self.cache.revision();
            report.rebuilt = true;
            changed = self.tree.as_ref() != Some(&tree);
            log::debug!(
                "frame {}: rebuilt scene ({} nodes, {} assets pending)",
                self.frame,
                tree.node_count(),
                self.cache.pending_count()
            );
            self.tree = Some(tree);
            // Anything the rebuild asked for goes out now, not next frame.
            report.requested += self.cache.flush(provider);
        }

        if self.camera.state() == CameraState::Uninitialized {
            self.camera.enable_layers(&self.registry);
            report.layers_enabled = true;
            changed = true;
        }

        if changed {
            if let Some(tree) = &self.tree {
                host.submit(tree, &self.camera);
                report.submitted = true;
            }
        }
        report
    }

    fn acquire(&mut self) -> SceneAssets {
        let (cache, scope, ids) = (&mut self.cache, self.scope, &self.ids);
        SceneAssets {
            stars: cache.texture(scope, &ids.stars),
            logo: cache.texture(scope, &ids.logo),
            game_box: cache.texture(scope, &ids.game_box),
            status_box: cache.texture(scope, &ids.status_box),
            font: cache.font(scope, &ids.font),
        }
    }

    /// Drops the scene and cancels this stage's pending loads. Completions that
    /// arrive afterwards are discarded by later frames.
    pub fn teardown(&mut self) -> usize {
        if self.torn_down {
            return 0;
        }
        self.torn_down = true;
        self.tree = None;
        let cancelled = self.cache.release_scope(self.scope);
        log::debug!("stage torn down, {cancelled} pending load(s) cancelled");
        cancelled
    }

    /// Forgets failed assets; the next frame requests them again.
    pub fn retry_failed(&mut self) -> usize {
        self.cache.retry_failed()
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn tree(&self) -> Option<&SceneTree> {
        self.tree.as_ref()
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    #[inline]
    pub fn pending_assets(&self) -> usize {
        self.cache.pending_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::cache::tests::{ManualProvider, texture};
    use crate::assets::{AssetHandle, FontHandle};
    use crate::coords::Vec2;
    use crate::scene::NodeKind;
    use crate::text::ParsedFont;
    use crate::text::typeface::tests::BLOCK_FONT;

    #[derive(Default)]
    struct RecordingHost {
        submissions: Vec<(Viewport, CameraState, usize)>,
    }

    impl HostRenderer for RecordingHost {
        fn submit(&mut self, tree: &SceneTree, camera: &Camera) {
            self.submissions.push((tree.viewport(), camera.state(), tree.node_count()));
        }
    }

    struct Rig {
        stage: Stage,
        oracle: ViewportOracle,
        provider: ManualProvider,
        host: RecordingHost,
    }

    impl Rig {
        fn new() -> Self {
            let mut stage = Stage::new(&SceneConfig::default(), LayerRegistry::standard()).unwrap();
            let mut oracle = ViewportOracle::default();
            oracle.resize(Viewport::new(10.0, 7.67, 1.0));
            stage.attach(&mut oracle);
            Self { stage, oracle, provider: ManualProvider::default(), host: RecordingHost::default() }
        }

        fn frame(&mut self) -> FrameReport {
            self.stage.frame(&mut self.provider, &mut self.host)
        }

        fn load_all(&mut self) {
            let requests = self.provider.requests.clone();
            for (ticket, req) in requests {
                let handle = if req.id.as_str().ends_with(".json") {
                    let font = ParsedFont::from_typeface_json(BLOCK_FONT).unwrap();
                    AssetHandle::Font(FontHandle::new(req.id.clone(), font))
                } else {
                    texture(req.id.as_str())
                };
                self.provider.complete_ok(ticket, handle);
            }
        }
    }

    // ── first frame ───────────────────────────────────────────────────────

    #[test]
    fn first_frame_builds_enables_and_submits() {
        let mut rig = Rig::new();
        let report = rig.frame();

        assert!(report.rebuilt && report.submitted && report.layers_enabled);
        assert_eq!(report.requested, 5);
        assert_eq!(rig.provider.requests.len(), 5);
        assert_eq!(rig.host.submissions.len(), 1);
        assert_eq!(rig.host.submissions[0].1, CameraState::LayersEnabled);
        assert_eq!(rig.host.submissions[0].2, 8);
    }

    #[test]
    fn layers_are_enabled_exactly_once() {
        let mut rig = Rig::new();
        let transitions = (0..4).map(|_| rig.frame()).filter(|r| r.layers_enabled).count();
        assert_eq!(transitions, 1);
        assert_eq!(rig.stage.camera().state(), CameraState::LayersEnabled);
    }

    #[test]
    fn idle_frame_does_nothing() {
        let mut rig = Rig::new();
        rig.frame();
        let report = rig.frame();
        assert!(!report.rebuilt && !report.submitted);
        assert_eq!(rig.host.submissions.len(), 1);
    }

    // ── rebuild triggers ──────────────────────────────────────────────────

    #[test]
    fn resize_rebuilds_with_latest_viewport() {
        let mut rig = Rig::new();
        rig.frame();
        rig.oracle.resize(Viewport::new(12.0, 7.67, 1.0));
        rig.oracle.resize(Viewport::new(14.0, 7.67, 1.0));
        let report = rig.frame();

        assert!(report.resized && report.rebuilt && report.submitted);
        assert_eq!(rig.host.submissions.last().unwrap().0.width, 14.0);
        assert_eq!(rig.stage.tree().unwrap().find("stars").unwrap().transform.size.x, 14.0);
    }

    #[test]
    fn same_size_resize_is_ignored() {
        let mut rig = Rig::new();
        rig.frame();
        rig.oracle.resize(Viewport::new(10.0, 7.67, 1.0));
        assert!(!rig.frame().rebuilt);
    }

    #[test]
    fn asset_completion_replaces_placeholders() {
        let mut rig = Rig::new();
        rig.frame();
        assert!(rig.stage.tree().unwrap().find("logo").unwrap().is_group());

        rig.load_all();
        let report = rig.frame();
        assert_eq!(report.resolved, 5);
        assert!(report.rebuilt && report.submitted);

        let tree = rig.stage.tree().unwrap();
        assert_eq!(tree.find("logo").unwrap().kind, NodeKind::Plane);
        assert!(matches!(tree.find("title").unwrap().kind, NodeKind::TextGlyph { .. }));
        assert_eq!(rig.stage.pending_assets(), 0);
    }

    #[test]
    fn resize_and_asset_completion_in_one_frame() {
        let mut rig = Rig::new();
        rig.frame();
        let ticket = rig.provider.ticket_for("milky_way.jpeg");
        rig.provider.complete_ok(ticket, texture("milky_way.jpeg"));
        rig.oracle.resize(Viewport::new(20.0, 6.0, 1.0));

        let report = rig.frame();
        assert!(report.resized && report.rebuilt && report.submitted);
        assert_eq!(report.resolved, 1);
        assert_eq!(rig.host.submissions.len(), 2);

        let stars = rig.stage.tree().unwrap().find("stars").unwrap();
        assert!(!stars.is_group());
        assert_eq!(stars.transform.size, Vec2::new(20.0, 6.0));
    }

    #[test]
    fn failed_asset_is_reported_and_retried() {
        let mut rig = Rig::new();
        rig.frame();
        let ticket = rig.provider.ticket_for("tstatus.png");
        rig.provider.complete_err(ticket, "tstatus.png");

        let report = rig.frame();
        assert_eq!(report.failed_assets.len(), 1);
        assert_eq!(report.failed_assets[0].id, "tstatus.png");
        assert!(rig.stage.tree().unwrap().find("status_box").unwrap().is_group());

        assert_eq!(rig.stage.retry_failed(), 1);
        let report = rig.frame();
        assert_eq!(report.requested, 1);
        assert_eq!(rig.provider.requests.len(), 6);
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn zero_title_size_fails_construction() {
        let mut config = SceneConfig::default();
        config.title_text.size = 0.0;
        let err = Stage::new(&config, LayerRegistry::standard()).unwrap_err();
        assert!(matches!(err, ConfigurationError::TitleText(_)));
    }

    // ── teardown ──────────────────────────────────────────────────────────

    #[test]
    fn teardown_discards_late_completions() {
        let mut rig = Rig::new();
        rig.frame();
        assert_eq!(rig.stage.teardown(), 5);
        assert_eq!(rig.stage.teardown(), 0);

        rig.load_all();
        let report = rig.frame();
        assert_eq!(report.discarded, 5);
        assert_eq!(report.resolved, 0);
        assert!(!report.submitted);
        assert!(rig.stage.tree().is_none());
    }

    #[test]
    fn detached_stage_ignores_resizes() {
        let mut rig = Rig::new();
        rig.frame();
        rig.stage.detach(&mut rig.oracle);
        rig.oracle.resize(Viewport::new(20.0, 7.67, 1.0));
        assert!(!rig.frame().resized);
        assert_eq!(rig.stage.viewport().width, 10.0);
    }
}
