use std::io;
use std::path::{Component, Path, PathBuf};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::error::{AssetLoadError, AssetLoadReason};
use crate::text::ParsedFont;

use super::{
    AssetCompletion, AssetHandle, AssetId, AssetKind, AssetProvider, AssetRequest, FontHandle, LoadTicket,
    TextureData, TextureHandle,
};

struct Job {
    ticket: LoadTicket,
    request: AssetRequest,
}

/// Loads assets from files under a root directory on a background thread.
///
/// Textures are decoded with `image` (PNG, JPEG); fonts must be typeface JSON.
pub struct DirectoryProvider {
    root: PathBuf,
    jobs: Option<Sender<Job>>,
    done: Receiver<AssetCompletion>,
    /// Requests the worker never accepted, failed on the next poll.
    undelivered: Vec<AssetCompletion>,
    worker: Option<JoinHandle<()>>,
}

impl DirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        let (jobs_tx, jobs_rx) = unbounded::<Job>();
        let (done_tx, done_rx) = unbounded();

        let worker_root = root.clone();
        let worker = thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || run_loader(&worker_root, jobs_rx, done_tx))?;

        log::info!("loading assets from {}", root.display());
        Ok(Self { root, jobs: Some(jobs_tx), done: done_rx, undelivered: Vec::new(), worker: Some(worker) })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetProvider for DirectoryProvider {
    fn request(&mut self, ticket: LoadTicket, request: &AssetRequest) {
        let sent = match &self.jobs {
            Some(jobs) => jobs.send(Job { ticket, request: request.clone() }).is_ok(),
            None => false,
        };
        if !sent {
            log::error!("asset loader thread is gone; `{}` cannot load", request.id);
            let err = AssetLoadError::new(request.id.as_str(), AssetLoadReason::Io, "asset loader is not running");
            self.undelivered.push(AssetCompletion { ticket, result: Err(err) });
        }
    }

    fn poll(&mut self) -> Vec<AssetCompletion> {
        let mut out = std::mem::take(&mut self.undelivered);
        out.extend(self.done.try_iter());
        out
    }
}

impl Drop for DirectoryProvider {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop.
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("asset loader thread panicked");
            }
        }
    }
}

fn run_loader(root: &Path, jobs: Receiver<Job>, done: Sender<AssetCompletion>) {
    for Job { ticket, request } in jobs.iter() {
        let result = load(root, &request);
        if let Err(e) = &result {
            log::debug!("load #{} failed: {e}", ticket.get());
        }
        if done.send(AssetCompletion { ticket, result }).is_err() {
            break;
        }
    }
    log::debug!("asset loader stopped");
}

fn load(root: &Path, request: &AssetRequest) -> Result<AssetHandle, AssetLoadError> {
    let id = &request.id;
    let fail = |reason, detail: String| AssetLoadError::new(id.as_str(), reason, detail);

    let path = resolve(root, id).ok_or_else(|| fail(AssetLoadReason::Unsupported, "path escapes asset root".into()))?;
    if request.kind == AssetKind::Font && path.extension().is_none_or(|ext| ext != "json") {
        return Err(fail(AssetLoadReason::Unsupported, "fonts must be typeface JSON".into()));
    }

    let bytes = std::fs::read(&path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => fail(AssetLoadReason::NotFound, path.display().to_string()),
        _ => fail(AssetLoadReason::Io, e.to_string()),
    })?;

    match request.kind {
        AssetKind::Texture => {
            let rgba = image::load_from_memory(&bytes)
                .map_err(|e| match e {
                    image::ImageError::Unsupported(u) => fail(AssetLoadReason::Unsupported, u.to_string()),
                    other => fail(AssetLoadReason::Decode, other.to_string()),
                })?
                .to_rgba8();
            let (width, height) = rgba.dimensions();
            let data = TextureData { width, height, rgba8: rgba.into_raw() };
            Ok(AssetHandle::Texture(TextureHandle::new(id.clone(), data)))
        }
        AssetKind::Font => {
            let src = std::str::from_utf8(&bytes).map_err(|e| fail(AssetLoadReason::Decode, e.to_string()))?;
            let font = ParsedFont::from_typeface_json(src).map_err(|e| fail(AssetLoadReason::Decode, e.to_string()))?;
            Ok(AssetHandle::Font(FontHandle::new(id.clone(), font)))
        }
    }
}

/// Joins `id` onto `root`, rejecting absolute paths and `..`.
fn resolve(root: &Path, id: &AssetId) -> Option<PathBuf> {
    let rel = Path::new(id.as_str());
    rel.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir)).then(|| root.join(rel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("blockfall-assets-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn load_one(provider: &mut DirectoryProvider, id: &str, kind: AssetKind) -> AssetCompletion {
        provider.request(LoadTicket(7), &AssetRequest { id: AssetId::from(id), kind });
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(c) = provider.poll().pop() {
                return c;
            }
            assert!(Instant::now() < deadline, "loader never answered");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn request_without_worker_fails_on_next_poll() {
        let dir = scratch_dir("stopped");
        let mut provider = DirectoryProvider::new(&dir).unwrap();
        provider.jobs.take();

        let c = load_one(&mut provider, "box.png", AssetKind::Texture);
        assert_eq!(c.ticket, LoadTicket(7));
        let err = c.result.unwrap_err();
        assert_eq!(err.reason, AssetLoadReason::Io);
        assert_eq!(err.id, "box.png");
        assert!(provider.poll().is_empty());
    }

    #[test]
    fn decodes_png_texture() {
        let dir = scratch_dir("png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255])).save(dir.join("box.png")).unwrap();

        let mut provider = DirectoryProvider::new(&dir).unwrap();
        let c = load_one(&mut provider, "box.png", AssetKind::Texture);
        assert_eq!(c.ticket, LoadTicket(7));
        let AssetHandle::Texture(tex) = c.result.unwrap() else { panic!("expected texture") };
        assert_eq!((tex.width, tex.height), (3, 2));
        assert_eq!(&tex.rgba8[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn parses_typeface_font() {
        let dir = scratch_dir("font");
        std::fs::write(dir.join("block.json"), crate::text::typeface::tests::BLOCK_FONT).unwrap();

        let mut provider = DirectoryProvider::new(&dir).unwrap();
        let c = load_one(&mut provider, "block.json", AssetKind::Font);
        let AssetHandle::Font(font) = c.result.unwrap() else { panic!("expected font") };
        assert!(font.glyph('I').is_some());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = scratch_dir("missing");
        let mut provider = DirectoryProvider::new(&dir).unwrap();
        let err = load_one(&mut provider, "nope.png", AssetKind::Texture).result.unwrap_err();
        assert_eq!(err.reason, AssetLoadReason::NotFound);
        assert_eq!(err.id, "nope.png");
    }

    #[test]
    fn garbage_texture_fails_to_decode() {
        let dir = scratch_dir("garbage");
        std::fs::write(dir.join("bad.png"), b"\x89PNG\r\n\x1a\nnot really").unwrap();
        let mut provider = DirectoryProvider::new(&dir).unwrap();
        let err = load_one(&mut provider, "bad.png", AssetKind::Texture).result.unwrap_err();
        assert!(matches!(err.reason, AssetLoadReason::Decode | AssetLoadReason::Unsupported));
    }

    #[test]
    fn non_json_font_and_parent_paths_are_unsupported() {
        let dir = scratch_dir("unsupported");
        let mut provider = DirectoryProvider::new(&dir).unwrap();
        let err = load_one(&mut provider, "font.ttf", AssetKind::Font).result.unwrap_err();
        assert_eq!(err.reason, AssetLoadReason::Unsupported);
        let err = load_one(&mut provider, "../secret.png", AssetKind::Texture).result.unwrap_err();
        assert_eq!(err.reason, AssetLoadReason::Unsupported);
    }
}
