use std::collections::HashMap;

use crate::error::{AssetLoadError, AssetLoadReason};

use super::{
    AssetCompletion, AssetHandle, AssetId, AssetKind, AssetProvider, AssetRequest, AssetState, FontHandle,
    LoadTicket, TextureHandle,
};

/// Owner of pending requests. Releasing a scope cancels the loads only it waits on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ScopeId(u32);

#[derive(Debug)]
enum Entry {
    Pending(LoadTicket),
    Ready(AssetHandle),
    Failed(AssetLoadError),
}

#[derive(Debug)]
struct PendingLoad {
    request: AssetRequest,
    scopes: Vec<ScopeId>,
}

/// Result of one [`AssetCache::pump`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PumpReport {
    pub requested: usize,
    pub resolved: usize,
    pub failed: Vec<AssetLoadError>,
    /// Completions whose requesting scopes were all released before arrival.
    pub discarded: usize,
}

impl PumpReport {
    /// True when any asset changed state.
    pub fn changed(&self) -> bool {
        self.resolved > 0 || !self.failed.is_empty()
    }
}

/// Per-identifier asset state in front of an [`AssetProvider`].
///
/// Each identifier is requested at most once while pending or resolved, and the
/// resolved handle is shared by every consumer.
#[derive(Debug, Default)]
pub struct AssetCache {
    entries: HashMap<AssetId, Entry>,
    pending: HashMap<LoadTicket, PendingLoad>,
    outbox: Vec<LoadTicket>,
    next_ticket: u64,
    next_scope: u32,
    revision: u64,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_scope(&mut self) -> ScopeId {
        let id = ScopeId(self.next_scope);
        self.next_scope = self.next_scope.wrapping_add(1);
        id
    }

    /// Current state of a texture, queueing a request if it was never asked for.
    pub fn texture(&mut self, scope: ScopeId, id: &AssetId) -> AssetState<TextureHandle> {
        match self.acquire(scope, id, AssetKind::Texture) {
            AssetState::Ready(AssetHandle::Texture(t)) => AssetState::Ready(t),
            AssetState::Ready(_) => AssetState::Failed(kind_mismatch(id, AssetKind::Texture)),
            AssetState::Pending => AssetState::Pending,
            AssetState::Failed(e) => AssetState::Failed(e),
        }
    }

    /// Current state of a font, queueing a request if it was never asked for.
    pub fn font(&mut self, scope: ScopeId, id: &AssetId) -> AssetState<FontHandle> {
        match self.acquire(scope, id, AssetKind::Font) {
            AssetState::Ready(AssetHandle::Font(f)) => AssetState::Ready(f),
            AssetState::Ready(_) => AssetState::Failed(kind_mismatch(id, AssetKind::Font)),
            AssetState::Pending => AssetState::Pending,
            AssetState::Failed(e) => AssetState::Failed(e),
        }
    }

    fn acquire(&mut self, scope: ScopeId, id: &AssetId, kind: AssetKind) -> AssetState<AssetHandle> {
        match self.entries.get(id) {
            Some(Entry::Ready(h)) => return AssetState::Ready(h.clone()),
            Some(Entry::Failed(e)) => return AssetState::Failed(e.clone()),
            Some(Entry::Pending(ticket)) => {
                if let Some(load) = self.pending.get_mut(ticket) {
                    if !load.scopes.contains(&scope) {
                        load.scopes.push(scope);
                    }
                }
                return AssetState::Pending;
            }
            None => {}
        }

        let ticket = LoadTicket(self.next_ticket);
        self.next_ticket += 1;
        self.entries.insert(id.clone(), Entry::Pending(ticket));
        self.pending.insert(
            ticket,
            PendingLoad { request: AssetRequest { id: id.clone(), kind }, scopes: vec![scope] },
        );
        self.outbox.push(ticket);
        AssetState::Pending
    }

    /// Sends queued requests to `provider` without polling it.
    pub fn flush(&mut self, provider: &mut dyn AssetProvider) -> usize {
        let mut sent = 0;
        for ticket in self.outbox.drain(..) {
            // Cancelled before it was ever sent.
            let Some(load) = self.pending.get(&ticket) else { continue };
            log::debug!("requesting {:?} `{}`", load.request.kind, load.request.id);
            provider.request(ticket, &load.request);
            sent += 1;
        }
        sent
    }

    /// Sends queued requests, then applies every completion the provider has.
    pub fn pump(&mut self, provider: &mut dyn AssetProvider) -> PumpReport {
        let mut report = PumpReport { requested: self.flush(provider), ..PumpReport::default() };

        for AssetCompletion { ticket, result } in provider.poll() {
            let Some(load) = self.pending.remove(&ticket) else {
                log::debug!("discarding completion for cancelled load #{}", ticket.get());
                report.discarded += 1;
                continue;
            };

            let id = load.request.id;
            let entry = match result {
                Ok(handle) if handle.kind() == load.request.kind => {
                    log::debug!("asset `{id}` ready");
                    report.resolved += 1;
                    Entry::Ready(handle)
                }
                Ok(_) => {
                    let err = kind_mismatch(&id, load.request.kind);
                    log::warn!("{err}");
                    report.failed.push(err.clone());
                    Entry::Failed(err)
                }
                Err(err) => {
                    log::warn!("{err}");
                    report.failed.push(err.clone());
                    Entry::Failed(err)
                }
            };
            self.entries.insert(id, entry);
            self.revision += 1;
        }

        report
    }

    /// Stops waiting on behalf of `scope`. Loads no other scope waits on are
    /// cancelled: their completions will be discarded and the identifier reverts
    /// to never-requested.
    pub fn release_scope(&mut self, scope: ScopeId) -> usize {
        let mut cancelled = Vec::new();
        for (ticket, load) in self.pending.iter_mut() {
            load.scopes.retain(|s| *s != scope);
            if load.scopes.is_empty() {
                cancelled.push(*ticket);
            }
        }
        for ticket in &cancelled {
            if let Some(load) = self.pending.remove(ticket) {
                log::debug!("cancelled load of `{}`", load.request.id);
                self.entries.remove(&load.request.id);
            }
        }
        if !cancelled.is_empty() {
            self.revision += 1;
        }
        cancelled.len()
    }

    /// Forgets failures so the next access requests those assets again.
    pub fn retry_failed(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| !matches!(e, Entry::Failed(_)));
        let cleared = before - self.entries.len();
        if cleared > 0 {
            log::info!("retrying {cleared} failed asset(s)");
            self.revision += 1;
        }
        cleared
    }

    /// Bumped whenever any asset changes state.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

fn kind_mismatch(id: &AssetId, wanted: AssetKind) -> AssetLoadError {
    AssetLoadError::new(id.as_str(), AssetLoadReason::Unsupported, format!("expected a {wanted:?} asset"))
}
