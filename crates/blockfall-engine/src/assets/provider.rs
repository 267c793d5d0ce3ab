use crate::error::AssetLoadError;

use super::{AssetHandle, AssetId, AssetKind};

/// Correlates a request with its completion.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct LoadTicket(pub(crate) u64);

impl LoadTicket {
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// What to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub id: AssetId,
    pub kind: AssetKind,
}

/// Outcome of one request, delivered by [`AssetProvider::poll`].
#[derive(Debug, Clone)]
pub struct AssetCompletion {
    pub ticket: LoadTicket,
    pub result: Result<AssetHandle, AssetLoadError>,
}

/// Loads textures and fonts by identifier.
///
/// Implementations may complete requests at any later point, but never from
/// inside [`request`](Self::request); completions are handed back through
/// [`poll`](Self::poll), called once per frame.
pub trait AssetProvider {
    /// Starts loading. Must not block on I/O that the frame loop would notice.
    fn request(&mut self, ticket: LoadTicket, request: &AssetRequest);

    /// Returns every completion that arrived since the previous call.
    fn poll(&mut self) -> Vec<AssetCompletion>;
}
