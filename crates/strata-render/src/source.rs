//! Asset byte sources.
//!
//! The pipeline only ever sees `fetch(ref) -> bytes`; where the bytes
//! live (a local uploads directory, a test fixture map) is this
//! module's concern. Retry policy for transient backends also belongs
//! to the source, never to the pipeline.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use strata_core::{StrataError, StrataResult};
use strata_model::AssetRef;

/// Resolves an asset reference to raw image bytes.
pub trait AssetSource: Send + Sync {
    fn fetch(&self, asset: &AssetRef) -> StrataResult<Vec<u8>>;
}

/// Serves assets from a root directory, the way the upload store lays
/// them out: locators are paths relative to the root (a leading `/` is
/// tolerated), absolute paths are used as-is.
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = Path::new(url);
        if path.is_absolute() {
            // Re-anchor absolute locators under the root so a record
            // can never escape the asset directory.
            self.root.join(url.trim_start_matches('/'))
        } else {
            self.root.join(path)
        }
    }
}

impl AssetSource for FsAssetSource {
    fn fetch(&self, asset: &AssetRef) -> StrataResult<Vec<u8>> {
        let path = self.resolve(&asset.url);
        std::fs::read(&path).map_err(|e| {
            StrataError::asset(
                format!("failed to read '{}': {}", path.display(), e),
                asset.url.clone(),
            )
        })
    }
}

/// In-memory asset source keyed by asset id. Used by tests and by
/// callers that already hold the bytes.
#[derive(Default)]
pub struct MemoryAssetSource {
    assets: HashMap<String, Vec<u8>>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, bytes: Vec<u8>) {
        self.assets.insert(id.into(), bytes);
    }
}

impl AssetSource for MemoryAssetSource {
    fn fetch(&self, asset: &AssetRef) -> StrataResult<Vec<u8>> {
        self.assets
            .get(&asset.id)
            .cloned()
            .ok_or_else(|| StrataError::asset("asset not registered", asset.url.clone()))
    }
}
