use crate::prelude::{Arc, HashMap};
use crate::rendering::raster::Raster;

/// Identifies a cached raster: the source it was loaded from plus the styled
/// size it is used at. `None` dimensions stand for the natural size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub source: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ResourceKey {
    pub fn new(source: String, width: Option<u32>, height: Option<u32>) -> Self {
        Self {
            source,
            width,
            height,
        }
    }
}

/// Cache of decoded marker rasters keyed by source and styled size.
///
/// Lookup only: loading, decoding and eviction are the owning host's job.
/// The host also serializes access when it shares the cache across threads;
/// within the render loop everything is single-threaded by contract.
#[derive(Debug, Clone, Default)]
pub struct ResourceCache {
    images: HashMap<ResourceKey, Arc<Raster>>,
}

impl ResourceCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            images: HashMap::default(),
        }
    }

    /// Checks whether a raster is cached under this key
    pub fn is_resource_loaded(&self, key: &ResourceKey) -> bool {
        self.images.contains_key(key)
    }

    /// Registers a raster under a key, replacing any previous binding
    pub fn add_resource(&mut self, key: ResourceKey, image: Arc<Raster>) {
        self.images.insert(key, image);
    }

    /// Convenience for registering an owned raster
    pub fn insert(&mut self, key: ResourceKey, image: Raster) {
        self.add_resource(key, Arc::new(image));
    }

    /// Looks up the raster cached under this key; never loads
    pub fn get_image(&self, key: &ResourceKey) -> Option<Arc<Raster>> {
        self.images.get(key).cloned()
    }

    /// Number of cached rasters
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Drops every cached raster
    pub fn clear(&mut self) {
        self.images.clear();
    }
}
