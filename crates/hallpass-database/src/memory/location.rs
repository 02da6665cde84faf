//! In-memory location directory.

use async_trait::async_trait;
use dashmap::DashMap;

use hallpass_core::result::AppResult;
use hallpass_core::types::LocationId;
use hallpass_entity::location::LocationInfo;

use crate::repositories::LocationRepository;

/// Location directory held in process memory.
#[derive(Debug, Default)]
pub struct MemoryLocationRepository {
    locations: DashMap<LocationId, LocationInfo>,
}

impl MemoryLocationRepository {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a location.
    pub fn insert(&self, location: LocationInfo) {
        self.locations.insert(location.id, location);
    }
}

#[async_trait]
impl LocationRepository for MemoryLocationRepository {
    async fn find_by_id(&self, id: LocationId) -> AppResult<Option<LocationInfo>> {
        Ok(self.locations.get(&id).map(|entry| entry.value().clone()))
    }
}
