//! Location lookup trait.

use async_trait::async_trait;

use hallpass_core::result::AppResult;
use hallpass_core::types::LocationId;
use hallpass_entity::location::LocationInfo;

/// Read access to supervised locations.
#[async_trait]
pub trait LocationRepository: Send + Sync + std::fmt::Debug {
    /// Find a location by ID.
    async fn find_by_id(&self, id: LocationId) -> AppResult<Option<LocationInfo>>;
}
