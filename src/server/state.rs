use crate::geo::{Geocoder, PolygonStore, SphericalDistance};
use std::sync::Arc;

/// Shared, read-only service state. Each request builds its own selection
/// cache, so nothing here needs a lock.
pub struct AppState {
    pub store: PolygonStore,
    pub geocoder: Arc<dyn Geocoder + Send + Sync>,
    pub distance: SphericalDistance,
}
