use async_trait::async_trait;
use geoshare_core::Point;

/// Source of the device location for actions that route from it.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// The current location, or `None` when it can't be determined.
    async fn current_location(&self) -> Option<Point>;
}

/// A location fixed at construction, e.g. from configuration.
#[derive(Debug, Clone, Default)]
pub struct FixedLocation(pub Option<Point>);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_location(&self) -> Option<Point> {
        self.0.clone()
    }
}
