//! Fixed service bounding box.

use geo::Intersects;
use geo_types::{coord, Rect};
use serde::{Deserialize, Serialize};

use crate::models::GeoPoint;

/// Inclusive lat/lon box we deliver inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl ServiceBounds {
    /// Mexico City metropolitan area.
    pub const METRO_CDMX: ServiceBounds = ServiceBounds {
        min_lat: 19.048,
        max_lat: 19.761,
        min_lon: -99.365,
        max_lon: -98.877,
    };

    pub fn rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.min_lon, y: self.min_lat },
            coord! { x: self.max_lon, y: self.max_lat },
        )
    }

    /// Boundary points count as inside.
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.is_valid() && self.rect().intersects(&coord! { x: point.lon, y: point.lat })
    }

    pub fn center(&self) -> GeoPoint {
        let center = self.rect().center();
        GeoPoint::new(center.y, center.x)
    }
}

impl Default for ServiceBounds {
    fn default() -> Self {
        Self::METRO_CDMX
    }
}
