//! Geographic and screen-space value types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum latitude representable in Web Mercator.
pub const MAX_LAT: f64 = 85.051_128_779_806_59;

/// Minimum latitude representable in Web Mercator.
pub const MIN_LAT: f64 = -MAX_LAT;

/// A geographic position in degrees.
///
/// Serialises as a GeoJSON position: `[lng, lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    /// Longitude in degrees (east positive)
    pub lng: f64,
    /// Latitude in degrees (north positive)
    pub lat: f64,
}

impl LngLat {
    /// Create a new position.
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Position as a `[lng, lat]` pair.
    pub fn to_array(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    /// Whether both components are finite and the latitude is projectable.
    pub fn is_valid(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite() && (MIN_LAT..=MAX_LAT).contains(&self.lat)
    }

    /// Component-wise approximate equality.
    pub fn approx_eq(&self, other: &LngLat, epsilon: f64) -> bool {
        (self.lng - other.lng).abs() <= epsilon && (self.lat - other.lat).abs() <= epsilon
    }
}

impl From<[f64; 2]> for LngLat {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(pos: LngLat) -> Self {
        pos.to_array()
    }
}

impl fmt::Display for LngLat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lng, self.lat)
    }
}

/// Axis-aligned geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLatBounds {
    /// Westernmost longitude
    pub west: f64,
    /// Southernmost latitude
    pub south: f64,
    /// Easternmost longitude
    pub east: f64,
    /// Northernmost latitude
    pub north: f64,
}

impl LngLatBounds {
    /// Create a new bounding box.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Create a bounding box from a single point.
    pub fn from_point(pos: LngLat) -> Self {
        Self::new(pos.lng, pos.lat, pos.lng, pos.lat)
    }

    /// Expand this box to include a point.
    pub fn extend(&mut self, pos: LngLat) {
        self.west = self.west.min(pos.lng);
        self.south = self.south.min(pos.lat);
        self.east = self.east.max(pos.lng);
        self.north = self.north.max(pos.lat);
    }

    /// South-west corner.
    pub fn south_west(&self) -> LngLat {
        LngLat::new(self.west, self.south)
    }

    /// North-east corner.
    pub fn north_east(&self) -> LngLat {
        LngLat::new(self.east, self.north)
    }

    /// Center of the box.
    pub fn center(&self) -> LngLat {
        LngLat::new(
            (self.west + self.east) / 2.0,
            (self.south + self.north) / 2.0,
        )
    }

    /// Whether the point lies inside or on the edge of the box.
    pub fn contains(&self, pos: LngLat) -> bool {
        (self.west..=self.east).contains(&pos.lng) && (self.south..=self.north).contains(&pos.lat)
    }

    /// Box as `[west, south, east, north]`, the GeoJSON bbox order.
    pub fn to_bbox(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }
}

/// A screen-space point in logical (CSS) pixels, origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of a rendering surface in physical (backing store) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Logical (CSS) pixel size for the given device pixel ratio.
    ///
    /// A ratio that is not a positive finite number is treated as `1.0`.
    pub fn logical(&self, pixel_ratio: f64) -> (f64, f64) {
        let ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        (self.width as f64 / ratio, self.height as f64 / ratio)
    }
}

impl fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lnglat_serialises_as_position() {
        let pos = LngLat::new(151.0, -33.5);
        let json = serde_json::to_string(&pos).unwrap();
        assert_eq!(json, "[151.0,-33.5]");

        let back: LngLat = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pos);
    }

    #[test]
    fn test_lnglat_validity() {
        assert!(LngLat::new(10.0, 20.0).is_valid());
        assert!(!LngLat::new(10.0, 89.0).is_valid());
        assert!(!LngLat::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_bounds_extend() {
        let mut bounds = LngLatBounds::from_point(LngLat::new(1.0, 5.0));
        bounds.extend(LngLat::new(-3.0, 2.0));
        bounds.extend(LngLat::new(4.0, -1.0));

        assert_eq!(bounds, LngLatBounds::new(-3.0, -1.0, 4.0, 5.0));
        assert!(bounds.contains(LngLat::new(0.0, 0.0)));
        assert!(!bounds.contains(LngLat::new(5.0, 0.0)));
    }

    #[test]
    fn test_bounds_center_and_bbox() {
        let bounds = LngLatBounds::new(-10.0, -5.0, 10.0, 5.0);
        assert_eq!(bounds.center(), LngLat::new(0.0, 0.0));
        assert_eq!(bounds.to_bbox(), [-10.0, -5.0, 10.0, 5.0]);
    }

    #[test]
    fn test_canvas_logical_size() {
        let canvas = CanvasSize::new(800, 600);
        assert_eq!(canvas.logical(2.0), (400.0, 300.0));
        assert_eq!(canvas.logical(1.0), (800.0, 600.0));
        assert_eq!(canvas.logical(0.0), (800.0, 600.0));
    }
}
