//! Overlay geometry derived from a viewport.
//!
//! Two rectangles describe what the primary map shows:
//!
//! - the **view rectangle**: the four screen corners unprojected to the
//!   ground. With bearing applied this is a rotated quadrilateral.
//! - the **bounding box**: the axis-aligned geographic box around the view.
//!
//! Both are pure functions of viewport state and produce an
//! [`OverlayPolygon`], a closed five-position ring ready to be used as the
//! payload of a GeoJSON overlay source.
//!
//! # Logical pixels
//!
//! `unproject` works in logical (CSS) pixels, but the canvas reports its
//! backing-store size. On a display with a device pixel ratio of 2 an
//! 800×600 canvas covers 400×300 logical pixels; unprojecting the physical
//! size would produce a rectangle twice as large as the visible area.

use serde_json::{json, Value};

use crate::geo::{LngLat, LngLatBounds, ScreenPoint};
use crate::viewport::{MapViewport, ViewportError};

/// Number of positions in an overlay ring (four corners plus closure).
pub const RING_LEN: usize = 5;

/// A closed rectangular ring: four corners followed by the first corner.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPolygon {
    ring: [LngLat; RING_LEN],
}

impl OverlayPolygon {
    /// Build a closed ring from four corners in drawing order.
    pub fn from_corners(corners: [LngLat; 4]) -> Self {
        Self {
            ring: [corners[0], corners[1], corners[2], corners[3], corners[0]],
        }
    }

    /// All five positions, first == last.
    pub fn ring(&self) -> &[LngLat; RING_LEN] {
        &self.ring
    }

    /// The four distinct corners.
    pub fn corners(&self) -> [LngLat; 4] {
        [self.ring[0], self.ring[1], self.ring[2], self.ring[3]]
    }

    /// Whether the first and last positions coincide.
    pub fn is_closed(&self) -> bool {
        self.ring[0] == self.ring[RING_LEN - 1]
    }

    /// Axis-aligned bounds around the ring.
    pub fn bounds(&self) -> LngLatBounds {
        let c = self.corners();
        let mut bounds = LngLatBounds::from_point(c[0]);
        for pos in &c[1..] {
            bounds.extend(*pos);
        }
        bounds
    }

    /// Signed ring area in square degrees (shoelace formula).
    ///
    /// Positive for counter-clockwise rings.
    pub fn signed_area(&self) -> f64 {
        self.ring
            .windows(2)
            .map(|w| w[0].lng * w[1].lat - w[1].lng * w[0].lat)
            .sum::<f64>()
            / 2.0
    }

    /// GeoJSON `Feature` with this ring as its `Polygon` geometry.
    pub fn to_geojson(&self) -> Value {
        json!({
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [self.ring],
            },
        })
    }
}

/// Polygon covering the visible screen area of a viewport.
///
/// Corners are unprojected in the order top-left, top-right, bottom-right,
/// bottom-left using logical pixel dimensions.
///
/// # Errors
///
/// [`ViewportError::NotReady`] when the viewport has no rendering surface.
pub fn compute_view_rectangle<V>(viewport: &V) -> Result<OverlayPolygon, ViewportError>
where
    V: MapViewport + ?Sized,
{
    let canvas = viewport
        .canvas_size()
        .ok_or_else(|| ViewportError::NotReady(viewport.id()))?;
    let (width, height) = canvas.logical(viewport.device_pixel_ratio());

    let top_left = viewport.unproject(ScreenPoint::new(0.0, 0.0));
    let top_right = viewport.unproject(ScreenPoint::new(width, 0.0));
    let bottom_right = viewport.unproject(ScreenPoint::new(width, height));
    let bottom_left = viewport.unproject(ScreenPoint::new(0.0, height));

    Ok(OverlayPolygon::from_corners([
        top_left,
        top_right,
        bottom_right,
        bottom_left,
    ]))
}

/// Polygon for a bounding box: SW, SE, NE, NW, SW (counter-clockwise).
pub fn compute_bounds_polygon(bounds: &LngLatBounds) -> OverlayPolygon {
    OverlayPolygon::from_corners([
        LngLat::new(bounds.west, bounds.south),
        LngLat::new(bounds.east, bounds.south),
        LngLat::new(bounds.east, bounds.north),
        LngLat::new(bounds.west, bounds.north),
    ])
}
