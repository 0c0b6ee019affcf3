//! Geographic primitives and Web Mercator math.
//!
//! Provides the value types shared by every other module (positions, bounds,
//! screen points, canvas sizes) together with the conversions between
//! geographic coordinates and Web Mercator "world pixels" used by the
//! simulated viewport.
//!
//! World pixels follow the vector-tile convention: at zoom `z` the whole world
//! is a square of `TILE_SIZE * 2^z` pixels, origin at the north-west corner.

mod types;

pub use types::{CanvasSize, LngLat, LngLatBounds, ScreenPoint, MAX_LAT, MIN_LAT};

use std::f64::consts::PI;

/// Edge length of one zoom-0 world tile, in logical pixels.
pub const TILE_SIZE: f64 = 512.0;

/// Size of the world square at the given zoom level, in pixels.
#[inline]
pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2.0_f64.powf(zoom)
}

/// Projects a geographic position to world pixel coordinates.
///
/// Latitude is clamped to the Web Mercator range first.
#[inline]
pub fn project(pos: LngLat, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = pos.lat.clamp(MIN_LAT, MAX_LAT);

    let x = (pos.lng + 180.0) / 360.0 * size;
    let lat_rad = lat * PI / 180.0;
    let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * size;

    (x, y)
}

/// Converts world pixel coordinates back to a geographic position.
///
/// Longitude is not wrapped, so points left or right of the world square
/// yield longitudes beyond ±180°.
#[inline]
pub fn unproject(x: f64, y: f64, zoom: f64) -> LngLat {
    let size = world_size(zoom);

    let lng = x / size * 360.0 - 180.0;
    let lat_rad = (PI * (1.0 - 2.0 * y / size)).sinh().atan();
    let lat = lat_rad * 180.0 / PI;

    LngLat::new(lng, lat)
}

/// Wraps a longitude into [-180°, 180°].
///
/// Values already in range are returned untouched; -180° wraps to 180°.
#[inline]
pub fn wrap_longitude(lng: f64) -> f64 {
    if (-180.0..=180.0).contains(&lng) {
        return lng;
    }
    let wrapped = (lng + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

/// Normalises a bearing to the half-open range (-180°, 180°].
#[inline]
pub fn normalize_bearing(bearing: f64) -> f64 {
    let wrapped = bearing.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Interpolates between two bearings along the shorter arc.
#[inline]
pub fn lerp_bearing(from: f64, to: f64, t: f64) -> f64 {
    let delta = normalize_bearing(to - from);
    normalize_bearing(from + delta * t)
}
