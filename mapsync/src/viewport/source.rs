//! Overlay sources attached to a viewport.
//!
//! A map engine hosts several kinds of data sources. Only GeoJSON-backed
//! sources accept a replacement geometry payload, so [`OverlaySource`] is a
//! tagged variant and callers narrow it before calling `set_data`.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use super::ViewportError;
use crate::geometry::OverlayPolygon;

/// Kind of an overlay source, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    GeoJson,
    Raster,
    Vector,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::GeoJson => "geojson",
            SourceKind::Raster => "raster",
            SourceKind::Vector => "vector",
        };
        f.write_str(name)
    }
}

/// A source whose geometry payload can be replaced.
pub trait GeoJsonSource: Send + Sync {
    /// Replace the source's data.
    fn set_data(&self, data: &OverlayPolygon) -> Result<(), ViewportError>;

    /// Current data, if any was set.
    fn data(&self) -> Option<OverlayPolygon>;

    /// Current data as the GeoJSON `Feature` a renderer consumes.
    fn payload(&self) -> Option<Value> {
        self.data().map(|data| data.to_geojson())
    }
}

/// A named source on a viewport.
#[derive(Clone)]
pub enum OverlaySource {
    /// Geometry-backed source; supports data replacement.
    GeoJson(Arc<dyn GeoJsonSource>),
    /// Raster tile source.
    Raster,
    /// Vector tile source.
    Vector,
}

impl OverlaySource {
    /// Wrap a GeoJSON source implementation.
    pub fn geojson(source: Arc<dyn GeoJsonSource>) -> Self {
        OverlaySource::GeoJson(source)
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            OverlaySource::GeoJson(_) => SourceKind::GeoJson,
            OverlaySource::Raster => SourceKind::Raster,
            OverlaySource::Vector => SourceKind::Vector,
        }
    }

    /// The GeoJSON capability, when this source has it.
    pub fn as_geojson(&self) -> Option<&Arc<dyn GeoJsonSource>> {
        match self {
            OverlaySource::GeoJson(source) => Some(source),
            _ => None,
        }
    }
}

impl fmt::Debug for OverlaySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OverlaySource").field(&self.kind()).finish()
    }
}

/// GeoJSON source that keeps its payload in memory.
///
/// Holds the polygon alongside the GeoJSON `Feature` a rendering engine
/// would receive for it, and counts updates so callers can tell how often
/// the overlay was refreshed.
#[derive(Debug, Default)]
pub struct InMemoryGeoJsonSource {
    inner: Mutex<InMemoryState>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    data: Option<OverlayPolygon>,
    payload: Option<Value>,
    updates: u64,
}

impl InMemoryGeoJsonSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source holding initial data. The initial data is not counted
    /// as an update.
    pub fn with_data(data: OverlayPolygon) -> Self {
        Self {
            inner: Mutex::new(InMemoryState {
                payload: Some(data.to_geojson()),
                data: Some(data),
                updates: 0,
            }),
        }
    }

    /// Number of `set_data` calls so far.
    pub fn updates(&self) -> u64 {
        self.inner.lock().updates
    }
}

impl GeoJsonSource for InMemoryGeoJsonSource {
    fn set_data(&self, data: &OverlayPolygon) -> Result<(), ViewportError> {
        let mut inner = self.inner.lock();
        inner.data = Some(data.clone());
        inner.payload = Some(data.to_geojson());
        inner.updates += 1;
        Ok(())
    }

    fn data(&self) -> Option<OverlayPolygon> {
        self.inner.lock().data.clone()
    }

    fn payload(&self) -> Option<Value> {
        self.inner.lock().payload.clone()
    }
}
