//! Map viewport collaborator contract.
//!
//! The synchronization core never renders anything itself. It drives map
//! viewports through the [`MapViewport`] trait, which mirrors the small
//! surface a real map engine exposes:
//!
//! - synchronous camera getters and a non-animated `jump_to`
//! - an animated `fly_to` for user-facing transitions
//! - movement notifications registered by listener identity (`on`/`off`)
//! - bounds, canvas size, pixel ratio and `unproject` for overlay geometry
//! - named overlay sources on the overview map
//!
//! # Listener identity
//!
//! Listeners are `Arc` closures. `off` removes a listener by pointer identity,
//! so a caller that wants to unregister later must keep the exact `Arc` it
//! registered. Creating a fresh closure per event would make removal
//! impossible.
//!
//! # Interior mutability
//!
//! All methods take `&self`. A listener runs while the emitting viewport is
//! in the middle of a camera change and must still be able to read that
//! viewport (and toggle its listeners), so implementations keep their state
//! behind locks that are never held across listener calls.

mod error;
mod listeners;
mod simulated;
mod source;

pub use error::ViewportError;
pub use listeners::ListenerRegistry;
pub use simulated::SimulatedViewport;
pub use source::{GeoJsonSource, InMemoryGeoJsonSource, OverlaySource, SourceKind};

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::geo::{CanvasSize, LngLat, LngLatBounds, ScreenPoint};
use crate::geometry::OverlayPolygon;

static NEXT_VIEWPORT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewportId(u64);

impl ViewportId {
    /// Allocate a process-unique id.
    pub fn next() -> Self {
        Self(NEXT_VIEWPORT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ViewportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "viewport#{}", self.0)
    }
}

/// Notifications a viewport emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The viewport finished loading and has a rendering surface.
    Load,
    /// The camera changed. Fired for every frame of an animation.
    Move,
    /// A camera change (jump or animation) completed.
    MoveEnd,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Load => "load",
            EventKind::Move => "move",
            EventKind::MoveEnd => "moveend",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification delivered to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapEvent {
    pub kind: EventKind,
    /// Viewport that emitted the event.
    pub target: ViewportId,
}

impl MapEvent {
    pub fn new(kind: EventKind, target: ViewportId) -> Self {
        Self { kind, target }
    }
}

/// A registered event handler.
///
/// Errors returned by a handler propagate back to whoever caused the
/// emission (for example the caller of `jump_to`).
pub type Listener = Arc<dyn Fn(&MapEvent) -> Result<(), ViewportError> + Send + Sync>;

/// Wrap a closure as a [`Listener`].
pub fn listener<F>(f: F) -> Listener
where
    F: Fn(&MapEvent) -> Result<(), ViewportError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Immutable camera state captured from a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSnapshot {
    pub center: LngLat,
    /// Zoom level, `>= 0`
    pub zoom: f64,
    /// Bearing in degrees
    pub bearing: f64,
    /// Pitch in degrees
    pub pitch: f64,
}

impl CameraSnapshot {
    pub fn new(center: LngLat, zoom: f64, bearing: f64, pitch: f64) -> Self {
        Self {
            center,
            zoom,
            bearing,
            pitch,
        }
    }
}

impl fmt::Display for CameraSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "center={} zoom={:.2} bearing={:.1} pitch={:.1}",
            self.center, self.zoom, self.bearing, self.pitch
        )
    }
}

/// Target camera for `jump_to`/`fly_to`. Unset fields keep their value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraOptions {
    pub center: Option<LngLat>,
    pub zoom: Option<f64>,
    pub bearing: Option<f64>,
    pub pitch: Option<f64>,
}

impl CameraOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_center(mut self, center: LngLat) -> Self {
        self.center = Some(center);
        self
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = Some(zoom);
        self
    }

    pub fn with_bearing(mut self, bearing: f64) -> Self {
        self.bearing = Some(bearing);
        self
    }

    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = Some(pitch);
        self
    }

    /// Resolve against a current camera, filling unset fields from it.
    pub fn resolve(&self, current: &CameraSnapshot) -> CameraSnapshot {
        CameraSnapshot {
            center: self.center.unwrap_or(current.center),
            zoom: self.zoom.unwrap_or(current.zoom),
            bearing: self.bearing.unwrap_or(current.bearing),
            pitch: self.pitch.unwrap_or(current.pitch),
        }
    }
}

impl From<CameraSnapshot> for CameraOptions {
    fn from(camera: CameraSnapshot) -> Self {
        Self {
            center: Some(camera.center),
            zoom: Some(camera.zoom),
            bearing: Some(camera.bearing),
            pitch: Some(camera.pitch),
        }
    }
}

/// A map viewport as seen by the synchronization core.
///
/// Implementations must be usable re-entrantly: listeners invoked during
/// `jump_to` may call any method on the same viewport.
pub trait MapViewport: Send + Sync {
    /// Identity of this viewport.
    fn id(&self) -> ViewportId;

    /// Whether the viewport has loaded and has a rendering surface.
    fn loaded(&self) -> bool;

    fn center(&self) -> LngLat;
    fn zoom(&self) -> f64;
    fn bearing(&self) -> f64;
    fn pitch(&self) -> f64;

    /// Read the four camera fields once each.
    fn camera(&self) -> CameraSnapshot {
        CameraSnapshot {
            center: self.center(),
            zoom: self.zoom(),
            bearing: self.bearing(),
            pitch: self.pitch(),
        }
    }

    /// Apply a camera change immediately, without animation.
    ///
    /// Fires `Move` and `MoveEnd` to the listeners registered at the time.
    fn jump_to(&self, options: &CameraOptions) -> Result<(), ViewportError>;

    /// Start an animated camera change. `duration` is advisory.
    fn fly_to(&self, options: &CameraOptions, duration: Duration) -> Result<(), ViewportError>;

    /// Register a listener for an event kind.
    fn on(&self, kind: EventKind, listener: &Listener);

    /// Remove a previously registered listener (by identity).
    fn off(&self, kind: EventKind, listener: &Listener);

    /// Geographic bounding box of the current view.
    fn bounds(&self) -> LngLatBounds;

    /// Rendering surface size in physical pixels, `None` before load.
    fn canvas_size(&self) -> Option<CanvasSize>;

    /// Ratio of physical to logical pixels of the host display.
    fn device_pixel_ratio(&self) -> f64;

    /// Geographic position under a logical-pixel screen point.
    fn unproject(&self, point: ScreenPoint) -> LngLat;

    /// Add a GeoJSON overlay source with initial data.
    fn add_geojson_source(&self, name: &str, data: OverlayPolygon) -> Result<(), ViewportError>;

    /// Look up an overlay source by name.
    fn source(&self, name: &str) -> Option<OverlaySource>;
}
