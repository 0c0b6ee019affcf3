//! MapSync - feedback-free camera synchronization for map viewports
//!
//! This library keeps a primary map viewport and a zoomed-out overview
//! viewport in lock-step, and draws the primary's visible area on the
//! overview as two outline polygons.
//!
//! # Architecture
//!
//! ```text
//!        ┌──────────────┐   Move    ┌────────────────┐  jump_to  ┌──────────────┐
//!        │  primary (A) │ ────────► │ sync::SyncGroup│ ────────► │ overview (B) │
//!        └──────────────┘           └────────────────┘           └──────────────┘
//!               │ MoveEnd                                                ▲
//!               ▼                                                        │ set_data
//!        ┌──────────────┐  geometry::compute_*  ┌─────────────────┐      │
//!        │ OverlayLink  │ ────────────────────► │ GeoJSON sources │ ─────┘
//!        └──────────────┘                       └─────────────────┘
//! ```
//!
//! - [`viewport`]: the contract a map engine implements, plus an in-memory
//!   [`SimulatedViewport`](viewport::SimulatedViewport)
//! - [`sync`]: the view synchronizer and its offset policies
//! - [`geometry`]: view rectangle and bounding-box polygons
//! - [`overlay`]: keeps the overview's outlines current
//! - [`session`]: wires all of the above for an A/B pair
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mapsync::{CameraOptions, MapViewport, OverviewSession, SimulatedViewport, SyncConfig};
//! use mapsync::geo::{CanvasSize, LngLat};
//!
//! let primary = Arc::new(
//!     SimulatedViewport::new(LngLat::new(151.0, -33.5), 9.0)
//!         .with_canvas(CanvasSize::new(1024, 768), 2.0),
//! );
//! let overview = Arc::new(
//!     SimulatedViewport::new(LngLat::new(151.0, -33.5), 7.0)
//!         .with_canvas(CanvasSize::new(300, 300), 1.0),
//! );
//!
//! let session =
//!     OverviewSession::start(primary.clone(), overview.clone(), &SyncConfig::default())?;
//!
//! primary.jump_to(&CameraOptions::new().with_center(LngLat::new(150.0, -34.0)))?;
//! assert_eq!(overview.center(), LngLat::new(150.0, -34.0));
//!
//! session.stop();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod geo;
pub mod geometry;
pub mod logging;
pub mod overlay;
pub mod session;
pub mod sync;
pub mod viewport;

pub use config::{ConfigError, SyncConfig};
pub use geometry::{compute_bounds_polygon, compute_view_rectangle, OverlayPolygon};
pub use session::{OverviewSession, SessionError};
pub use sync::{engage, MirrorPolicy, OffsetPolicy, OverviewPolicy, SyncError, SyncHandle};
pub use viewport::{
    CameraOptions, CameraSnapshot, EventKind, MapViewport, SimulatedViewport, ViewportError,
    ViewportId,
};
