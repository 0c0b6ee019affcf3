//! Overlay layers on the overview map.
//!
//! The overview shows two outlines of the primary map:
//!
//! - `bbox`: the axis-aligned bounding box of the primary view
//! - `viewBounds`: the actual visible rectangle (rotated with bearing)
//!
//! Each outline lives in a named GeoJSON source on the overview. The outlines
//! are recomputed whenever the primary map finishes a move (`MoveEnd`),
//! rather than on every frame.
//!
//! Sources are narrowed by kind before their data is replaced. A name that
//! resolves to a raster or vector source, or to nothing at all, is skipped
//! without error.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use tracing::{debug, trace};

use crate::geometry::{compute_bounds_polygon, compute_view_rectangle, OverlayPolygon};
use crate::viewport::{
    listener, EventKind, GeoJsonSource, Listener, MapViewport, OverlaySource, ViewportError,
};

/// Default name of the view-rectangle source.
pub const DEFAULT_VIEW_BOUNDS_SOURCE: &str = "viewBounds";

/// Default name of the bounding-box source.
pub const DEFAULT_BBOX_SOURCE: &str = "bbox";

/// Names of the two overlay sources on the overview map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlaySourceNames {
    pub view_bounds: String,
    pub bbox: String,
}

impl Default for OverlaySourceNames {
    fn default() -> Self {
        Self {
            view_bounds: DEFAULT_VIEW_BOUNDS_SOURCE.to_string(),
            bbox: DEFAULT_BBOX_SOURCE.to_string(),
        }
    }
}

impl OverlaySourceNames {
    pub fn new(view_bounds: impl Into<String>, bbox: impl Into<String>) -> Self {
        Self {
            view_bounds: view_bounds.into(),
            bbox: bbox.into(),
        }
    }
}

/// Which sources a refresh actually updated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayRefresh {
    pub view_bounds: bool,
    pub bbox: bool,
}

impl OverlayRefresh {
    /// Number of sources updated.
    pub fn updated(&self) -> usize {
        usize::from(self.view_bounds) + usize::from(self.bbox)
    }
}

/// Add both overlay sources to the overview, seeded from the master's view.
///
/// A source that already exists under one of the names and accepts GeoJSON
/// is reused and its data replaced, so installing twice on the same overview
/// succeeds. Both names are checked before anything is added: if either is
/// taken by a source of another kind, nothing changes.
///
/// # Errors
///
/// - `NotReady` if the master has no canvas yet
/// - `SourceRejected` if a name is held by a non-GeoJSON source
/// - any error the overview reports while adding or updating a source
pub fn install_sources(
    master: &dyn MapViewport,
    overview: &dyn MapViewport,
    names: &OverlaySourceNames,
) -> Result<(), ViewportError> {
    let view_rect = compute_view_rectangle(master)?;
    let bbox = compute_bounds_polygon(&master.bounds());

    let bbox_slot = existing_geojson(overview, &names.bbox)?;
    let view_slot = existing_geojson(overview, &names.view_bounds)?;

    install_one(overview, &names.bbox, bbox_slot, bbox)?;
    install_one(overview, &names.view_bounds, view_slot, view_rect)?;
    debug!(
        master = %master.id(),
        overview = %overview.id(),
        bbox = %names.bbox,
        view_bounds = %names.view_bounds,
        "Overlay sources installed"
    );
    Ok(())
}

/// The GeoJSON source already registered under `name`, if any.
fn existing_geojson(
    overview: &dyn MapViewport,
    name: &str,
) -> Result<Option<Arc<dyn GeoJsonSource>>, ViewportError> {
    match overview.source(name) {
        None => Ok(None),
        Some(OverlaySource::GeoJson(source)) => Ok(Some(source)),
        Some(other) => Err(ViewportError::SourceRejected {
            name: name.to_string(),
            reason: format!("name is taken by a {} source", other.kind()),
        }),
    }
}

fn install_one(
    overview: &dyn MapViewport,
    name: &str,
    existing: Option<Arc<dyn GeoJsonSource>>,
    data: OverlayPolygon,
) -> Result<(), ViewportError> {
    match existing {
        Some(source) => {
            trace!(source = name, "Reusing existing GeoJSON source");
            source.set_data(&data)
        }
        None => overview.add_geojson_source(name, data),
    }
}

/// Recompute both outlines from the master and push them to the overview.
pub fn refresh_overlays(
    master: &dyn MapViewport,
    overview: &dyn MapViewport,
    names: &OverlaySourceNames,
) -> Result<OverlayRefresh, ViewportError> {
    let bbox = compute_bounds_polygon(&master.bounds());
    let bbox_updated = replace_data(overview, &names.bbox, &bbox)?;

    let view_rect = compute_view_rectangle(master)?;
    let view_updated = replace_data(overview, &names.view_bounds, &view_rect)?;

    Ok(OverlayRefresh {
        view_bounds: view_updated,
        bbox: bbox_updated,
    })
}

fn replace_data(
    overview: &dyn MapViewport,
    name: &str,
    data: &OverlayPolygon,
) -> Result<bool, ViewportError> {
    match overview.source(name) {
        Some(OverlaySource::GeoJson(source)) => {
            source.set_data(data)?;
            Ok(true)
        }
        Some(other) => {
            trace!(source = name, kind = %other.kind(), "Source is not GeoJSON, skipped");
            Ok(false)
        }
        None => {
            trace!(source = name, "Source missing, skipped");
            Ok(false)
        }
    }
}

/// Keeps the overview's outlines in step with the master.
///
/// Registers a `MoveEnd` listener on the master. The listener holds the
/// master weakly; dropping the link (or calling [`detach`](Self::detach))
/// unregisters it.
pub struct OverlayLink {
    master: Weak<dyn MapViewport>,
    listener: Option<Listener>,
    refreshes: Arc<AtomicU64>,
}

impl OverlayLink {
    /// Start refreshing the overview's outlines after each master move.
    pub fn attach(
        master: Arc<dyn MapViewport>,
        overview: Arc<dyn MapViewport>,
        names: OverlaySourceNames,
    ) -> Self {
        let weak_master = Arc::downgrade(&master);
        let refreshes = Arc::new(AtomicU64::new(0));

        let counter = Arc::clone(&refreshes);
        let move_end = listener(move |_event| {
            let Some(master) = weak_master.upgrade() else {
                return Ok(());
            };
            refresh_overlays(&*master, &*overview, &names)?;
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(())
        });
        master.on(EventKind::MoveEnd, &move_end);

        Self {
            master: Arc::downgrade(&master),
            listener: Some(move_end),
            refreshes,
        }
    }

    /// Completed refreshes so far.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }

    /// Stop refreshing.
    pub fn detach(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let Some(listener) = self.listener.take() else {
            return;
        };
        if let Some(master) = self.master.upgrade() {
            master.off(EventKind::MoveEnd, &listener);
        }
    }
}

impl Drop for OverlayLink {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for OverlayLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayLink")
            .field("attached", &self.listener.is_some())
            .field("refreshes", &self.refresh_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{CanvasSize, LngLat};
    use crate::viewport::{CameraOptions, SimulatedViewport};

    fn primary() -> Arc<SimulatedViewport> {
        Arc::new(
            SimulatedViewport::new(LngLat::new(151.0, -33.5), 9.0)
                .with_canvas(CanvasSize::new(800, 600), 2.0),
        )
    }

    fn overview() -> Arc<SimulatedViewport> {
        Arc::new(
            SimulatedViewport::new(LngLat::new(151.0, -33.5), 7.0)
                .with_canvas(CanvasSize::new(400, 300), 1.0),
        )
    }

    fn source_data(map: &SimulatedViewport, name: &str) -> OverlayPolygon {
        map.source(name)
            .and_then(|s| s.as_geojson().and_then(|g| g.data()))
            .unwrap()
    }

    #[test]
    fn test_install_sources_seeds_both_outlines() {
        let a = primary();
        let b = overview();
        let names = OverlaySourceNames::default();

        install_sources(&*a, &*b, &names).unwrap();

        assert_eq!(
            source_data(&b, "bbox"),
            compute_bounds_polygon(&a.bounds())
        );
        assert_eq!(
            source_data(&b, "viewBounds"),
            compute_view_rectangle(&*a).unwrap()
        );
    }

    #[test]
    fn test_install_requires_ready_master() {
        let a = SimulatedViewport::new(LngLat::new(0.0, 0.0), 3.0);
        let b = overview();

        let err = install_sources(&a, &*b, &OverlaySourceNames::default()).unwrap_err();
        assert_eq!(err, ViewportError::NotReady(a.id()));
        assert!(b.source("bbox").is_none());
    }

    #[test]
    fn test_install_twice_reuses_sources() {
        let a = primary();
        let b = overview();
        let names = OverlaySourceNames::default();
        install_sources(&*a, &*b, &names).unwrap();

        a.jump_to(&CameraOptions::new().with_center(LngLat::new(150.0, -34.0)))
            .unwrap();
        install_sources(&*a, &*b, &names).unwrap();

        assert_eq!(
            source_data(&b, "viewBounds"),
            compute_view_rectangle(&*a).unwrap()
        );
        assert_eq!(
            source_data(&b, "bbox"),
            compute_bounds_polygon(&a.bounds())
        );
    }

    #[test]
    fn test_install_conflict_adds_nothing() {
        let a = primary();
        let b = overview();
        b.insert_source("viewBounds", OverlaySource::Raster);

        let err = install_sources(&*a, &*b, &OverlaySourceNames::default()).unwrap_err();

        assert!(matches!(
            err,
            ViewportError::SourceRejected { ref name, .. } if name == "viewBounds"
        ));
        assert!(b.source("bbox").is_none());
        assert!(matches!(b.source("viewBounds"), Some(OverlaySource::Raster)));
    }

    #[test]
    fn test_refresh_updates_geojson_sources() {
        let a = primary();
        let b = overview();
        let names = OverlaySourceNames::default();
        install_sources(&*a, &*b, &names).unwrap();

        a.jump_to(&CameraOptions::new().with_center(LngLat::new(150.0, -34.0)))
            .unwrap();
        let refresh = refresh_overlays(&*a, &*b, &names).unwrap();

        assert_eq!(refresh, OverlayRefresh { view_bounds: true, bbox: true });
        assert_eq!(refresh.updated(), 2);
        assert!(source_data(&b, "bbox").bounds().contains(LngLat::new(150.0, -34.0)));
    }

    #[test]
    fn test_refresh_skips_non_geojson_and_missing_sources() {
        let a = primary();
        let b = overview();
        b.insert_source("bbox", OverlaySource::Raster);

        let refresh =
            refresh_overlays(&*a, &*b, &OverlaySourceNames::default()).unwrap();
        assert_eq!(refresh, OverlayRefresh::default());
        assert_eq!(refresh.updated(), 0);
    }

    #[test]
    fn test_custom_source_names() {
        let a = primary();
        let b = overview();
        let names = OverlaySourceNames::new("view", "box");
        install_sources(&*a, &*b, &names).unwrap();

        assert!(b.source("view").is_some());
        assert!(b.source("box").is_some());
        assert!(b.source("bbox").is_none());
    }

    #[test]
    fn test_link_refreshes_on_move_end() {
        let a = primary();
        let b = overview();
        let names = OverlaySourceNames::default();
        install_sources(&*a, &*b, &names).unwrap();
        let before = source_data(&b, "viewBounds");

        let link = OverlayLink::attach(a.clone(), b.clone(), names);
        a.jump_to(&CameraOptions::new().with_zoom(11.0)).unwrap();

        assert_eq!(link.refresh_count(), 1);
        assert_ne!(source_data(&b, "viewBounds"), before);
        assert_eq!(
            source_data(&b, "viewBounds"),
            compute_view_rectangle(&*a).unwrap()
        );
    }

    #[test]
    fn test_link_ignores_animation_frames_until_end() {
        let a = primary();
        let b = overview();
        let names = OverlaySourceNames::default();
        install_sources(&*a, &*b, &names).unwrap();
        let link = OverlayLink::attach(a.clone(), b.clone(), names);

        a.fly_to(
            &CameraOptions::new().with_zoom(12.0),
            std::time::Duration::from_millis(100),
        )
        .unwrap();
        a.advance(std::time::Duration::from_millis(50)).unwrap();
        assert_eq!(link.refresh_count(), 0);

        a.advance(std::time::Duration::from_millis(50)).unwrap();
        assert_eq!(link.refresh_count(), 1);
    }

    #[test]
    fn test_detach_stops_refreshing() {
        let a = primary();
        let b = overview();
        let link = OverlayLink::attach(a.clone(), b.clone(), OverlaySourceNames::default());
        assert_eq!(a.listener_count(EventKind::MoveEnd), 1);

        link.detach();
        assert_eq!(a.listener_count(EventKind::MoveEnd), 0);
    }

    #[test]
    fn test_drop_detaches() {
        let a = primary();
        let b = overview();
        {
            let _link = OverlayLink::attach(a.clone(), b.clone(), OverlaySourceNames::default());
            assert_eq!(a.listener_count(EventKind::MoveEnd), 1);
        }
        assert_eq!(a.listener_count(EventKind::MoveEnd), 0);
    }
}
