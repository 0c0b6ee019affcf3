//! In-memory map viewport.
//!
//! `SimulatedViewport` implements the full [`MapViewport`] contract without a
//! rendering engine: a Web Mercator camera over a virtual canvas, listener
//! registration, GeoJSON overlay sources and frame-stepped fly animations.
//! It is the reference collaborator for tests and headless use.
//!
//! # Animations
//!
//! `fly_to` does not start a timer. The host drives animations explicitly
//! with [`SimulatedViewport::advance`], which keeps everything on one logical
//! thread. Every frame emits `Move`; the final frame emits `MoveEnd`, which
//! is the animation-finished signal consumers should sequence on.
//!
//! A `jump_to` while an animation runs cancels the animation, which is how a
//! real map engine behaves. A feedback loop that jumped the animating map
//! back to a synced position would therefore cut the animation short.
//!
//! # Projection
//!
//! The canvas is treated as a top-down view: `unproject` honours bearing but
//! not pitch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::{
    CameraOptions, CameraSnapshot, EventKind, InMemoryGeoJsonSource, Listener, ListenerRegistry,
    MapEvent, MapViewport, OverlaySource, ViewportError, ViewportId,
};
use crate::geo::{
    self, lerp_bearing, normalize_bearing, wrap_longitude, CanvasSize, LngLat, LngLatBounds,
    ScreenPoint, MAX_LAT, MIN_LAT,
};
use crate::geometry::OverlayPolygon;

/// Default minimum zoom level.
pub const DEFAULT_MIN_ZOOM: f64 = 0.0;

/// Default maximum zoom level.
pub const DEFAULT_MAX_ZOOM: f64 = 22.0;

/// Default maximum pitch in degrees.
pub const DEFAULT_MAX_PITCH: f64 = 60.0;

/// Frame interval used by [`SimulatedViewport::run_animation`] when given zero.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy)]
struct FlyAnimation {
    from: CameraSnapshot,
    to: CameraSnapshot,
    duration: Duration,
    elapsed: Duration,
}

impl FlyAnimation {
    fn progress(&self) -> f64 {
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    fn frame(&self, t: f64) -> CameraSnapshot {
        if t >= 1.0 {
            return self.to;
        }
        let e = ease_in_out_cubic(t);
        let lerp = |a: f64, b: f64| a + (b - a) * e;
        CameraSnapshot {
            center: LngLat::new(
                lerp(self.from.center.lng, self.to.center.lng),
                lerp(self.from.center.lat, self.to.center.lat),
            ),
            zoom: lerp(self.from.zoom, self.to.zoom),
            bearing: lerp_bearing(self.from.bearing, self.to.bearing, e),
            pitch: lerp(self.from.pitch, self.to.pitch),
        }
    }
}

fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[derive(Debug)]
struct SimState {
    camera: CameraSnapshot,
    canvas: Option<CanvasSize>,
    pixel_ratio: f64,
    min_zoom: f64,
    max_zoom: f64,
    max_pitch: f64,
    animation: Option<FlyAnimation>,
}

impl SimState {
    /// Resolve options against the current camera and apply constraints.
    fn constrain(&self, options: &CameraOptions) -> Result<CameraSnapshot, ViewportError> {
        let target = options.resolve(&self.camera);

        check_finite("lng", target.center.lng)?;
        check_finite("lat", target.center.lat)?;
        if !(MIN_LAT..=MAX_LAT).contains(&target.center.lat) {
            return Err(ViewportError::InvalidCamera {
                field: "lat",
                value: target.center.lat,
            });
        }
        check_finite("zoom", target.zoom)?;
        check_finite("bearing", target.bearing)?;
        check_finite("pitch", target.pitch)?;

        Ok(CameraSnapshot {
            center: LngLat::new(wrap_longitude(target.center.lng), target.center.lat),
            zoom: target.zoom.clamp(self.min_zoom, self.max_zoom),
            bearing: normalize_bearing(target.bearing),
            pitch: target.pitch.clamp(0.0, self.max_pitch),
        })
    }

    fn logical_size(&self) -> (f64, f64) {
        self.canvas
            .map(|c| c.logical(self.pixel_ratio))
            .unwrap_or((0.0, 0.0))
    }

    fn unproject(&self, point: ScreenPoint) -> LngLat {
        let (width, height) = self.logical_size();
        let (cx, cy) = geo::project(self.camera.center, self.camera.zoom);

        let dx = point.x - width / 2.0;
        let dy = point.y - height / 2.0;
        let (sin, cos) = self.camera.bearing.to_radians().sin_cos();

        let x = cx + dx * cos - dy * sin;
        let y = cy + dx * sin + dy * cos;
        geo::unproject(x, y, self.camera.zoom)
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), ViewportError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ViewportError::InvalidCamera { field, value })
    }
}

/// A headless map viewport.
///
/// # Example
///
/// ```
/// use mapsync::geo::{CanvasSize, LngLat};
/// use mapsync::viewport::{CameraOptions, MapViewport, SimulatedViewport};
///
/// let map = SimulatedViewport::new(LngLat::new(151.0, -33.5), 9.0)
///     .with_canvas(CanvasSize::new(800, 600), 1.0);
///
/// map.jump_to(&CameraOptions::new().with_zoom(10.0)).unwrap();
/// assert_eq!(map.zoom(), 10.0);
/// ```
#[derive(Debug)]
pub struct SimulatedViewport {
    id: ViewportId,
    state: Mutex<SimState>,
    listeners: ListenerRegistry,
    sources: Mutex<HashMap<String, OverlaySource>>,
}

impl SimulatedViewport {
    /// Create an unloaded viewport looking at `center` with the given zoom.
    pub fn new(center: LngLat, zoom: f64) -> Self {
        Self {
            id: ViewportId::next(),
            state: Mutex::new(SimState {
                camera: CameraSnapshot::new(
                    center,
                    zoom.clamp(DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM),
                    0.0,
                    0.0,
                ),
                canvas: None,
                pixel_ratio: 1.0,
                min_zoom: DEFAULT_MIN_ZOOM,
                max_zoom: DEFAULT_MAX_ZOOM,
                max_pitch: DEFAULT_MAX_PITCH,
                animation: None,
            }),
            listeners: ListenerRegistry::new(),
            sources: Mutex::new(HashMap::new()),
        }
    }

    /// Set the initial bearing.
    pub fn with_bearing(self, bearing: f64) -> Self {
        self.state.lock().camera.bearing = normalize_bearing(bearing);
        self
    }

    /// Set the initial pitch (clamped to the maximum pitch).
    pub fn with_pitch(self, pitch: f64) -> Self {
        {
            let mut state = self.state.lock();
            state.camera.pitch = pitch.clamp(0.0, state.max_pitch);
        }
        self
    }

    /// Attach a canvas up front. The viewport counts as loaded.
    pub fn with_canvas(self, canvas: CanvasSize, pixel_ratio: f64) -> Self {
        {
            let mut state = self.state.lock();
            state.canvas = Some(canvas);
            state.pixel_ratio = pixel_ratio;
        }
        self
    }

    /// Restrict zoom to `[min, max]`.
    pub fn with_zoom_range(self, min: f64, max: f64) -> Self {
        {
            let mut state = self.state.lock();
            state.min_zoom = min;
            state.max_zoom = max.max(min);
            state.camera.zoom = state.camera.zoom.clamp(state.min_zoom, state.max_zoom);
        }
        self
    }

    /// Set the maximum pitch.
    pub fn with_max_pitch(self, max_pitch: f64) -> Self {
        {
            let mut state = self.state.lock();
            state.max_pitch = max_pitch.max(0.0);
            state.camera.pitch = state.camera.pitch.min(state.max_pitch);
        }
        self
    }

    /// Attach (or resize) the rendering surface.
    ///
    /// The first attachment emits `Load`.
    pub fn attach_canvas(&self, canvas: CanvasSize, pixel_ratio: f64) -> Result<(), ViewportError> {
        let first = {
            let mut state = self.state.lock();
            let first = state.canvas.is_none();
            state.canvas = Some(canvas);
            state.pixel_ratio = pixel_ratio;
            first
        };
        if first {
            debug!(viewport = %self.id, canvas = %canvas, pixel_ratio, "Viewport loaded");
            self.emit(EventKind::Load)?;
        }
        Ok(())
    }

    /// Change the maximum pitch, clamping the current pitch if needed.
    pub fn set_max_pitch(&self, max_pitch: f64) {
        let mut state = self.state.lock();
        state.max_pitch = max_pitch.max(0.0);
        state.camera.pitch = state.camera.pitch.min(state.max_pitch);
    }

    /// Current maximum pitch.
    pub fn max_pitch(&self) -> f64 {
        self.state.lock().max_pitch
    }

    /// Whether a fly animation is running.
    pub fn is_animating(&self) -> bool {
        self.state.lock().animation.is_some()
    }

    /// Advance the running animation by `dt`.
    ///
    /// Emits `Move` for the new frame and `MoveEnd` when the animation
    /// completes. Returns `true` while the animation is still running
    /// afterwards, `false` when it finished or none was running.
    pub fn advance(&self, dt: Duration) -> Result<bool, ViewportError> {
        let finished = {
            let mut state = self.state.lock();
            let (camera, done) = match state.animation.as_mut() {
                None => return Ok(false),
                Some(animation) => {
                    animation.elapsed = (animation.elapsed + dt).min(animation.duration);
                    let t = animation.progress();
                    (animation.frame(t), t >= 1.0)
                }
            };
            if done {
                state.animation = None;
            }
            state.camera = camera;
            done
        };

        self.emit(EventKind::Move)?;
        if finished {
            debug!(viewport = %self.id, "Animation finished");
            self.emit(EventKind::MoveEnd)?;
            return Ok(false);
        }
        Ok(true)
    }

    /// Drive the running animation to completion.
    ///
    /// Returns the number of frames emitted. Stops early if the animation is
    /// cancelled by a listener.
    pub fn run_animation(&self, frame_interval: Duration) -> Result<usize, ViewportError> {
        let interval = if frame_interval.is_zero() {
            DEFAULT_FRAME_INTERVAL
        } else {
            frame_interval
        };
        let mut frames = 0;
        while self.is_animating() {
            frames += 1;
            if !self.advance(interval)? {
                break;
            }
        }
        Ok(frames)
    }

    /// Register an overlay source of any kind.
    pub fn insert_source(&self, name: impl Into<String>, source: OverlaySource) {
        self.sources.lock().insert(name.into(), source);
    }

    /// Number of listeners registered for an event kind.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.count(kind)
    }

    /// Whether this exact listener is registered.
    pub fn has_listener(&self, kind: EventKind, listener: &Listener) -> bool {
        self.listeners.contains(kind, listener)
    }

    fn emit(&self, kind: EventKind) -> Result<(), ViewportError> {
        self.listeners.emit(&MapEvent::new(kind, self.id))
    }
}

impl MapViewport for SimulatedViewport {
    fn id(&self) -> ViewportId {
        self.id
    }

    fn loaded(&self) -> bool {
        self.state.lock().canvas.is_some()
    }

    fn center(&self) -> LngLat {
        self.state.lock().camera.center
    }

    fn zoom(&self) -> f64 {
        self.state.lock().camera.zoom
    }

    fn bearing(&self) -> f64 {
        self.state.lock().camera.bearing
    }

    fn pitch(&self) -> f64 {
        self.state.lock().camera.pitch
    }

    fn camera(&self) -> CameraSnapshot {
        self.state.lock().camera
    }

    fn jump_to(&self, options: &CameraOptions) -> Result<(), ViewportError> {
        {
            let mut state = self.state.lock();
            let target = state.constrain(options)?;
            if state.animation.take().is_some() {
                trace!(viewport = %self.id, "Jump cancelled running animation");
            }
            state.camera = target;
            trace!(viewport = %self.id, camera = %target, "Jump");
        }
        self.emit(EventKind::Move)?;
        self.emit(EventKind::MoveEnd)
    }

    fn fly_to(&self, options: &CameraOptions, duration: Duration) -> Result<(), ViewportError> {
        if duration.is_zero() {
            return self.jump_to(options);
        }
        let mut state = self.state.lock();
        let target = state.constrain(options)?;
        let from = state.camera;
        debug!(
            viewport = %self.id,
            target = %target,
            duration_ms = duration.as_millis() as u64,
            "Fly animation started"
        );
        state.animation = Some(FlyAnimation {
            from,
            to: target,
            duration,
            elapsed: Duration::ZERO,
        });
        Ok(())
    }

    fn on(&self, kind: EventKind, listener: &Listener) {
        self.listeners.add(kind, listener);
    }

    fn off(&self, kind: EventKind, listener: &Listener) {
        self.listeners.remove(kind, listener);
    }

    fn bounds(&self) -> LngLatBounds {
        let state = self.state.lock();
        if state.canvas.is_none() {
            return LngLatBounds::from_point(state.camera.center);
        }
        let (width, height) = state.logical_size();
        let mut bounds = LngLatBounds::from_point(state.unproject(ScreenPoint::new(0.0, 0.0)));
        for corner in [
            ScreenPoint::new(width, 0.0),
            ScreenPoint::new(width, height),
            ScreenPoint::new(0.0, height),
        ] {
            bounds.extend(state.unproject(corner));
        }
        bounds
    }

    fn canvas_size(&self) -> Option<CanvasSize> {
        self.state.lock().canvas
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.state.lock().pixel_ratio
    }

    fn unproject(&self, point: ScreenPoint) -> LngLat {
        self.state.lock().unproject(point)
    }

    fn add_geojson_source(&self, name: &str, data: OverlayPolygon) -> Result<(), ViewportError> {
        let mut sources = self.sources.lock();
        if sources.contains_key(name) {
            return Err(ViewportError::SourceRejected {
                name: name.to_string(),
                reason: "source already exists".to_string(),
            });
        }
        let source = Arc::new(InMemoryGeoJsonSource::with_data(data));
        sources.insert(name.to_string(), OverlaySource::geojson(source));
        debug!(viewport = %self.id, source = name, "GeoJSON source added");
        Ok(())
    }

    fn source(&self, name: &str) -> Option<OverlaySource> {
        self.sources.lock().get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{compute_bounds_polygon, compute_view_rectangle};
    use crate::viewport::listener;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sydney() -> SimulatedViewport {
        SimulatedViewport::new(LngLat::new(151.0, -33.5), 9.0)
            .with_canvas(CanvasSize::new(800, 600), 1.0)
    }

    fn counter_on(map: &SimulatedViewport, kind: EventKind) -> Arc<AtomicUsize> {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        map.on(
            kind,
            &listener(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );
        counter
    }

    #[test]
    fn test_jump_to_updates_camera_and_emits() {
        let map = sydney();
        let moves = counter_on(&map, EventKind::Move);
        let ends = counter_on(&map, EventKind::MoveEnd);

        map.jump_to(
            &CameraOptions::new()
                .with_center(LngLat::new(10.0, 20.0))
                .with_zoom(10.0)
                .with_bearing(45.0)
                .with_pitch(30.0),
        )
        .unwrap();

        assert_eq!(
            map.camera(),
            CameraSnapshot::new(LngLat::new(10.0, 20.0), 10.0, 45.0, 30.0)
        );
        assert_eq!(moves.load(Ordering::SeqCst), 1);
        assert_eq!(ends.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_jump_to_constrains_values() {
        let map = sydney().with_zoom_range(2.0, 18.0).with_max_pitch(45.0);

        map.jump_to(
            &CameraOptions::new()
                .with_center(LngLat::new(190.0, 0.0))
                .with_zoom(25.0)
                .with_bearing(270.0)
                .with_pitch(80.0),
        )
        .unwrap();

        let camera = map.camera();
        assert_eq!(camera.center, LngLat::new(-170.0, 0.0));
        assert_eq!(camera.zoom, 18.0);
        assert_eq!(camera.bearing, -90.0);
        assert_eq!(camera.pitch, 45.0);
    }

    #[test]
    fn test_jump_to_rejects_invalid_values() {
        let map = sydney();
        let before = map.camera();

        let err = map
            .jump_to(&CameraOptions::new().with_zoom(f64::NAN))
            .unwrap_err();
        assert!(matches!(err, ViewportError::InvalidCamera { field: "zoom", .. }));

        let err = map
            .jump_to(&CameraOptions::new().with_center(LngLat::new(0.0, 89.0)))
            .unwrap_err();
        assert!(matches!(err, ViewportError::InvalidCamera { field: "lat", .. }));

        assert_eq!(map.camera(), before);
    }

    #[test]
    fn test_listener_error_propagates_from_jump() {
        let map = sydney();
        map.on(
            EventKind::Move,
            &listener(|_| Err(ViewportError::MissingSource("bbox".to_string()))),
        );

        let result = map.jump_to(&CameraOptions::new().with_zoom(5.0));
        assert_eq!(result, Err(ViewportError::MissingSource("bbox".to_string())));
        // The camera change itself already happened
        assert_eq!(map.zoom(), 5.0);
    }

    #[test]
    fn test_off_removes_listener() {
        let map = sydney();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        let l = listener(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        map.on(EventKind::Move, &l);
        assert!(map.has_listener(EventKind::Move, &l));
        map.off(EventKind::Move, &l);
        assert_eq!(map.listener_count(EventKind::Move), 0);

        map.jump_to(&CameraOptions::new().with_zoom(3.0)).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_attach_canvas_emits_load_once() {
        let map = SimulatedViewport::new(LngLat::new(0.0, 0.0), 2.0);
        let loads = counter_on(&map, EventKind::Load);
        assert!(!map.loaded());

        map.attach_canvas(CanvasSize::new(400, 300), 2.0).unwrap();
        map.attach_canvas(CanvasSize::new(800, 600), 2.0).unwrap();

        assert!(map.loaded());
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(map.canvas_size(), Some(CanvasSize::new(800, 600)));
        assert_eq!(map.device_pixel_ratio(), 2.0);
    }

    #[test]
    fn test_unproject_center_of_canvas_is_camera_center() {
        let map = sydney().with_bearing(30.0);
        let center = map.unproject(ScreenPoint::new(400.0, 300.0));
        assert!(center.approx_eq(&LngLat::new(151.0, -33.5), 1e-9));
    }

    #[test]
    fn test_unproject_orientation_without_bearing() {
        let map = sydney();
        let top_left = map.unproject(ScreenPoint::new(0.0, 0.0));
        let bottom_right = map.unproject(ScreenPoint::new(800.0, 600.0));

        assert!(top_left.lng < 151.0 && top_left.lat > -33.5);
        assert!(bottom_right.lng > 151.0 && bottom_right.lat < -33.5);
    }

    #[test]
    fn test_unproject_with_bearing_rotates_up() {
        // Bearing 90: screen-up points east
        let map = sydney().with_bearing(90.0);
        let up = map.unproject(ScreenPoint::new(400.0, 0.0));

        assert!(up.lng > 151.0);
        assert!((up.lat - -33.5).abs() < 1e-6);
    }

    #[test]
    fn test_bounds_contains_view_rectangle() {
        let map = sydney().with_bearing(20.0);
        let bounds = map.bounds();
        let rect = compute_view_rectangle(&map).unwrap();

        for corner in rect.corners() {
            assert!(bounds.contains(corner), "{} outside {:?}", corner, bounds);
        }
        assert!(bounds.contains(map.center()));
    }

    #[test]
    fn test_higher_pixel_ratio_shrinks_view() {
        let normal = sydney();
        let retina = SimulatedViewport::new(LngLat::new(151.0, -33.5), 9.0)
            .with_canvas(CanvasSize::new(800, 600), 2.0);

        let normal_bounds = normal.bounds();
        let retina_bounds = retina.bounds();
        let normal_width = normal_bounds.east - normal_bounds.west;
        let retina_width = retina_bounds.east - retina_bounds.west;

        assert!((normal_width / retina_width - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_bounds_without_canvas_is_center_point() {
        let map = SimulatedViewport::new(LngLat::new(5.0, 6.0), 3.0);
        assert_eq!(map.bounds(), LngLatBounds::from_point(LngLat::new(5.0, 6.0)));

        let rotated = SimulatedViewport::new(LngLat::new(-120.25, 47.5), 11.0).with_bearing(30.0);
        assert_eq!(
            rotated.bounds(),
            LngLatBounds::from_point(LngLat::new(-120.25, 47.5))
        );
    }

    #[test]
    fn test_fly_to_animates_and_finishes_with_move_end() {
        let map = sydney();
        let moves = counter_on(&map, EventKind::Move);
        let ends = counter_on(&map, EventKind::MoveEnd);

        map.fly_to(
            &CameraOptions::new().with_zoom(12.0).with_pitch(40.0),
            Duration::from_millis(200),
        )
        .unwrap();
        assert!(map.is_animating());
        assert_eq!(map.zoom(), 9.0);

        assert!(map.advance(Duration::from_millis(100)).unwrap());
        let mid = map.zoom();
        assert!(mid > 9.0 && mid < 12.0);
        assert_eq!(ends.load(Ordering::SeqCst), 0);

        assert!(!map.advance(Duration::from_millis(100)).unwrap());
        assert!(!map.is_animating());
        assert_eq!(map.zoom(), 12.0);
        assert_eq!(map.pitch(), 40.0);
        assert_eq!(moves.load(Ordering::SeqCst), 2);
        assert_eq!(ends.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_run_animation_counts_frames() {
        let map = sydney();
        map.fly_to(&CameraOptions::new().with_zoom(10.0), Duration::from_millis(100))
            .unwrap();

        let frames = map.run_animation(Duration::from_millis(10)).unwrap();
        assert_eq!(frames, 10);
        assert_eq!(map.zoom(), 10.0);
    }

    #[test]
    fn test_zero_duration_fly_is_a_jump() {
        let map = sydney();
        let ends = counter_on(&map, EventKind::MoveEnd);

        map.fly_to(&CameraOptions::new().with_zoom(4.0), Duration::ZERO)
            .unwrap();

        assert!(!map.is_animating());
        assert_eq!(map.zoom(), 4.0);
        assert_eq!(ends.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_jump_cancels_animation() {
        let map = sydney();
        map.fly_to(&CameraOptions::new().with_zoom(14.0), Duration::from_secs(1))
            .unwrap();
        map.advance(Duration::from_millis(100)).unwrap();

        map.jump_to(&CameraOptions::new().with_zoom(3.0)).unwrap();

        assert!(!map.is_animating());
        assert!(!map.advance(Duration::from_millis(100)).unwrap());
        assert_eq!(map.zoom(), 3.0);
    }

    #[test]
    fn test_advance_without_animation_is_noop() {
        let map = sydney();
        let moves = counter_on(&map, EventKind::Move);
        assert!(!map.advance(Duration::from_millis(16)).unwrap());
        assert_eq!(moves.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_set_max_pitch_clamps_current() {
        let map = sydney().with_pitch(55.0);
        map.set_max_pitch(45.0);
        assert_eq!(map.max_pitch(), 45.0);
        assert_eq!(map.pitch(), 45.0);
    }

    #[test]
    fn test_geojson_sources() {
        let map = sydney();
        let polygon = compute_bounds_polygon(&LngLatBounds::new(0.0, 0.0, 1.0, 1.0));

        map.add_geojson_source("bbox", polygon.clone()).unwrap();
        let err = map.add_geojson_source("bbox", polygon.clone()).unwrap_err();
        assert!(matches!(err, ViewportError::SourceRejected { .. }));

        let source = map.source("bbox").unwrap();
        assert_eq!(source.as_geojson().unwrap().data(), Some(polygon));
        assert!(map.source("missing").is_none());

        map.insert_source("tiles", OverlaySource::Raster);
        assert!(map.source("tiles").unwrap().as_geojson().is_none());
    }
}
