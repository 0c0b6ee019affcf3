//! Offset policies: how a clone's camera follows the master's.

use std::fmt;

use crate::viewport::{CameraOptions, CameraSnapshot};

/// Zoom difference between the overview map and the primary map.
pub const DEFAULT_ZOOM_OFFSET: f64 = -2.0;

/// Pitch the overview map is held at.
pub const DEFAULT_CLONE_PITCH: f64 = 0.0;

/// Derives the camera every clone jumps to from the master's snapshot.
///
/// Called once per propagation pass; the result is applied to all clones.
/// Closures `Fn(&CameraSnapshot) -> CameraOptions` implement this trait.
pub trait OffsetPolicy: Send + Sync {
    fn derive(&self, master: &CameraSnapshot) -> CameraOptions;

    /// Short name for logs.
    fn name(&self) -> &'static str {
        "custom"
    }
}

impl<F> OffsetPolicy for F
where
    F: Fn(&CameraSnapshot) -> CameraOptions + Send + Sync,
{
    fn derive(&self, master: &CameraSnapshot) -> CameraOptions {
        self(master)
    }
}

/// Zoomed-out, unpitched context view.
///
/// Center and bearing are copied verbatim, zoom is shifted by
/// `zoom_offset` (never below 0) and pitch is pinned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverviewPolicy {
    zoom_offset: f64,
    pitch: f64,
}

impl Default for OverviewPolicy {
    fn default() -> Self {
        Self {
            zoom_offset: DEFAULT_ZOOM_OFFSET,
            pitch: DEFAULT_CLONE_PITCH,
        }
    }
}

impl OverviewPolicy {
    pub fn new(zoom_offset: f64, pitch: f64) -> Self {
        Self { zoom_offset, pitch }
    }

    pub fn zoom_offset(&self) -> f64 {
        self.zoom_offset
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }
}

impl OffsetPolicy for OverviewPolicy {
    fn derive(&self, master: &CameraSnapshot) -> CameraOptions {
        CameraOptions {
            center: Some(master.center),
            zoom: Some((master.zoom + self.zoom_offset).max(0.0)),
            bearing: Some(master.bearing),
            pitch: Some(self.pitch),
        }
    }

    fn name(&self) -> &'static str {
        "overview"
    }
}

impl fmt::Display for OverviewPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "overview(zoom{:+}, pitch={})", self.zoom_offset, self.pitch)
    }
}

/// Exact mirror: every clone shows precisely what the master shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorPolicy;

impl OffsetPolicy for MirrorPolicy {
    fn derive(&self, master: &CameraSnapshot) -> CameraOptions {
        CameraOptions::from(*master)
    }

    fn name(&self) -> &'static str {
        "mirror"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LngLat;

    fn master() -> CameraSnapshot {
        CameraSnapshot::new(LngLat::new(10.0, 20.0), 10.0, 45.0, 30.0)
    }

    #[test]
    fn test_overview_policy_defaults() {
        let target = OverviewPolicy::default().derive(&master());

        assert_eq!(target.center, Some(LngLat::new(10.0, 20.0)));
        assert_eq!(target.zoom, Some(8.0));
        assert_eq!(target.bearing, Some(45.0));
        assert_eq!(target.pitch, Some(0.0));
    }

    #[test]
    fn test_overview_policy_never_goes_below_zero() {
        let low = CameraSnapshot::new(LngLat::new(0.0, 0.0), 1.0, 0.0, 0.0);
        let target = OverviewPolicy::default().derive(&low);
        assert_eq!(target.zoom, Some(0.0));
    }

    #[test]
    fn test_overview_policy_custom_offset() {
        let policy = OverviewPolicy::new(-4.0, 10.0);
        let target = policy.derive(&master());

        assert_eq!(target.zoom, Some(6.0));
        assert_eq!(target.pitch, Some(10.0));
        assert_eq!(policy.to_string(), "overview(zoom-4, pitch=10)");
    }

    #[test]
    fn test_mirror_policy_copies_everything() {
        let target = MirrorPolicy.derive(&master());
        assert_eq!(target, CameraOptions::from(master()));
        assert_eq!(MirrorPolicy.name(), "mirror");
    }

    #[test]
    fn test_closure_policy() {
        let policy = |m: &CameraSnapshot| CameraOptions::new().with_zoom(m.zoom + 1.0);
        let target = policy.derive(&master());

        assert_eq!(target.zoom, Some(11.0));
        assert_eq!(target.center, None);
        assert_eq!(policy.name(), "custom");
    }
}
