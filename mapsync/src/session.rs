//! Primary/overview session.
//!
//! [`OverviewSession`] wires the two halves together for an A/B pair: the
//! synchronizer that keeps the overview's camera following the primary map,
//! and the overlay link that redraws the primary's outlines on the overview.
//!
//! # Startup Sequence
//!
//! 1. Both viewports must already be loaded
//! 2. The overview jumps to the camera derived from the master's
//! 3. The synchronizer engages over `[master, overview]`
//! 4. The overlay sources are added to the overview (or reused when an
//!    earlier session left them there)
//! 5. The overlay link starts listening for `MoveEnd` on the master
//!
//! A failure in step 4 drops the sync handle, which disengages the group, so
//! a failed start leaves no listeners behind.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mapsync::config::SyncConfig;
//! use mapsync::geo::{CanvasSize, LngLat};
//! use mapsync::session::OverviewSession;
//! use mapsync::viewport::{CameraOptions, MapViewport, SimulatedViewport};
//!
//! let primary = Arc::new(
//!     SimulatedViewport::new(LngLat::new(151.0, -33.5), 9.0)
//!         .with_canvas(CanvasSize::new(800, 600), 1.0),
//! );
//! let overview = Arc::new(
//!     SimulatedViewport::new(LngLat::new(0.0, 0.0), 0.0)
//!         .with_canvas(CanvasSize::new(400, 300), 1.0),
//! );
//!
//! let session =
//!     OverviewSession::start(primary.clone(), overview.clone(), &SyncConfig::default())
//!         .unwrap();
//!
//! primary.jump_to(&CameraOptions::new().with_zoom(10.0)).unwrap();
//! assert_eq!(overview.zoom(), 8.0);
//! assert_eq!(session.overlay_refreshes(), 1);
//!
//! session.stop();
//! ```

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::SyncConfig;
use crate::overlay::{install_sources, OverlayLink};
use crate::sync::{engage, OffsetPolicy, SyncError, SyncHandle, SyncStatsSnapshot};
use crate::viewport::{MapViewport, ViewportError, ViewportId};

/// Errors raised while starting a session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("Synchronizer error: {0}")]
    Sync(#[from] SyncError),

    #[error("Viewport error: {0}")]
    Viewport(#[from] ViewportError),
}

/// A running primary/overview pair.
///
/// Stopping (or dropping) the session removes every listener it added.
/// The overlay sources stay on the overview with their last data and are
/// picked up again by the next session on the same overview.
pub struct OverviewSession {
    master: Arc<dyn MapViewport>,
    overview: Arc<dyn MapViewport>,
    sync: SyncHandle,
    overlay: OverlayLink,
}

impl OverviewSession {
    /// Start synchronizing `overview` to `master`.
    ///
    /// The overview first jumps to the camera derived from the master's
    /// current camera, so the pair starts out consistent.
    ///
    /// # Errors
    ///
    /// - [`ViewportError::NotReady`] if either viewport is not loaded
    /// - [`SyncError::DuplicateViewport`] if both arguments are the same map
    /// - any error the overview reports while taking the overlay sources
    pub fn start(
        master: Arc<dyn MapViewport>,
        overview: Arc<dyn MapViewport>,
        config: &SyncConfig,
    ) -> Result<Self, SessionError> {
        for viewport in [&master, &overview] {
            if !viewport.loaded() {
                return Err(ViewportError::NotReady(viewport.id()).into());
            }
        }
        if master.id() == overview.id() {
            return Err(SyncError::DuplicateViewport(master.id()).into());
        }

        let policy = config.policy();
        info!(
            master = %master.id(),
            overview = %overview.id(),
            policy = %policy,
            "Starting overview session"
        );

        overview.jump_to(&policy.derive(&master.camera()))?;
        let sync = engage(vec![Arc::clone(&master), Arc::clone(&overview)], policy)?;

        install_sources(&*master, &*overview, &config.sources)?;
        let overlay = OverlayLink::attach(
            Arc::clone(&master),
            Arc::clone(&overview),
            config.sources.clone(),
        );

        debug!(master = %master.id(), overview = %overview.id(), "Overview session started");
        Ok(Self {
            master,
            overview,
            sync,
            overlay,
        })
    }

    /// Id of the primary viewport.
    pub fn master_id(&self) -> ViewportId {
        self.master.id()
    }

    /// Id of the overview viewport.
    pub fn overview_id(&self) -> ViewportId {
        self.overview.id()
    }

    /// Synchronizer counters. Index 0 is the master, 1 the overview.
    pub fn sync_stats(&self) -> SyncStatsSnapshot {
        self.sync.stats()
    }

    /// Overlay refreshes completed since start.
    pub fn overlay_refreshes(&self) -> u64 {
        self.overlay.refresh_count()
    }

    /// Disengage the synchronizer and detach the overlay link.
    pub fn stop(self) {
        let Self {
            master,
            overview,
            sync,
            overlay,
        } = self;
        overlay.detach();
        sync.disengage();
        info!(master = %master.id(), overview = %overview.id(), "Overview session stopped");
    }
}

impl std::fmt::Debug for OverviewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverviewSession")
            .field("master", &self.master.id())
            .field("overview", &self.overview.id())
            .field("sync", &self.sync)
            .field("overlay", &self.overlay)
            .finish()
    }
}
