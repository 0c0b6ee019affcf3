//! View synchronizer.
//!
//! Keeps a group of map viewports in lock-step without feedback loops.
//!
//! # The problem
//!
//! Every interaction that moves a map ends in a `Move` notification. If each
//! map simply re-broadcast its moves to the others, moving A would move B,
//! which would move A again, and so on. Even without an infinite loop, the
//! echo lands on A as a `jump_to`, which cancels whatever multi-step gesture
//! A was in the middle of (fly animations, double-click zoom, box zoom).
//!
//! # The protocol
//!
//! ```text
//! A fires Move ──► listener[A]
//!                    1. off(): detach every member's listener
//!                    2. snapshot = A.camera()          (read once)
//!                    3. target = policy.derive(snapshot)
//!                    4. clone.jump_to(target) for each other member
//!                       (clones fire Move, but nobody in the group listens)
//!                    5. on(): re-attach every member's listener
//! ```
//!
//! Mutual exclusion is structural: while clones are being moved there is no
//! group listener attached anywhere, so a pass can never re-enter itself.
//!
//! # Listener identity
//!
//! One listener per member is created at [`engage`] time and kept for the
//! lifetime of the group. Detaching and re-attaching always uses those same
//! `Arc`s, which is what makes `off` able to find them.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mapsync::geo::{CanvasSize, LngLat};
//! use mapsync::sync::{engage, OverviewPolicy};
//! use mapsync::viewport::{CameraOptions, MapViewport, SimulatedViewport};
//!
//! let primary = Arc::new(
//!     SimulatedViewport::new(LngLat::new(151.0, -33.5), 9.0)
//!         .with_canvas(CanvasSize::new(800, 600), 1.0),
//! );
//! let overview = Arc::new(
//!     SimulatedViewport::new(LngLat::new(151.0, -33.5), 7.0)
//!         .with_canvas(CanvasSize::new(400, 300), 1.0),
//! );
//!
//! let handle = engage(
//!     vec![
//!         primary.clone() as Arc<dyn MapViewport>,
//!         overview.clone() as Arc<dyn MapViewport>,
//!     ],
//!     OverviewPolicy::default(),
//! )
//! .unwrap();
//!
//! primary.jump_to(&CameraOptions::new().with_zoom(12.0)).unwrap();
//! assert_eq!(overview.zoom(), 10.0);
//!
//! handle.disengage();
//! ```

mod policy;
mod stats;

pub use policy::{
    MirrorPolicy, OffsetPolicy, OverviewPolicy, DEFAULT_CLONE_PITCH, DEFAULT_ZOOM_OFFSET,
};
pub use stats::{SyncStats, SyncStatsSnapshot};

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::viewport::{listener, EventKind, Listener, MapViewport, ViewportError, ViewportId};

/// Minimum number of viewports in a group.
pub const MIN_GROUP_SIZE: usize = 2;

/// Errors raised when engaging a group.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Fewer than two viewports were given.
    #[error("Sync group needs at least 2 viewports, got {size}")]
    GroupTooSmall { size: usize },

    /// The same viewport appears more than once.
    #[error("{0} appears more than once in the sync group")]
    DuplicateViewport(ViewportId),
}

#[derive(Clone)]
struct Member {
    viewport: Arc<dyn MapViewport>,
    listener: Listener,
}

struct SyncGroup {
    members: Mutex<Vec<Member>>,
    policy: Box<dyn OffsetPolicy>,
    stats: SyncStats,
}

impl SyncGroup {
    fn attach(members: &[Member]) {
        for member in members {
            member.viewport.on(EventKind::Move, &member.listener);
        }
    }

    fn detach(members: &[Member]) {
        for member in members {
            member.viewport.off(EventKind::Move, &member.listener);
        }
    }

    fn is_engaged(&self) -> bool {
        !self.members.lock().is_empty()
    }

    /// One propagation pass with the member at `master` as master.
    fn propagate(&self, master: usize) -> Result<(), ViewportError> {
        let members = self.members.lock().clone();
        if master >= members.len() {
            // Orphaned listener of a disengaged group
            return Ok(());
        }

        self.stats.pass_started(master);
        Self::detach(&members);
        let result = self.move_clones(master, &members);

        // A listener outside the group may have disengaged us mid-pass
        if self.is_engaged() {
            Self::attach(&members);
        }

        if result.is_err() {
            self.stats.pass_failed();
        }
        result
    }

    fn move_clones(&self, master: usize, members: &[Member]) -> Result<(), ViewportError> {
        let snapshot = members[master].viewport.camera();
        let target = self.policy.derive(&snapshot);
        trace!(
            master = %members[master].viewport.id(),
            camera = %snapshot,
            policy = self.policy.name(),
            "Propagating camera"
        );

        for (index, member) in members.iter().enumerate() {
            if index == master {
                continue;
            }
            if let Err(e) = member.viewport.jump_to(&target) {
                warn!(
                    master = %members[master].viewport.id(),
                    clone = %member.viewport.id(),
                    error = %e,
                    "Clone rejected synced camera"
                );
                return Err(e);
            }
            self.stats.clone_updated();
        }
        Ok(())
    }

    fn disengage(&self) {
        let members = std::mem::take(&mut *self.members.lock());
        Self::detach(&members);
        debug!(members = members.len(), "Sync group disengaged");
    }
}

/// Start synchronizing a group of viewports.
///
/// Registers one `Move` listener per viewport. Group order is propagation
/// order. The returned handle keeps the group alive; dropping it disengages.
///
/// # Errors
///
/// - [`SyncError::GroupTooSmall`] for fewer than two viewports
/// - [`SyncError::DuplicateViewport`] if a viewport is listed twice
pub fn engage<P>(group: Vec<Arc<dyn MapViewport>>, policy: P) -> Result<SyncHandle, SyncError>
where
    P: OffsetPolicy + 'static,
{
    if group.len() < MIN_GROUP_SIZE {
        return Err(SyncError::GroupTooSmall { size: group.len() });
    }
    let mut seen = HashSet::new();
    for viewport in &group {
        if !seen.insert(viewport.id()) {
            return Err(SyncError::DuplicateViewport(viewport.id()));
        }
    }

    let size = group.len();
    let policy_name = policy.name();
    let shared = Arc::new_cyclic(|weak: &Weak<SyncGroup>| {
        let members = group
            .into_iter()
            .enumerate()
            .map(|(index, viewport)| Member {
                viewport,
                listener: propagation_listener(weak.clone(), index),
            })
            .collect();
        SyncGroup {
            members: Mutex::new(members),
            policy: Box::new(policy),
            stats: SyncStats::new(size),
        }
    });

    SyncGroup::attach(&shared.members.lock());
    debug!(members = size, policy = policy_name, "Sync group engaged");

    Ok(SyncHandle {
        group: Some(shared),
    })
}

/// The listener bound to one member. Holds the group weakly so that the
/// viewports' listener registries never keep the group alive.
fn propagation_listener(group: Weak<SyncGroup>, index: usize) -> Listener {
    listener(move |_event| match group.upgrade() {
        Some(group) => group.propagate(index),
        None => Ok(()),
    })
}

/// Handle to an engaged group.
///
/// [`disengage`](SyncHandle::disengage) consumes the handle, so a group can
/// only be torn down once. Dropping the handle has the same effect.
pub struct SyncHandle {
    group: Option<Arc<SyncGroup>>,
}

impl SyncHandle {
    /// Remove every listener and release the group.
    ///
    /// A pass already running completes; no new pass starts afterwards.
    pub fn disengage(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(group) = self.group.take() {
            group.disengage();
        }
    }

    /// Number of viewports in the group.
    pub fn len(&self) -> usize {
        self.group
            .as_ref()
            .map_or(0, |group| group.members.lock().len())
    }

    /// Whether the group has no members.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Member ids in group order.
    pub fn viewport_ids(&self) -> Vec<ViewportId> {
        self.group.as_ref().map_or_else(Vec::new, |group| {
            group
                .members
                .lock()
                .iter()
                .map(|m| m.viewport.id())
                .collect()
        })
    }

    /// The listener bound to the member at `index`.
    pub fn listener(&self, index: usize) -> Option<Listener> {
        let group = self.group.as_ref()?;
        let members = group.members.lock();
        members.get(index).map(|m| Arc::clone(&m.listener))
    }

    /// Counters for this group.
    pub fn stats(&self) -> SyncStatsSnapshot {
        self.group
            .as_ref()
            .map(|group| group.stats.snapshot())
            .unwrap_or_default()
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for SyncHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncHandle")
            .field("viewports", &self.viewport_ids())
            .finish()
    }
}
