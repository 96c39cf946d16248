//! The reference directory: stable [`RefId`] → ephemeral [`EntityHandle`].
//!
//! Activation and deactivation events from the engine drive the mapping.
//! Activating a character either reuses a pre-provisioned remote placeholder
//! (matched by cached RefId) or allocates a fresh entity, attaches a
//! [`ReferenceOrigin`], and records the entry. Deactivation detaches the
//! origin and destroys the entity once it is an orphan.

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::store::{EntityHandle, ReferenceOrigin, WorldStore};
use crate::{FormKind, LOCAL_PLAYER_REF, RefId};

// ---------------------------------------------------------------------------
// Engine events
// ---------------------------------------------------------------------------

/// Engine callback: a world object became active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceActivated {
    /// The activated object.
    pub ref_id: RefId,
    /// The object's class.
    pub kind: FormKind,
}

/// Engine callback: a world object became inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceDeactivated {
    /// The deactivated object.
    pub ref_id: RefId,
}

/// Emitted by the directory after an activation is recorded, for downstream
/// replication systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySpawned {
    /// The activated object.
    pub ref_id: RefId,
    /// The object's class.
    pub kind: FormKind,
    /// The entity now representing the object.
    pub handle: EntityHandle,
}

// ---------------------------------------------------------------------------
// ObjectModel
// ---------------------------------------------------------------------------

/// Capability surface into the external engine object model: flag a world
/// object as locally or remotely controlled.
pub trait ObjectModel {
    /// Marks the object as controlled by the local simulation.
    fn flag_local_authority(&mut self, ref_id: RefId);
    /// Marks the object as controlled by a remote peer.
    fn flag_remote_authority(&mut self, ref_id: RefId);
}

/// [`ObjectModel`] that does nothing. For tests and headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObjectModel;

impl ObjectModel for NoopObjectModel {
    fn flag_local_authority(&mut self, _ref_id: RefId) {}
    fn flag_remote_authority(&mut self, _ref_id: RefId) {}
}

// ---------------------------------------------------------------------------
// EntityDirectory
// ---------------------------------------------------------------------------

/// Owns the `RefId → EntityHandle` mapping. At most one live handle per
/// RefId, by construction of the map.
#[derive(Debug, Default)]
pub struct EntityDirectory {
    entries: FxHashMap<RefId, EntityHandle>,
}

impl EntityDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles a [`ReferenceActivated`] event. Non-character kinds are
    /// ignored. Returns the [`EntitySpawned`] event to publish, or `None`
    /// when the activation was ignored.
    ///
    /// Re-activation without a prior deactivation is accepted: the entry is
    /// overwritten with the newest handle and the previous handle is left
    /// untouched. Whether that reuse-without-cleanup is intentional respawn
    /// handling or a latent double registration is an open question; the
    /// behavior is pinned by regression tests rather than changed here.
    pub fn activate(
        &mut self,
        store: &mut WorldStore,
        model: &mut dyn ObjectModel,
        ref_id: RefId,
        kind: FormKind,
    ) -> Option<EntitySpawned> {
        if !kind.is_character() {
            trace!("ignoring activation of non-character {ref_id} ({kind:?})");
            return None;
        }

        if ref_id == LOCAL_PLAYER_REF {
            model.flag_local_authority(ref_id);
        }

        // A pre-provisioned remote placeholder for this RefId takes priority
        // over allocating a fresh entity.
        let placeholder = {
            let store: &WorldStore = store;
            store
                .iter()
                .find(|&h| store.remote(h).is_some_and(|r| r.cached_ref_id == ref_id))
        };

        let handle = match placeholder {
            Some(handle) => {
                model.flag_remote_authority(ref_id);
                debug!("reusing remote placeholder {handle:?} for {ref_id}");
                handle
            }
            None => store.create(),
        };

        store.attach_reference(handle, ReferenceOrigin { ref_id });
        self.entries.insert(ref_id, handle);
        debug!("activated {ref_id} as {handle:?}");

        Some(EntitySpawned {
            ref_id,
            kind,
            handle,
        })
    }

    /// Handles a [`ReferenceDeactivated`] event. Detaches the entity's
    /// [`ReferenceOrigin`] and destroys it if orphaned. Deactivating an
    /// unmapped RefId is a no-op, not an error.
    pub fn deactivate(&mut self, store: &mut WorldStore, ref_id: RefId) {
        let Some(handle) = self.entries.remove(&ref_id) else {
            trace!("deactivation of unmapped {ref_id} ignored");
            return;
        };

        store.detach_reference(handle);
        if store.is_orphan(handle) {
            store.destroy(handle);
            debug!("deactivated {ref_id}, destroyed orphan {handle:?}");
        } else {
            debug!("deactivated {ref_id}, {handle:?} retains components");
        }
    }

    /// Returns the handle recorded by the most recent activation of `ref_id`.
    pub fn lookup(&self, ref_id: RefId) -> Option<EntityHandle> {
        self.entries.get(&ref_id).copied()
    }

    /// Number of tracked references.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no references are tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
