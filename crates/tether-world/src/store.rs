//! Arena of entity records with typed optional component slots.
//!
//! Handles are generational indices: a slot's generation is bumped when the
//! entity in it is destroyed, so a stale handle held across a destroy can
//! never alias the slot's next occupant. Every accessor checks liveness and
//! generation; operations through stale handles degrade to no-ops.

use crate::RefId;

// ---------------------------------------------------------------------------
// EntityHandle
// ---------------------------------------------------------------------------

/// Process-local, ephemeral identifier of an entity record. Recycled after
/// destruction with a bumped generation; carries no semantic meaning on its
/// own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle {
    index: u32,
    generation: u32,
}

impl EntityHandle {
    /// Raw slot index, for diagnostics only.
    pub fn index(self) -> u32 {
        self.index
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// Records the [`RefId`] an entity currently represents. Presence of this
/// component is the sole signal that the entity backs an active world object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceOrigin {
    /// The represented world object.
    pub ref_id: RefId,
}

/// Marks an entity pre-provisioned for remote (non-local) control. The
/// cached [`RefId`] matches a later activation back to this placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteAuthority {
    /// The world object this placeholder was provisioned for.
    pub cached_ref_id: RefId,
}

// ---------------------------------------------------------------------------
// WorldStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    live: bool,
    reference: Option<ReferenceOrigin>,
    remote: Option<RemoteAuthority>,
}

/// Arena of entity records. One typed `Option` slot per component kind; an
/// entity with every slot empty is an *orphan*, eligible for destruction.
#[derive(Debug, Default)]
pub struct WorldStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl WorldStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh entity record with all component slots empty.
    pub fn create(&mut self) -> EntityHandle {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.live = true;
            EntityHandle {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                live: true,
                ..Slot::default()
            });
            EntityHandle {
                index,
                generation: 0,
            }
        }
    }

    /// Destroys the entity, clearing its components and recycling the slot
    /// under a new generation. Returns `false` for a stale or unknown handle.
    pub fn destroy(&mut self, handle: EntityHandle) -> bool {
        let Some(slot) = self.slot_mut(handle) else {
            return false;
        };
        slot.live = false;
        slot.generation = slot.generation.wrapping_add(1);
        slot.reference = None;
        slot.remote = None;
        self.free.push(handle.index);
        self.live -= 1;
        true
    }

    /// Whether `handle` names a live entity.
    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.slot(handle).is_some()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether the store holds no live entities.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterates over all live entity handles.
    pub fn iter(&self) -> impl Iterator<Item = EntityHandle> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.live)
            .map(|(index, slot)| EntityHandle {
                index: index as u32,
                generation: slot.generation,
            })
    }

    /// Attaches (or replaces) the [`ReferenceOrigin`] component. No-op on a
    /// stale handle.
    pub fn attach_reference(&mut self, handle: EntityHandle, component: ReferenceOrigin) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.reference = Some(component);
        }
    }

    /// Detaches and returns the [`ReferenceOrigin`] component, if any.
    pub fn detach_reference(&mut self, handle: EntityHandle) -> Option<ReferenceOrigin> {
        self.slot_mut(handle)?.reference.take()
    }

    /// Reads the [`ReferenceOrigin`] component, if attached.
    pub fn reference(&self, handle: EntityHandle) -> Option<&ReferenceOrigin> {
        self.slot(handle)?.reference.as_ref()
    }

    /// Attaches (or replaces) the [`RemoteAuthority`] component. No-op on a
    /// stale handle.
    pub fn attach_remote(&mut self, handle: EntityHandle, component: RemoteAuthority) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.remote = Some(component);
        }
    }

    /// Detaches and returns the [`RemoteAuthority`] component, if any.
    pub fn detach_remote(&mut self, handle: EntityHandle) -> Option<RemoteAuthority> {
        self.slot_mut(handle)?.remote.take()
    }

    /// Reads the [`RemoteAuthority`] component, if attached.
    pub fn remote(&self, handle: EntityHandle) -> Option<&RemoteAuthority> {
        self.slot(handle)?.remote.as_ref()
    }

    /// Whether the entity is live with every component slot empty.
    pub fn is_orphan(&self, handle: EntityHandle) -> bool {
        self.slot(handle)
            .is_some_and(|slot| slot.reference.is_none() && slot.remote.is_none())
    }

    fn slot(&self, handle: EntityHandle) -> Option<&Slot> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.live && slot.generation == handle.generation)
    }

    fn slot_mut(&mut self, handle: EntityHandle) -> Option<&mut Slot> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.live && slot.generation == handle.generation)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
