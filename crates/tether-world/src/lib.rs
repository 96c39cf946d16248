//! World-object identity: the entity arena and the reference directory.
//!
//! [`WorldStore`] is an arena of entity records with typed optional component
//! slots. [`EntityDirectory`] maps stable world [`RefId`]s onto ephemeral
//! [`EntityHandle`]s as objects activate and deactivate, and owns the
//! destroy-on-orphan rule.

pub mod directory;
pub mod store;

pub use directory::{
    EntityDirectory, EntitySpawned, NoopObjectModel, ObjectModel, ReferenceActivated,
    ReferenceDeactivated,
};
pub use store::{EntityHandle, ReferenceOrigin, RemoteAuthority, WorldStore};

use std::fmt;

// ---------------------------------------------------------------------------
// RefId
// ---------------------------------------------------------------------------

/// Stable 32-bit identifier of a world object, assigned by the world outside
/// this core. Persists across the object's lifetime; uniqueness is *not*
/// guaranteed when an object re-activates without a prior deactivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefId(pub u32);

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Reserved [`RefId`] of the locally controlled player object.
pub const LOCAL_PLAYER_REF: RefId = RefId(0x14);

// ---------------------------------------------------------------------------
// FormKind
// ---------------------------------------------------------------------------

/// Class of a world object, as reported by the engine at activation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    /// A character (player or NPC). The only kind the directory tracks.
    Character,
    /// Static scenery or furniture.
    Prop,
    /// A launched projectile.
    Projectile,
    /// A light source.
    Light,
}

impl FormKind {
    /// Whether this kind participates in identity tracking.
    pub fn is_character(self) -> bool {
        matches!(self, FormKind::Character)
    }
}
