//! The directory of connected players.

use std::collections::BTreeMap;

use tether_party::{PlayerProfile, Roster};
use tether_protocol::PlayerId;

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A connected player's record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// The player's id, assigned at authentication.
    pub id: PlayerId,
    /// The player's display name.
    pub name: String,
    /// The player's level.
    pub level: u16,
}

// ---------------------------------------------------------------------------
// JoinError
// ---------------------------------------------------------------------------

/// Errors that can occur when admitting a player.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JoinError {
    /// The server already holds its configured maximum of players.
    #[error("server is full ({0} players)")]
    ServerFull(usize),

    /// A player with this id is already connected.
    #[error("player {0} is already connected")]
    AlreadyConnected(PlayerId),
}

// ---------------------------------------------------------------------------
// PlayerDirectory
// ---------------------------------------------------------------------------

/// All currently connected players, keyed by id. Iteration order is
/// ascending id, which keeps broadcast order deterministic.
#[derive(Debug)]
pub struct PlayerDirectory {
    players: BTreeMap<PlayerId, Player>,
    max_players: usize,
}

impl PlayerDirectory {
    /// Creates an empty directory admitting at most `max_players`.
    pub fn new(max_players: u32) -> Self {
        Self {
            players: BTreeMap::new(),
            max_players: max_players as usize,
        }
    }

    /// Admits a player.
    pub fn insert(&mut self, player: Player) -> Result<(), JoinError> {
        if self.players.len() >= self.max_players {
            return Err(JoinError::ServerFull(self.max_players));
        }
        if self.players.contains_key(&player.id) {
            return Err(JoinError::AlreadyConnected(player.id));
        }
        self.players.insert(player.id, player);
        Ok(())
    }

    /// Removes and returns a player. `None` if not connected.
    pub fn remove(&mut self, id: PlayerId) -> Option<Player> {
        self.players.remove(&id)
    }

    /// Looks up a connected player.
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Number of connected players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether no players are connected.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Iterates over connected players in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }
}

impl Roster for PlayerDirectory {
    fn profile(&self, id: PlayerId) -> Option<PlayerProfile> {
        self.players.get(&id).map(|p| PlayerProfile {
            player_id: p.id,
            name: p.name.clone(),
            level: p.level,
        })
    }

    fn connected(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: PlayerId, name: &str) -> Player {
        Player {
            id,
            name: name.to_string(),
            level: 1,
        }
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut dir = PlayerDirectory::new(4);
        dir.insert(player(1, "Alice")).unwrap();
        dir.insert(player(2, "Bob")).unwrap();

        assert_eq!(dir.len(), 2);
        assert_eq!(dir.get(1).unwrap().name, "Alice");
        assert!(dir.contains(2));
        assert!(!dir.contains(3));
    }

    #[test]
    fn test_admission_cap() {
        let mut dir = PlayerDirectory::new(1);
        dir.insert(player(1, "Alice")).unwrap();

        assert_eq!(
            dir.insert(player(2, "Bob")),
            Err(JoinError::ServerFull(1))
        );
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut dir = PlayerDirectory::new(4);
        dir.insert(player(1, "Alice")).unwrap();

        assert_eq!(
            dir.insert(player(1, "Imposter")),
            Err(JoinError::AlreadyConnected(1))
        );
        assert_eq!(dir.get(1).unwrap().name, "Alice");
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut dir = PlayerDirectory::new(4);
        dir.insert(player(1, "Alice")).unwrap();

        assert!(dir.remove(1).is_some());
        assert!(dir.remove(1).is_none());
        assert!(dir.is_empty());
    }

    #[test]
    fn test_connected_is_ascending() {
        let mut dir = PlayerDirectory::new(8);
        for id in [5, 1, 3] {
            dir.insert(player(id, "p")).unwrap();
        }
        assert_eq!(dir.connected(), vec![1, 3, 5]);
    }
}
