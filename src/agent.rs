use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

use serde::{Serialize, Serializer};

use crate::game_interface::Player;

/// Identity handed out when a player is registered.
///
/// Cheap to clone, immutable, and used as the key of every per-player table. Two players
/// are the same for the judge iff their ids are equal, whatever their strategy.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(Arc<str>);

impl PlayerId {
    /// Create an id from a player name.
    pub fn new(name: impl AsRef<str>) -> Self {
        PlayerId(Arc::from(name.as_ref()))
    }

    /// The registered name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        PlayerId::new(value)
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        PlayerId(Arc::from(value))
    }
}

impl Serialize for PlayerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

pub type BoxedPlayer = Box<dyn Player + Send>;

/// A registered player: its identity and the strategy behind a turn lock.
///
/// The lock is held for a whole match, so a player never sees two matches interleave.
pub struct Agent {
    pub id: PlayerId,
    pub index: usize,
    player: Mutex<BoxedPlayer>,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Agent {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Agent {}

impl Agent {
    pub fn new(id: PlayerId, index: usize, player: BoxedPlayer) -> Agent {
        Agent {
            id,
            index,
            player: Mutex::new(player),
        }
    }

    /// Take this player's turn lock.
    ///
    /// A player that panicked during an earlier match is still usable: the panic was
    /// caught before it could poison the lock, and a poisoned lock is recovered anyway.
    pub fn take_turn(&self) -> MutexGuard<'_, BoxedPlayer> {
        self.player
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Lock both players of a match, always in ascending id order so that concurrent matches
/// sharing players cannot deadlock.
pub fn take_turns<'a>(
    a: &'a Agent,
    b: &'a Agent,
) -> (MutexGuard<'a, BoxedPlayer>, MutexGuard<'a, BoxedPlayer>) {
    if a.id <= b.id {
        let guard_a = a.take_turn();
        let guard_b = b.take_turn();
        (guard_a, guard_b)
    } else {
        let guard_b = b.take_turn();
        let guard_a = a.take_turn();
        (guard_a, guard_b)
    }
}
