use crate::direction::Direction;
use crate::player::Player;
use crate::world::{RoomId, World, WorldError};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    pub moves: usize,
    pub rooms_visited: usize,
    pub total_rooms: usize,
}

impl Verification {
    pub fn unvisited(&self) -> usize {
        self.total_rooms.saturating_sub(self.rooms_visited)
    }

    pub fn passed(&self) -> bool {
        self.rooms_visited == self.total_rooms
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed() {
            write!(
                f,
                "PASSED: {} moves, {} rooms visited",
                self.moves, self.rooms_visited
            )
        } else {
            write!(
                f,
                "FAILED: incomplete traversal, {} unvisited rooms",
                self.unvisited()
            )
        }
    }
}

/// Walk `moves` from `start` and count the distinct rooms entered.
/// A move through a missing exit is an error, not a failed verification.
pub fn replay(
    world: &World,
    start: RoomId,
    moves: &[Direction],
) -> Result<Verification, WorldError> {
    let mut player = Player::new(world, start);
    let mut seen: HashSet<RoomId> = HashSet::new();
    seen.insert(world.room(start)?.id);

    for &direction in moves {
        seen.insert(player.travel(direction)?);
    }

    Ok(Verification {
        moves: moves.len(),
        rooms_visited: seen.len(),
        total_rooms: world.len(),
    })
}
