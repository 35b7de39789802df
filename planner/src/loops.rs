//! Loop discovery.
//!
//! One depth-first walk from the start room. Every edge that reaches an
//! already visited room closes a loop; the loop is read off the search stack.
//! The stack is explicit, so deep mazes do not hit the call-depth limit.

use crate::direction::Direction;
use crate::world::{RoomId, World, WorldError};
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub type LoopId = usize;

/// A closed walk. `directions[i]` leads from `rooms[i]` to `rooms[(i + 1) % len]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loop {
    pub directions: Vec<Direction>,
    pub rooms: Vec<RoomId>,
}

impl Loop {
    pub fn len(&self) -> usize {
        self.directions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    /// Direction that continues around the loop from `offset`.
    pub fn forward(&self, offset: usize) -> Direction {
        self.directions[offset]
    }

    /// Direction that goes back to the previous room on the loop.
    pub fn backward(&self, offset: usize) -> Direction {
        let prev = (offset + self.len() - 1) % self.len();
        self.directions[prev].opposite()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoopMap {
    pub loops: Vec<Loop>,
    /// room -> (loop, offset). A room on several loops keeps the first one found.
    pub membership: HashMap<RoomId, (LoopId, usize)>,
}

impl LoopMap {
    pub fn lookup(&self, room: RoomId) -> Option<(LoopId, usize)> {
        self.membership.get(&room).copied()
    }

    pub fn get(&self, id: LoopId) -> Option<&Loop> {
        self.loops.get(id)
    }

    pub fn len(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }
}

/// Search frame: the room and the direction that leads back to its parent.
struct Frame {
    room: RoomId,
    back: Option<Direction>,
}

pub fn find_loops(world: &World, start: RoomId) -> Result<LoopMap, WorldError> {
    let mut map = LoopMap::default();
    let mut unexplored: HashMap<RoomId, Vec<Direction>> = HashMap::new();
    let mut visited: HashSet<RoomId> = HashSet::new();
    let mut stack: Vec<Frame> = Vec::new();

    let start_exits = world.exits(start)?;
    if !start_exits.is_empty() {
        unexplored.insert(start, start_exits);
    }
    stack.push(Frame {
        room: start,
        back: None,
    });
    visited.insert(start);

    while let Some(top) = stack.last() {
        if unexplored.is_empty() {
            break;
        }
        let current = top.room;

        let Some(dirs_left) = unexplored.get_mut(&current) else {
            stack.pop();
            continue;
        };
        let Some(direction) = dirs_left.pop() else {
            unexplored.remove(&current);
            continue;
        };
        if dirs_left.is_empty() {
            unexplored.remove(&current);
        }

        let next = world.neighbor(current, direction)?;
        let back = direction.opposite();

        if visited.insert(next) {
            stack.push(Frame {
                room: next,
                back: Some(back),
            });
            let mut next_exits = world.exits(next)?;
            next_exits.retain(|&d| d != back);
            if !next_exits.is_empty() {
                unexplored.insert(next, next_exits);
            }
            continue;
        }

        // `next` is on the stack: the edge just taken closes a loop.
        let id = map.loops.len();
        let mut directions = vec![back];
        let mut rooms = vec![next];

        if let Some(left) = unexplored.get_mut(&next) {
            left.retain(|&d| d != back);
            if left.is_empty() {
                unexplored.remove(&next);
            }
        }

        for frame in stack.iter().rev() {
            if frame.room == next {
                break;
            }
            let Some(step) = frame.back else {
                break;
            };
            directions.push(step);
            rooms.push(frame.room);
        }

        for (offset, &room) in rooms.iter().enumerate() {
            map.membership.entry(room).or_insert((id, offset));
        }
        debug!(loop_id = id, len = directions.len(), entry = next, "loop found");
        map.loops.push(Loop { directions, rooms });
    }

    debug!(loops = map.loops.len(), "loop search finished");
    Ok(map)
}
