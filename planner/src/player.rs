use crate::direction::Direction;
use crate::world::{RoomId, World, WorldError};

/// Cursor over the world. Only `travel` moves it.
#[derive(Debug, Clone)]
pub struct Player<'w> {
    world: &'w World,
    current: RoomId,
}

impl<'w> Player<'w> {
    pub fn new(world: &'w World, start: RoomId) -> Self {
        Self {
            world,
            current: start,
        }
    }

    pub fn current_room(&self) -> RoomId {
        self.current
    }

    /// Move through `direction`. On error the cursor stays put.
    pub fn travel(&mut self, direction: Direction) -> Result<RoomId, WorldError> {
        let next = self.world.neighbor(self.current, direction)?;
        self.current = next;
        Ok(next)
    }
}
