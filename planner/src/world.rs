use crate::direction::Direction;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

pub type RoomId = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub exits: BTreeMap<Direction, RoomId>, // direction -> neighbor room
    pub coords: Option<(i32, i32)>,
    pub description: Option<String>,
}

/// One entry of a map file. Both shapes are accepted:
/// - `[[x, y], {"n": 1, "s": 2}]`
/// - `{"exits": {"n": 1}, "coords": [x, y], "description": "..."}`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RoomRecord {
    Compact((i32, i32), BTreeMap<Direction, RoomId>),
    Full {
        exits: BTreeMap<Direction, RoomId>,
        #[serde(default)]
        coords: Option<(i32, i32)>,
        #[serde(default)]
        description: Option<String>,
    },
}

impl RoomRecord {
    pub fn exits(exits: &[(Direction, RoomId)]) -> Self {
        RoomRecord::Full {
            exits: exits.iter().copied().collect(),
            coords: None,
            description: None,
        }
    }

    fn into_room(self, id: RoomId) -> Room {
        match self {
            RoomRecord::Compact(coords, exits) => Room {
                id,
                exits,
                coords: Some(coords),
                description: None,
            },
            RoomRecord::Full {
                exits,
                coords,
                description,
            } => Room {
                id,
                exits,
                coords,
                description,
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("map has no rooms")]
    Empty,
    #[error("room {room} exit {direction} points to unknown room {target}")]
    DanglingExit {
        room: RoomId,
        direction: Direction,
        target: RoomId,
    },
    #[error(
        "room {room} exit {direction} leads to room {target}, but its {back} exit leads to {found:?}"
    )]
    AsymmetricExit {
        room: RoomId,
        direction: Direction,
        target: RoomId,
        back: Direction,
        found: Option<RoomId>,
    },
    #[error("starting room {0} is not in the map")]
    UnknownStartingRoom(RoomId),
    #[error("unknown room {0}")]
    UnknownRoom(RoomId),
    #[error("room {room} has no exit {direction}")]
    NoExit { room: RoomId, direction: Direction },
    #[error("failed to read map file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse map: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Validated room graph. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct World {
    rooms: BTreeMap<RoomId, Room>,
    starting_room: RoomId,
}

impl World {
    /// Build from `room id -> record`. `starting_room` defaults to the lowest id.
    pub fn from_records(
        records: BTreeMap<RoomId, RoomRecord>,
        starting_room: Option<RoomId>,
    ) -> Result<Self, WorldError> {
        if records.is_empty() {
            return Err(WorldError::Empty);
        }
        let rooms: BTreeMap<RoomId, Room> = records
            .into_iter()
            .map(|(id, record)| (id, record.into_room(id)))
            .collect();

        let starting_room = match starting_room {
            Some(id) => id,
            None => *rooms.keys().next().ok_or(WorldError::Empty)?,
        };
        if !rooms.contains_key(&starting_room) {
            return Err(WorldError::UnknownStartingRoom(starting_room));
        }

        Self::validate(&rooms)?;

        Ok(Self {
            rooms,
            starting_room,
        })
    }

    fn validate(rooms: &BTreeMap<RoomId, Room>) -> Result<(), WorldError> {
        for room in rooms.values() {
            for (&direction, &target) in &room.exits {
                let other = rooms.get(&target).ok_or(WorldError::DanglingExit {
                    room: room.id,
                    direction,
                    target,
                })?;
                let back = direction.opposite();
                let found = other.exits.get(&back).copied();
                if found != Some(room.id) {
                    return Err(WorldError::AsymmetricExit {
                        room: room.id,
                        direction,
                        target,
                        back,
                        found,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn from_json_str(json: &str, starting_room: Option<RoomId>) -> Result<Self, WorldError> {
        let records: BTreeMap<RoomId, RoomRecord> = serde_json::from_str(json)?;
        Self::from_records(records, starting_room)
    }

    pub fn load(path: impl AsRef<Path>, starting_room: Option<RoomId>) -> Result<Self, WorldError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text, starting_room)
    }

    pub fn starting_room(&self) -> RoomId {
        self.starting_room
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn room(&self, id: RoomId) -> Result<&Room, WorldError> {
        self.rooms.get(&id).ok_or(WorldError::UnknownRoom(id))
    }

    pub fn room_ids(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.rooms.keys().copied()
    }

    /// All exits of a room in `Direction::ALL` order.
    pub fn exits(&self, id: RoomId) -> Result<Vec<Direction>, WorldError> {
        let room = self.room(id)?;
        Ok(Direction::ALL
            .into_iter()
            .filter(|d| room.exits.contains_key(d))
            .collect())
    }

    pub fn neighbor(&self, id: RoomId, direction: Direction) -> Result<RoomId, WorldError> {
        self.room(id)?
            .exits
            .get(&direction)
            .copied()
            .ok_or(WorldError::NoExit {
                room: id,
                direction,
            })
    }

    /// Number of undirected connections.
    pub fn edge_count(&self) -> usize {
        let ends: usize = self.rooms.values().map(|r| r.exits.len()).sum();
        ends / 2
    }
}
