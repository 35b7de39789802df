//! Loop-aware traversal planner.
//!
//! The planner walks the maze depth first, keeping a stack of the moves that
//! lead back to the start. A room that sits on a known loop is handled
//! specially: the first time the planner meets a loop it goes around it in
//! the loop's own direction, and afterwards it prefers exits that leave the
//! loop. Coming back to the room where a loop was entered lets the planner
//! forget the loop's interior from its backtrack stack.

use crate::chooser::Chooser;
use crate::direction::Direction;
use crate::loops::{LoopId, LoopMap};
use crate::player::Player;
use crate::world::{RoomId, World, WorldError};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, trace};

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("backtrack requested at room {room} with an empty path stack ({unfinished} rooms unfinished)")]
    EmptyPath { room: RoomId, unfinished: usize },
    #[error("chooser returned nothing for room {room} with exits {exits:?}")]
    NoChoice { room: RoomId, exits: Vec<Direction> },
    #[error("room {0} has no unfinished exits to choose from")]
    NotUnfinished(RoomId),
    #[error(transparent)]
    World(#[from] WorldError),
}

/// One entry of the backtrack stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    pub direction: Direction,
    /// Room reached by `direction`.
    pub room: RoomId,
}

/// Where (and at which stack depth) a loop was first entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopEntry {
    pub room: RoomId,
    pub depth: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Exploring,
    Backtracking,
}

#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub start: RoomId,
    pub moves: Vec<Direction>,
    pub backtracks: usize,
    pub shortcuts: usize,
    /// Shortcuts refused because they would have lost an unfinished room.
    pub skipped_shortcuts: usize,
    pub loops: usize,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

pub struct Planner<'w, C: Chooser> {
    world: &'w World,
    loops: &'w LoopMap,
    chooser: C,
    player: Player<'w>,
    start: RoomId,
    // room -> exits not yet taken; a room is dropped once its list is empty
    unfinished: HashMap<RoomId, Vec<Direction>>,
    visited: HashSet<RoomId>,
    path: Vec<PathStep>,
    loops_entered: HashMap<LoopId, LoopEntry>,
    moves: Vec<Direction>,
    backtracks: usize,
    shortcuts: usize,
    skipped_shortcuts: usize,
}

impl<'w, C: Chooser> Planner<'w, C> {
    pub fn new(
        world: &'w World,
        loops: &'w LoopMap,
        start: RoomId,
        chooser: C,
    ) -> Result<Self, PlanError> {
        let mut unfinished = HashMap::new();
        let exits = world.exits(start)?;
        if !exits.is_empty() {
            unfinished.insert(start, exits);
        }
        let mut visited = HashSet::new();
        visited.insert(start);

        Ok(Self {
            world,
            loops,
            chooser,
            player: Player::new(world, start),
            start,
            unfinished,
            visited,
            path: Vec::new(),
            loops_entered: HashMap::new(),
            moves: Vec::new(),
            backtracks: 0,
            shortcuts: 0,
            skipped_shortcuts: 0,
        })
    }

    pub fn mode(&self) -> Mode {
        if self.unfinished.contains_key(&self.player.current_room()) {
            Mode::Exploring
        } else {
            Mode::Backtracking
        }
    }

    pub fn is_done(&self) -> bool {
        self.unfinished.is_empty()
    }

    pub fn moves(&self) -> &[Direction] {
        &self.moves
    }

    pub fn path(&self) -> &[PathStep] {
        &self.path
    }

    /// Make one move. Returns `None` once every known exit is finished.
    pub fn step(&mut self) -> Result<Option<Direction>, PlanError> {
        if self.is_done() {
            return Ok(None);
        }
        let direction = match self.mode() {
            Mode::Exploring => self.explore()?,
            Mode::Backtracking => self.backtrack()?,
        };
        Ok(Some(direction))
    }

    pub fn run(mut self) -> Result<Plan, PlanError> {
        while self.step()?.is_some() {}

        info!(
            moves = self.moves.len(),
            backtracks = self.backtracks,
            shortcuts = self.shortcuts,
            skipped_shortcuts = self.skipped_shortcuts,
            rooms = self.visited.len(),
            "traversal planned"
        );
        Ok(Plan {
            start: self.start,
            moves: self.moves,
            backtracks: self.backtracks,
            shortcuts: self.shortcuts,
            skipped_shortcuts: self.skipped_shortcuts,
            loops: self.loops.len(),
        })
    }

    fn explore(&mut self) -> Result<Direction, PlanError> {
        let room = self.player.current_room();
        let choice = self.choose_direction(room)?;

        if let Some(exits) = self.unfinished.get_mut(&room) {
            exits.retain(|&d| d != choice);
            if exits.is_empty() {
                self.unfinished.remove(&room);
            }
        }

        let next = self.player.travel(choice)?;
        self.moves.push(choice);
        self.path.push(PathStep {
            direction: choice,
            room: next,
        });
        trace!(from = room, to = next, direction = %choice, "explore");

        let back = choice.opposite();
        if self.visited.insert(next) {
            let mut next_exits = self.world.exits(next)?;
            next_exits.retain(|&d| d != back);
            if !next_exits.is_empty() {
                self.unfinished.insert(next, next_exits);
            }
        } else if let Some(exits) = self.unfinished.get_mut(&next) {
            exits.retain(|&d| d != back);
            if exits.is_empty() {
                self.unfinished.remove(&next);
            }
        }

        Ok(choice)
    }

    fn backtrack(&mut self) -> Result<Direction, PlanError> {
        let room = self.player.current_room();
        let step = self.path.pop().ok_or(PlanError::EmptyPath {
            room,
            unfinished: self.unfinished.len(),
        })?;
        let back = step.direction.opposite();
        let next = self.player.travel(back)?;
        self.moves.push(back);
        self.backtracks += 1;
        trace!(from = room, to = next, direction = %back, "backtrack");
        Ok(back)
    }

    fn choose_direction(&mut self, room: RoomId) -> Result<Direction, PlanError> {
        let exits = self
            .unfinished
            .get(&room)
            .cloned()
            .ok_or(PlanError::NotUnfinished(room))?;

        let Some((loop_id, offset)) = self.loops.lookup(room) else {
            return self.pick(room, &exits);
        };
        let Some(ring) = self.loops.get(loop_id) else {
            return self.pick(room, &exits);
        };
        let forward = ring.forward(offset);
        let backward = ring.backward(offset);

        match self.loops_entered.get(&loop_id).copied() {
            None if exits.contains(&forward) => {
                let depth = self.path.len();
                self.loops_entered.insert(loop_id, LoopEntry { room, depth });
                debug!(loop_id, room, depth, direction = %forward, "entering loop");
                Ok(forward)
            }
            entry => {
                if let Some(entry) = entry {
                    if entry.room == room {
                        self.shortcut(loop_id, entry.depth);
                    }
                }
                let off_loop: Vec<Direction> = exits
                    .iter()
                    .copied()
                    .filter(|&d| d != forward && d != backward)
                    .collect();
                if off_loop.is_empty() {
                    self.pick(room, &exits)
                } else {
                    self.pick(room, &off_loop)
                }
            }
        }
    }

    fn pick(&mut self, room: RoomId, candidates: &[Direction]) -> Result<Direction, PlanError> {
        self.chooser
            .choose(candidates)
            .ok_or_else(|| PlanError::NoChoice {
                room,
                exits: candidates.to_vec(),
            })
    }

    /// Back at a loop's entry room: cut the loop interior off the stack.
    ///
    /// Skipped when the cut would leave the stack ending somewhere else, or
    /// would drop a room that still has unfinished exits.
    fn shortcut(&mut self, loop_id: LoopId, depth: usize) {
        if depth >= self.path.len() {
            return;
        }
        let here = self.player.current_room();
        let ends_here = match depth {
            0 => self.start == here,
            _ => self.path[depth - 1].room == here,
        };
        let dropped_all_finished = self.path[depth..]
            .iter()
            .all(|s| s.room == here || !self.unfinished.contains_key(&s.room));
        if !ends_here || !dropped_all_finished {
            debug!(loop_id, room = here, depth, "shortcut skipped");
            self.skipped_shortcuts += 1;
            return;
        }

        debug!(
            loop_id,
            room = here,
            dropped = self.path.len() - depth,
            "shortcut"
        );
        self.path.truncate(depth);
        self.shortcuts += 1;
    }
}

/// Find the loops reachable from `start` and plan a full traversal.
pub fn plan_traversal<C: Chooser>(
    world: &World,
    start: RoomId,
    chooser: C,
) -> Result<Plan, PlanError> {
    let loops = crate::loops::find_loops(world, start)?;
    Planner::new(world, &loops, start, chooser)?.run()
}
