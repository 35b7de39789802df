pub mod chooser;
pub mod direction;
pub mod loops;
pub mod planner;
pub mod player;
pub mod verify;
pub mod world;

mod random_test;

pub use chooser::{Chooser, FirstChoice, RandomChooser};
pub use direction::Direction;
pub use loops::{find_loops, Loop, LoopMap};
pub use planner::{plan_traversal, Plan, PlanError, Planner};
pub use verify::{replay, Verification};
pub use world::{RoomId, RoomRecord, World, WorldError};
