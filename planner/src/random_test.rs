#[cfg(test)]
mod random_tests {
    use crate::chooser::RandomChooser;
    use crate::direction::Direction;
    use crate::loops::find_loops;
    use crate::planner::{plan_traversal, Planner};
    use crate::verify::replay;
    use crate::world::{RoomId, RoomRecord, World};
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use std::collections::{BTreeMap, HashSet};

    /// Random maze on a `width` x `height` grid: a spanning tree carved by a
    /// randomized depth-first walk, plus extra openings with probability `extra`.
    fn random_maze(width: i32, height: i32, extra: f64, rng: &mut StdRng) -> World {
        let id = |x: i32, y: i32| (y * width + x) as RoomId;
        let step = |d: Direction| match d {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        };
        let inside = |x: i32, y: i32| x >= 0 && y >= 0 && x < width && y < height;

        let mut exits: BTreeMap<RoomId, BTreeMap<Direction, RoomId>> = BTreeMap::new();
        for y in 0..height {
            for x in 0..width {
                exits.insert(id(x, y), BTreeMap::new());
            }
        }
        let open = |exits: &mut BTreeMap<RoomId, BTreeMap<Direction, RoomId>>,
                        (x, y): (i32, i32),
                        d: Direction| {
            let (dx, dy) = step(d);
            let (a, b) = (id(x, y), id(x + dx, y + dy));
            exits.get_mut(&a).unwrap().insert(d, b);
            exits.get_mut(&b).unwrap().insert(d.opposite(), a);
        };

        let mut carved = HashSet::new();
        let mut stack = vec![(0, 0)];
        carved.insert((0, 0));
        while let Some(&(x, y)) = stack.last() {
            let mut dirs = Direction::ALL.to_vec();
            dirs.shuffle(rng);
            let next = dirs.into_iter().find(|&d| {
                let (dx, dy) = step(d);
                inside(x + dx, y + dy) && !carved.contains(&(x + dx, y + dy))
            });
            match next {
                Some(d) => {
                    let (dx, dy) = step(d);
                    open(&mut exits, (x, y), d);
                    carved.insert((x + dx, y + dy));
                    stack.push((x + dx, y + dy));
                }
                None => {
                    stack.pop();
                }
            }
        }

        for y in 0..height {
            for x in 0..width {
                for d in [Direction::North, Direction::East] {
                    let (dx, dy) = step(d);
                    if inside(x + dx, y + dy) && rng.gen_bool(extra) {
                        open(&mut exits, (x, y), d);
                    }
                }
            }
        }

        let records = exits
            .into_iter()
            .map(|(room, exits)| {
                let pairs: Vec<(Direction, RoomId)> = exits.into_iter().collect();
                (room, RoomRecord::exits(&pairs))
            })
            .collect();
        World::from_records(records, Some(0)).unwrap()
    }

    #[test]
    fn random_mazes_are_fully_covered() {
        let mut rng = StdRng::seed_from_u64(2025);
        for round in 0..200 {
            let width = rng.gen_range(1..=8);
            let height = rng.gen_range(1..=8);
            let extra = [0.0, 0.05, 0.2, 0.5][round % 4];
            let world = random_maze(width, height, extra, &mut rng);
            let start = rng.gen_range(0..world.len()) as RoomId;

            let plan = plan_traversal(&world, start, RandomChooser::seeded(round as u64))
                .unwrap_or_else(|e| panic!("round {round}: {e}"));
            // every move is a real exit, otherwise replay errors
            let report = replay(&world, start, &plan.moves).unwrap();
            assert!(
                report.passed(),
                "round {round} ({width}x{height}, extra {extra}): {report}"
            );
            assert!(plan.len() <= 2 * world.edge_count());
        }
    }

    #[test]
    fn random_mazes_yield_closed_loops() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let world = random_maze(6, 6, 0.3, &mut rng);
            let map = find_loops(&world, 0).unwrap();
            // one loop per edge beyond the spanning tree
            assert_eq!(map.len(), world.edge_count() + 1 - world.len());
            for ring in &map.loops {
                let mut room = ring.rooms[0];
                for (i, &d) in ring.directions.iter().enumerate() {
                    assert_eq!(room, ring.rooms[i]);
                    room = world.neighbor(room, d).unwrap();
                }
                assert_eq!(room, ring.rooms[0]);
            }
            for (&room, &(id, offset)) in &map.membership {
                assert_eq!(map.loops[id].rooms[offset], room);
            }
        }
    }

    #[test]
    fn disjoint_loops_never_skip_shortcuts() {
        let mut rng = StdRng::seed_from_u64(31);
        let mut checked = 0;
        for round in 0..400 {
            let width = rng.gen_range(2..=8);
            let height = rng.gen_range(2..=8);
            let extra = [0.02, 0.05, 0.1][round % 3];
            let world = random_maze(width, height, extra, &mut rng);
            let start = rng.gen_range(0..world.len()) as RoomId;
            let loops = find_loops(&world, start).unwrap();

            // first-wins membership: lengths add up only when no room is shared
            let ring_rooms: usize = loops.loops.iter().map(|l| l.len()).sum();
            if loops.is_empty() || ring_rooms != loops.membership.len() {
                continue;
            }
            checked += 1;

            let plan = Planner::new(&world, &loops, start, RandomChooser::seeded(round as u64))
                .unwrap()
                .run()
                .unwrap();
            assert_eq!(
                plan.skipped_shortcuts, 0,
                "round {round} ({width}x{height}, start {start}): {:?}",
                plan.moves
            );
            assert!(replay(&world, start, &plan.moves).unwrap().passed());
        }
        assert!(checked >= 50, "only {checked} mazes with disjoint loops");
    }

    #[test]
    fn tree_mazes_never_shortcut() {
        let mut rng = StdRng::seed_from_u64(99);
        for seed in 0..50 {
            let world = random_maze(5, 5, 0.0, &mut rng);
            let loops = find_loops(&world, 0).unwrap();
            assert!(loops.is_empty());
            let plan = Planner::new(&world, &loops, 0, RandomChooser::seeded(seed))
                .unwrap()
                .run()
                .unwrap();
            assert_eq!(plan.shortcuts, 0);
            assert_eq!(plan.skipped_shortcuts, 0);
            // a tree walk never needs more than two passes over each corridor
            assert!(plan.len() <= 2 * (world.len() - 1));
            assert!(replay(&world, 0, &plan.moves).unwrap().passed());
        }
    }
}
