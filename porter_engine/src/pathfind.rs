//! Multi-worker path search.
//!
//! A `find-path` request races `k` workers, each performing an independent
//! self-avoiding random walk over the room graph, then keeps the shortest
//! walk that actually reached the destination. The search is best-effort and
//! non-optimal by design: a worker may burn its whole step budget without
//! finding the destination, so more workers raise the odds of success but
//! never guarantee it.
//!
//! Workers never touch the session lock. They receive the `Arc`'d graph and
//! a copy of the starting room, both immutable, so they can run while the
//! command loop still holds the world.

use crate::graph::RoomGraph;
use log::{debug, warn};
use rand::Rng;
use std::sync::Arc;
use std::thread;

/// Step budget for a single worker's walk.
pub const WALK_STEP_BUDGET: usize = 1000;

/// One worker's walk: the rooms visited in order, starting at the search's
/// starting room, and whether the last of them is the requested destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSearchResult {
    pub rooms: Vec<usize>,
    pub ok: bool,
}

impl PathSearchResult {
    /// Number of edges traversed.
    pub fn edge_len(&self) -> usize {
        self.rooms.len().saturating_sub(1)
    }
}

/// Run one bounded self-avoiding random walk from `start` toward `dest`.
///
/// Up to [`WALK_STEP_BUDGET`] times: draw a uniformly random room, advance
/// only if it is adjacent to the walk's current room and not yet on the
/// path, and stop the moment the path ends at `dest`.
pub fn random_walk(graph: &RoomGraph, start: usize, dest: usize, rng: &mut impl Rng) -> PathSearchResult {
    let room_count = graph.room_count();
    if room_count == 0 {
        return PathSearchResult { rooms: Vec::new(), ok: false };
    }
    let mut rooms = vec![start];
    let mut here = start;
    for _ in 0..WALK_STEP_BUDGET {
        if here == dest {
            break;
        }
        let candidate = rng.random_range(0..room_count);
        if graph.connects(here, candidate) && !rooms.contains(&candidate) {
            rooms.push(candidate);
            here = candidate;
        }
    }
    PathSearchResult { ok: here == dest, rooms }
}

/// Race `workers` random walks from `start` to `dest` and reduce to the
/// shortest successful one.
///
/// Spawns the full pool, joins every worker, then keeps the success with the
/// strictly smallest edge count (ties go to whichever was reduced first).
/// The initial length ceiling of `room_count + 1` can never be met by a
/// self-avoiding walk, so zero successful workers yields `None`.
pub fn find_path(graph: &Arc<RoomGraph>, start: usize, dest: usize, workers: usize) -> Option<PathSearchResult> {
    let mut handles = Vec::with_capacity(workers);
    for worker in 0..workers {
        let graph = Arc::clone(graph);
        handles.push(thread::spawn(move || {
            let mut rng = rand::rng();
            let result = random_walk(&graph, start, dest, &mut rng);
            debug!(
                "path worker {worker}: {} edges, reached destination: {}",
                result.edge_len(),
                result.ok
            );
            result
        }));
    }

    let mut best: Option<PathSearchResult> = None;
    let mut ceiling = graph.room_count() + 1;
    for handle in handles {
        match handle.join() {
            Ok(result) => {
                if result.ok && result.edge_len() < ceiling {
                    ceiling = result.edge_len();
                    best = Some(result);
                }
            },
            Err(_) => warn!("path search worker panicked; discarding its result"),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn complete_graph(n: usize) -> Arc<RoomGraph> {
        let flat: String = (0..n)
            .flat_map(|a| (0..n).map(move |b| if a == b { '0' } else { '1' }))
            .collect();
        Arc::new(RoomGraph::from_flat_str(&flat).unwrap())
    }

    #[test]
    fn walk_is_self_avoiding_and_edge_following() {
        let graph = complete_graph(6);
        let mut rng = StdRng::seed_from_u64(99);
        let result = random_walk(&graph, 0, 5, &mut rng);
        assert_eq!(result.rooms[0], 0);
        for pair in result.rooms.windows(2) {
            assert!(graph.connects(pair[0], pair[1]));
        }
        let mut seen = result.rooms.clone();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), result.rooms.len());
    }

    #[test]
    fn walk_to_own_room_succeeds_immediately() {
        let graph = complete_graph(3);
        let mut rng = StdRng::seed_from_u64(5);
        let result = random_walk(&graph, 1, 1, &mut rng);
        assert!(result.ok);
        assert_eq!(result.rooms, vec![1]);
        assert_eq!(result.edge_len(), 0);
    }

    #[test]
    fn fully_connected_scenario_finds_short_path() {
        // 4-room complete graph, player in room 0, find-path 5 2:
        // success with a path 0..=2, at most 3 edges.
        let graph = complete_graph(4);
        let result = find_path(&graph, 0, 2, 5).expect("five workers on a K4 should reach room 2");
        assert!(result.ok);
        assert_eq!(result.rooms.first(), Some(&0));
        assert_eq!(result.rooms.last(), Some(&2));
        assert!(result.edge_len() <= 3);
    }

    #[test]
    fn zero_workers_always_fail() {
        let graph = complete_graph(4);
        assert_eq!(find_path(&graph, 0, 2, 0), None);
    }

    #[test]
    fn unreachable_destination_fails() {
        // two disconnected pairs: 0-1 and 2-3
        let graph = Arc::new(RoomGraph::from_flat_str("0100100000010010").unwrap());
        assert_eq!(find_path(&graph, 0, 2, 8), None);
    }

    #[test]
    fn reduction_keeps_a_successful_result_only() {
        let graph = complete_graph(2);
        let result = find_path(&graph, 0, 1, 3).expect("adjacent room is always reachable");
        assert_eq!(result.rooms, vec![0, 1]);
        assert_eq!(result.edge_len(), 1);
    }
}
