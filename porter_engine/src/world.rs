//! Data structures representing the game world.
//!
//! This module defines [`GameWorld`], the single shared record of map,
//! inventory, and progress that every actor in a session reads and mutates
//! (through [`crate::shared::SharedWorld`]), plus the rules for each of the
//! player's state-changing actions.

use crate::graph::RoomGraph;
use crate::style::GameStyle;
use log::info;
use rand::Rng;
use std::sync::Arc;
use thiserror::Error;

/// Maximum number of resting items a single room can hold.
pub const MAX_ITEMS_PER_ROOM: usize = 2;

/// Number of items carried by a world with `room_count` rooms.
pub fn item_count_for(room_count: usize) -> usize {
    3 * room_count / 2
}

/// Where a single item currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSlot {
    /// Resting in a room.
    Room(usize),
    /// In the player's hands. A held item is never properly placed and does
    /// not count toward room occupancy.
    Held,
}

/// Reasons a player action was rejected. The action is a no-op; the move
/// counter still advances.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("Bad room number")]
    NoSuchRoom(usize),
    #[error("room {0} is not connected to this one")]
    NotAdjacent(usize),
    #[error("there is no item {0}")]
    NoSuchItem(usize),
    #[error("your hands are already full")]
    HandsFull,
    #[error("item {0} is not in this room")]
    NotHere(usize),
    #[error("you are not carrying item {0}")]
    NotHolding(usize),
    #[error("this room already holds {MAX_ITEMS_PER_ROOM} items")]
    RoomFull,
    #[error("at least two rooms are needed to shuffle items")]
    TooFewRooms,
}

/// Complete state of one running game session.
///
/// Created either fresh (graph from a map file, inventory randomized by
/// [`GameWorld::organize_items`]) or restored verbatim by the save codec.
/// Mutated only under the session lock by the command loop, the autosave
/// timer, and the swap listener.
#[derive(Debug, Clone, PartialEq)]
pub struct GameWorld {
    /// Immutable for the life of the session; shared with path workers.
    pub graph: Arc<RoomGraph>,
    pub item_location: Vec<ItemSlot>,
    pub item_destination: Vec<usize>,
    pub properly_placed: Vec<bool>,
    pub room_occupancy: Vec<usize>,
    pub held_item: Option<usize>,
    pub current_room: usize,
    pub move_count: u64,
    pub save_count: u64,
}

impl GameWorld {
    /// Create a world over `graph` with every item resting in room 0.
    ///
    /// Callers normally follow up with [`GameWorld::organize_items`]; this
    /// state is merely a consistent starting point.
    pub fn new(graph: Arc<RoomGraph>) -> Self {
        let rooms = graph.room_count();
        let items = item_count_for(rooms);
        let mut room_occupancy = vec![0; rooms];
        if rooms > 0 {
            room_occupancy[0] = items;
        }
        Self {
            graph,
            item_location: vec![ItemSlot::Room(0); items],
            item_destination: vec![0; items],
            properly_placed: vec![false; items],
            room_occupancy,
            held_item: None,
            current_room: 0,
            move_count: 0,
            save_count: 0,
        }
    }

    pub fn room_count(&self) -> usize {
        self.graph.room_count()
    }

    pub fn item_count(&self) -> usize {
        self.item_location.len()
    }

    /// Scatter items for a fresh session.
    ///
    /// Each item starts in a random room holding fewer than
    /// [`MAX_ITEMS_PER_ROOM`] items; each destination is a random room with
    /// fewer than [`MAX_ITEMS_PER_ROOM`] destinations that differs from the
    /// item's starting room. The player starts in a random room, empty
    /// handed, with all counters zeroed.
    ///
    /// # Errors
    /// Fails on worlds with fewer than two rooms, where no valid destination
    /// assignment exists.
    pub fn organize_items(&mut self, rng: &mut impl Rng) -> Result<(), ActionError> {
        let rooms = self.room_count();
        if rooms < 2 {
            return Err(ActionError::TooFewRooms);
        }
        let items = self.item_count();
        self.room_occupancy = vec![0; rooms];
        self.properly_placed = vec![false; items];
        self.held_item = None;
        self.move_count = 0;
        self.save_count = 0;
        self.current_room = rng.random_range(0..rooms);

        for i in 0..items {
            loop {
                let room = rng.random_range(0..rooms);
                if self.room_occupancy[room] < MAX_ITEMS_PER_ROOM {
                    self.item_location[i] = ItemSlot::Room(room);
                    self.room_occupancy[room] += 1;
                    break;
                }
            }
        }

        let mut dests_in_room = vec![0usize; rooms];
        for i in 0..items {
            loop {
                let room = rng.random_range(0..rooms);
                if dests_in_room[room] < MAX_ITEMS_PER_ROOM && self.item_location[i] != ItemSlot::Room(room) {
                    self.item_destination[i] = room;
                    dests_in_room[room] += 1;
                    break;
                }
            }
        }
        info!("organized {items} items across {rooms} rooms; player starts in room {}", self.current_room);
        Ok(())
    }

    /// Walk to an adjacent room.
    ///
    /// # Errors
    /// Rejects unknown room numbers and rooms with no direct connection.
    pub fn move_to(&mut self, room: usize) -> Result<(), ActionError> {
        if room >= self.room_count() {
            return Err(ActionError::NoSuchRoom(room));
        }
        if !self.graph.connects(self.current_room, room) {
            return Err(ActionError::NotAdjacent(room));
        }
        self.current_room = room;
        Ok(())
    }

    /// Pick up an item resting in the current room.
    ///
    /// # Errors
    /// Rejects unknown items, a second pickup while something is held, and
    /// items resting elsewhere.
    pub fn pick_up(&mut self, item: usize) -> Result<(), ActionError> {
        if item >= self.item_count() {
            return Err(ActionError::NoSuchItem(item));
        }
        if self.held_item.is_some() {
            return Err(ActionError::HandsFull);
        }
        if self.item_location[item] != ItemSlot::Room(self.current_room) {
            return Err(ActionError::NotHere(item));
        }
        self.held_item = Some(item);
        self.item_location[item] = ItemSlot::Held;
        self.room_occupancy[self.current_room] -= 1;
        self.refresh_placed(item);
        Ok(())
    }

    /// Set the held item down in the current room.
    ///
    /// # Errors
    /// Rejects items the player is not carrying and rooms already at the
    /// occupancy cap.
    pub fn drop_item(&mut self, item: usize) -> Result<(), ActionError> {
        if item >= self.item_count() {
            return Err(ActionError::NoSuchItem(item));
        }
        if self.held_item != Some(item) {
            return Err(ActionError::NotHolding(item));
        }
        if self.room_occupancy[self.current_room] >= MAX_ITEMS_PER_ROOM {
            return Err(ActionError::RoomFull);
        }
        self.item_location[item] = ItemSlot::Room(self.current_room);
        self.room_occupancy[self.current_room] += 1;
        self.held_item = None;
        self.refresh_placed(item);
        Ok(())
    }

    /// Exchange the rooms of two resting items.
    ///
    /// Both items must be resting (not held); the swap listener guarantees
    /// this by excluding the held item when sampling.
    pub fn swap_items(&mut self, a: usize, b: usize) {
        self.item_location.swap(a, b);
        self.refresh_placed(a);
        self.refresh_placed(b);
    }

    fn refresh_placed(&mut self, item: usize) {
        self.properly_placed[item] = self.item_location[item] == ItemSlot::Room(self.item_destination[item]);
    }

    /// The session's finish condition: every item in its destination room.
    pub fn is_finished(&self) -> bool {
        self.properly_placed.iter().all(|&placed| placed)
    }

    /// One-line description of the current room and its exits.
    pub fn room_summary(&self) -> String {
        let neighbors: Vec<String> = self
            .graph
            .neighbors(self.current_room)
            .iter()
            .map(ToString::to_string)
            .collect();
        format!(
            "Current room is {}. Available rooms are: {}",
            self.current_room.to_string().room_style(),
            neighbors.join(" ")
        )
    }

    /// Multi-line status block: local items, solved items, hands, moves.
    pub fn status_summary(&self) -> String {
        let here: Vec<String> = (0..self.item_count())
            .filter(|&i| self.item_location[i] == ItemSlot::Room(self.current_room))
            .map(|i| i.to_string())
            .collect();
        let placed: Vec<String> = (0..self.item_count())
            .filter(|&i| self.properly_placed[i])
            .map(|i| i.to_string())
            .collect();
        let hands = match self.held_item {
            Some(item) => format!(
                "You are carrying item {} to room {}.",
                item.to_string().item_style(),
                self.item_destination[item].to_string().room_style()
            ),
            None => "You can pick up an item.".to_string(),
        };
        format!(
            "Items in this room: {}\nProperly placed items are: {}\n{hands} Moves count: {}",
            here.join(" "),
            placed.join(" "),
            self.move_count
        )
    }
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

    fn occupancy_consistent(world: &GameWorld) -> bool {
        (0..world.room_count()).all(|room| {
            let resting = world
                .item_location
                .iter()
                .filter(|&&slot| slot == ItemSlot::Room(room))
                .count();
            resting == world.room_occupancy[room]
        })
    }

    fn placed_flags_consistent(world: &GameWorld) -> bool {
        (0..world.item_count()).all(|i| {
            world.properly_placed[i] == (world.item_location[i] == ItemSlot::Room(world.item_destination[i]))
        })
    }

    #[test]
    fn item_count_is_three_halves_of_rooms() {
        assert_eq!(item_count_for(4), 6);
        assert_eq!(item_count_for(5), 7);
        assert_eq!(item_count_for(1), 1);
    }

    #[test]
    fn organize_respects_caps_and_destinations() {
        let mut rng = StdRng::seed_from_u64(11);
        for n in [2, 3, 4, 9] {
            let mut world = GameWorld::new(complete_graph(n));
            world.organize_items(&mut rng).unwrap();

            assert!(world.room_occupancy.iter().all(|&count| count <= MAX_ITEMS_PER_ROOM));
            assert!(occupancy_consistent(&world));
            assert!(placed_flags_consistent(&world));
            assert!(world.properly_placed.iter().all(|&placed| !placed));
            assert_eq!(world.held_item, None);
            assert!(world.current_room < n);
            for i in 0..world.item_count() {
                assert_ne!(ItemSlot::Room(world.item_destination[i]), world.item_location[i]);
            }
        }
    }

    #[test]
    fn organize_needs_two_rooms() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut world = GameWorld::new(complete_graph(1));
        assert_eq!(world.organize_items(&mut rng), Err(ActionError::TooFewRooms));
    }

    #[test]
    fn move_to_only_follows_edges() {
        let graph = Arc::new(RoomGraph::from_flat_str("010100000").unwrap()); // 0-1 only
        let mut world = GameWorld::new(graph);
        world.current_room = 0;

        assert_eq!(world.move_to(2), Err(ActionError::NotAdjacent(2)));
        assert_eq!(world.move_to(7), Err(ActionError::NoSuchRoom(7)));
        assert_eq!(world.current_room, 0);

        world.move_to(1).unwrap();
        assert_eq!(world.current_room, 1);
    }

    #[test]
    fn pick_up_and_drop_keep_invariants() {
        let mut world = GameWorld::new(complete_graph(4));
        // item 0 rests here, destined for room 2
        world.item_location = vec![ItemSlot::Room(0), ItemSlot::Room(1), ItemSlot::Room(1), ItemSlot::Room(3), ItemSlot::Room(3), ItemSlot::Room(2)];
        world.room_occupancy = vec![1, 2, 1, 2];
        world.item_destination = vec![2, 0, 3, 1, 0, 2];
        world.properly_placed = vec![false, false, false, false, false, true];
        world.current_room = 0;

        world.pick_up(0).unwrap();
        assert_eq!(world.held_item, Some(0));
        assert_eq!(world.item_location[0], ItemSlot::Held);
        assert_eq!(world.room_occupancy[0], 0);
        assert!(occupancy_consistent(&world));
        assert!(placed_flags_consistent(&world));

        world.move_to(2).unwrap();
        world.drop_item(0).unwrap();
        assert_eq!(world.held_item, None);
        assert_eq!(world.item_location[0], ItemSlot::Room(2));
        assert!(world.properly_placed[0]);
        assert!(occupancy_consistent(&world));
    }

    #[test]
    fn pick_up_rejects_absent_item_and_full_hands() {
        let mut world = GameWorld::new(complete_graph(4));
        world.item_location = vec![ItemSlot::Room(1); 6];
        world.room_occupancy = vec![0, 6, 0, 0];
        world.current_room = 0;

        assert_eq!(world.pick_up(42), Err(ActionError::NoSuchItem(42)));
        assert_eq!(world.pick_up(3), Err(ActionError::NotHere(3)));
        assert_eq!(world.held_item, None);

        world.move_to(1).unwrap();
        world.pick_up(3).unwrap();
        assert_eq!(world.pick_up(4), Err(ActionError::HandsFull));
    }

    #[test]
    fn drop_rejects_full_room_and_unheld_item() {
        let mut world = GameWorld::new(complete_graph(4));
        world.item_location = vec![
            ItemSlot::Held,
            ItemSlot::Room(1),
            ItemSlot::Room(1),
            ItemSlot::Room(2),
            ItemSlot::Room(2),
            ItemSlot::Room(3),
        ];
        world.room_occupancy = vec![0, 2, 2, 1];
        world.held_item = Some(0);
        world.current_room = 1;

        assert_eq!(world.drop_item(1), Err(ActionError::NotHolding(1)));
        assert_eq!(world.drop_item(0), Err(ActionError::RoomFull));
        assert_eq!(world.held_item, Some(0));
        assert!(occupancy_consistent(&world));

        world.move_to(3).unwrap();
        world.drop_item(0).unwrap();
        assert!(occupancy_consistent(&world));
    }

    #[test]
    fn swap_items_recomputes_placed_flags() {
        let mut world = GameWorld::new(complete_graph(2));
        world.item_location = vec![ItemSlot::Room(0), ItemSlot::Room(1), ItemSlot::Room(1)];
        world.room_occupancy = vec![1, 2];
        world.item_destination = vec![1, 0, 1];
        world.properly_placed = vec![false, false, true];

        world.swap_items(0, 1);
        assert_eq!(world.item_location[0], ItemSlot::Room(1));
        assert_eq!(world.item_location[1], ItemSlot::Room(0));
        assert!(world.properly_placed[0]);
        assert!(world.properly_placed[1]);
        assert!(world.properly_placed[2]);
        assert!(occupancy_consistent(&world));
    }

    #[test]
    fn finish_requires_every_item_placed() {
        let mut world = GameWorld::new(complete_graph(2));
        world.properly_placed = vec![true, false, true];
        assert!(!world.is_finished());
        world.properly_placed = vec![true, true, true];
        assert!(world.is_finished());
    }

    #[test]
    fn summaries_mention_local_items_and_moves() {
        let mut world = GameWorld::new(complete_graph(2));
        world.item_location = vec![ItemSlot::Room(0), ItemSlot::Room(1), ItemSlot::Room(0)];
        world.room_occupancy = vec![2, 1];
        world.move_count = 9;
        let status = world.status_summary();
        assert!(status.contains("0 2"));
        assert!(status.contains("Moves count: 9"));
        assert!(status.contains("You can pick up an item."));
    }
}
