//! REPL and command handling.
//!
//! The game runs as two nested read-eval-print loops: an outer menu that
//! provisions maps and starts or restores sessions, and an inner play loop
//! that dispatches the player's commands against the [`SharedWorld`]. Every
//! play command, valid or not, is executed inside a single lock scope and
//! bumps the move counter exactly once.

mod input;

use crate::autosave::AutosaveConfig;
use crate::command::{Command, MenuCommand, parse_command, parse_menu_command};
use crate::graph::RoomGraph;
use crate::pathfind::find_path;
use crate::save_files::{load_game, save_game};
use crate::session::Session;
use crate::shared::SharedWorld;
use crate::style::GameStyle;
use crate::world::GameWorld;

use anyhow::Result;
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

use input::{InputEvent, InputManager};

/// How a play session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The player quit with items still out of place.
    Quit,
    /// Every item reached its destination room.
    Finished,
}

/// Result of dispatching one play command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Continue,
    Finished,
}

/// Run the outer menu loop until the player exits.
///
/// # Errors
/// Propagates input failures and session-startup failures; per-command
/// problems (unreadable maps, bad saves) are reported and the menu goes on.
pub fn run_menu(autosave_path: &Path) -> Result<()> {
    let mut input_manager = InputManager::new();
    let prompt = "[menu]> ".prompt_style().to_string();
    loop {
        let line = match input_manager.read_line(&prompt)? {
            InputEvent::Line(line) => line,
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                println!("Command canceled.");
                continue;
            },
        };
        match parse_menu_command(&line) {
            MenuCommand::Exit => break,
            MenuCommand::GenerateRandomMap { rooms, file } => generate_map_handler(rooms, &file),
            MenuCommand::MapFromDirTree { dir, file } => dir_tree_handler(Path::new(&dir), &file),
            MenuCommand::StartGame(mapfile) => start_game_handler(Path::new(&mapfile), autosave_path)?,
            MenuCommand::LoadGame(savefile) => load_game_handler(Path::new(&savefile), autosave_path)?,
            MenuCommand::Unknown => println!("{}", "Bad command".error_style()),
        }
    }
    info!("player left the menu");
    Ok(())
}

/// Generate a random map and write it to `file`.
fn generate_map_handler(rooms: usize, file: &str) {
    if rooms < 2 {
        println!("{}", "A map needs at least 2 rooms.".error_style());
        return;
    }
    let graph = RoomGraph::random(rooms, &mut rand::rng());
    match graph.save_to_file(Path::new(file)) {
        Ok(()) => println!("Wrote a {rooms}-room map to {file}."),
        Err(err) => println!("{}", format!("Couldn't write map: {err:#}").error_style()),
    }
}

/// Build a map from a directory hierarchy and write it to `file`.
fn dir_tree_handler(dir: &Path, file: &str) {
    let graph = match RoomGraph::from_dir_tree(dir) {
        Ok(graph) => graph,
        Err(err) => {
            println!("{}", format!("Couldn't map directory tree: {err:#}").error_style());
            return;
        },
    };
    match graph.save_to_file(Path::new(file)) {
        Ok(()) => println!("Mapped {} into a {}-room map at {file}.", dir.display(), graph.room_count()),
        Err(err) => println!("{}", format!("Couldn't write map: {err:#}").error_style()),
    }
}

/// Start a fresh session from a map file.
fn start_game_handler(mapfile: &Path, autosave_path: &Path) -> Result<()> {
    let graph = match RoomGraph::load_from_file(mapfile) {
        Ok(graph) => Arc::new(graph),
        Err(err) => {
            println!("{}", format!("Couldn't read map: {err:#}").error_style());
            return Ok(());
        },
    };
    let mut world = GameWorld::new(graph);
    if let Err(err) = world.organize_items(&mut rand::rng()) {
        println!("{}", err.to_string().error_style());
        return Ok(());
    }
    play_session(world, autosave_path)
}

/// Restore a session from a save file.
fn load_game_handler(savefile: &Path, autosave_path: &Path) -> Result<()> {
    match load_game(savefile) {
        Ok(world) => play_session(world, autosave_path),
        Err(err) => {
            println!("{}", format!("Couldn't load game: {err:#}").error_style());
            Ok(())
        },
    }
}

/// Wrap a world in the session lock, run the play loop with the background
/// actors alive, and tear everything down when it returns.
fn play_session(world: GameWorld, autosave_path: &Path) -> Result<()> {
    let shared = SharedWorld::new(world);
    let session = Session::start(&shared, AutosaveConfig::new(autosave_path.to_path_buf()))?;
    let outcome = run_play_loop(&shared);
    session.shutdown();
    match outcome? {
        PlayOutcome::Quit => info!("session ended by quit"),
        PlayOutcome::Finished => info!("session ended with every item placed"),
    }
    Ok(())
}

/// Run the inner play loop until the player quits or finishes.
///
/// # Errors
/// Propagates input failures; command failures are reported to the player
/// and never end the loop.
pub fn run_play_loop(world: &SharedWorld) -> Result<PlayOutcome> {
    let mut input_manager = InputManager::new();
    {
        let guard = world.lock();
        println!("{}", guard.room_summary());
        println!("{}", guard.status_summary());
    }
    loop {
        let prompt = {
            let guard = world.lock();
            format!("\n[Moves: {}]>> ", guard.move_count).prompt_style().to_string()
        };
        let line = match input_manager.read_line(&prompt)? {
            InputEvent::Line(line) => line,
            InputEvent::Eof => "quit".to_string(),
            InputEvent::Interrupted => {
                println!("Command canceled.");
                continue;
            },
        };
        let command = parse_command(&line);
        if command == Command::Quit {
            info!("player quit after {} moves", world.lock().move_count);
            return Ok(PlayOutcome::Quit);
        }
        if dispatch_command(world, &command) == TurnOutcome::Finished {
            return Ok(PlayOutcome::Finished);
        }
    }
}

/// Execute one play command inside a single lock scope.
///
/// Invalid arguments are reported and leave the world untouched; the move
/// counter advances either way. A drop that places the final item reports
/// the finish and ends the session without counting that last move, keeping
/// the reported total equal to the score shown while playing.
pub fn dispatch_command(world: &SharedWorld, command: &Command) -> TurnOutcome {
    let mut guard = world.lock();
    match command {
        Command::MoveTo(room) => {
            if let Err(err) = guard.move_to(*room) {
                println!("{}", err.to_string().error_style());
            }
        },
        Command::PickUp(item) => {
            if let Err(err) = guard.pick_up(*item) {
                println!("{}", err.to_string().error_style());
            }
        },
        Command::Drop(item) => match guard.drop_item(*item) {
            Ok(()) => {
                if guard.is_finished() {
                    println!("Finished game with {} moves", guard.move_count);
                    return TurnOutcome::Finished;
                }
            },
            Err(err) => println!("{}", err.to_string().error_style()),
        },
        Command::Save(file) => save_handler(&mut guard, Path::new(file)),
        Command::FindPath { workers, room } => find_path_handler(&guard, *workers, *room),
        Command::Unknown => println!("{}", "Bad command".error_style()),
        // quit never reaches dispatch; the play loop intercepts it
        Command::Quit => {},
    }
    guard.move_count += 1;
    let room_text = guard.room_summary();
    let status_text = guard.status_summary();
    drop(guard);
    println!("{room_text}");
    println!("{status_text}");
    TurnOutcome::Continue
}

/// Write a manual save and bump the save counter the autosave timer watches.
fn save_handler(world: &mut GameWorld, path: &Path) {
    match save_game(world, path) {
        Ok(()) => {
            world.save_count += 1;
            println!("Game saved to {}.", path.display());
        },
        Err(err) => {
            warn!("manual save failed: {err:#}");
            println!("{}", format!("Couldn't save game: {err:#}").error_style());
        },
    }
}

/// Race the worker pool and print the best path found, if any.
fn find_path_handler(world: &GameWorld, workers: usize, dest: usize) {
    match find_path(&world.graph, world.current_room, dest, workers) {
        Some(result) => {
            let rendered: Vec<String> = result.rooms.iter().map(ToString::to_string).collect();
            println!("{}", rendered.join(" "));
        },
        None => println!("{}", "Couldn't find path".error_style()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::ItemSlot;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tempfile::tempdir;

    fn complete_graph(n: usize) -> Arc<RoomGraph> {
        let flat: String = (0..n)
            .flat_map(|a| (0..n).map(move |b| if a == b { '0' } else { '1' }))
            .collect();
        Arc::new(RoomGraph::from_flat_str(&flat).unwrap())
    }

    fn shared_world() -> SharedWorld {
        let mut rng = StdRng::seed_from_u64(50);
        let mut world = GameWorld::new(complete_graph(4));
        world.organize_items(&mut rng).unwrap();
        SharedWorld::new(world)
    }

    #[test]
    fn every_command_counts_one_move() {
        let shared = shared_world();
        let commands = [
            Command::MoveTo(1),
            Command::MoveTo(999), // invalid: still counts
            Command::PickUp(999), // invalid: still counts
            Command::Unknown,
            Command::FindPath { workers: 2, room: 3 },
        ];
        for (done, command) in commands.iter().enumerate() {
            assert_eq!(dispatch_command(&shared, command), TurnOutcome::Continue);
            assert_eq!(shared.lock().move_count, done as u64 + 1);
        }
    }

    #[test]
    fn failed_pick_up_is_a_counted_no_op() {
        let shared = shared_world();
        let absent = {
            let guard = shared.lock();
            (0..guard.item_count())
                .find(|&i| guard.item_location[i] != ItemSlot::Room(guard.current_room))
                .unwrap()
        };
        dispatch_command(&shared, &Command::PickUp(absent));
        let guard = shared.lock();
        assert_eq!(guard.held_item, None);
        assert_eq!(guard.move_count, 1);
    }

    #[test]
    fn manual_save_bumps_save_count() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("slot");
        let shared = shared_world();
        dispatch_command(&shared, &Command::Save(path.to_string_lossy().into_owned()));
        let guard = shared.lock();
        assert_eq!(guard.save_count, 1);
        assert_eq!(guard.move_count, 1);
        assert!(path.exists());
    }

    #[test]
    fn failed_save_still_counts_but_does_not_bump_saves() {
        let shared = shared_world();
        dispatch_command(
            &shared,
            &Command::Save("/nonexistent-dir/porter-test-save".to_string()),
        );
        let guard = shared.lock();
        assert_eq!(guard.save_count, 0);
        assert_eq!(guard.move_count, 1);
    }

    #[test]
    fn final_drop_finishes_the_session() {
        let mut world = GameWorld::new(complete_graph(2));
        world.item_location = vec![ItemSlot::Room(1), ItemSlot::Held, ItemSlot::Room(0)];
        world.item_destination = vec![1, 0, 0];
        world.room_occupancy = vec![1, 1];
        world.properly_placed = vec![true, false, true];
        world.held_item = Some(1);
        world.current_room = 0;
        world.move_count = 41;
        let shared = SharedWorld::new(world);

        assert_eq!(dispatch_command(&shared, &Command::Drop(1)), TurnOutcome::Finished);
        let guard = shared.lock();
        assert!(guard.is_finished());
        // the finishing drop itself is not counted
        assert_eq!(guard.move_count, 41);
    }
}
