//! Command module
//!
//! Describes the commands available at the outer menu and during play.

/// Commands accepted at the main menu, before a session starts.
#[derive(Debug, PartialEq, Eq)]
pub enum MenuCommand {
    Exit,
    GenerateRandomMap { rooms: usize, file: String },
    MapFromDirTree { dir: String, file: String },
    StartGame(String),
    LoadGame(String),
    Unknown,
}

/// Parses an input string and returns the corresponding [`MenuCommand`].
pub fn parse_menu_command(input: &str) -> MenuCommand {
    let words: Vec<&str> = input.split_whitespace().collect();
    match words.as_slice() {
        ["exit"] => MenuCommand::Exit,
        ["generate-random-map", rooms, file] => rooms.parse().map_or(MenuCommand::Unknown, |rooms| {
            MenuCommand::GenerateRandomMap {
                rooms,
                file: (*file).to_string(),
            }
        }),
        ["map-from-dir-tree", dir, file] => MenuCommand::MapFromDirTree {
            dir: (*dir).to_string(),
            file: (*file).to_string(),
        },
        ["start-game", mapfile] => MenuCommand::StartGame((*mapfile).to_string()),
        ["load-game", savefile] => MenuCommand::LoadGame((*savefile).to_string()),
        _ => MenuCommand::Unknown,
    }
}

/// Commands that can be executed by the player during a session.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    MoveTo(usize),
    PickUp(usize),
    Drop(usize),
    Save(String),
    FindPath { workers: usize, room: usize },
    Quit,
    Unknown,
}

/// Parses an input string and returns the corresponding [`Command`].
///
/// Numeric arguments that fail to parse produce [`Command::Unknown`]; the
/// play loop treats that as an invalid (but still counted) move.
pub fn parse_command(input: &str) -> Command {
    let words: Vec<&str> = input.split_whitespace().collect();
    match words.as_slice() {
        ["quit"] => Command::Quit,
        ["move-to", room] => room.parse().map_or(Command::Unknown, Command::MoveTo),
        ["pick-up", item] => item.parse().map_or(Command::Unknown, Command::PickUp),
        ["drop", item] => item.parse().map_or(Command::Unknown, Command::Drop),
        ["save", file] => Command::Save((*file).to_string()),
        ["find-path", workers, room] => match (workers.parse(), room.parse()) {
            (Ok(workers), Ok(room)) => Command::FindPath { workers, room },
            _ => Command::Unknown,
        },
        _ => Command::Unknown,
    }
}
