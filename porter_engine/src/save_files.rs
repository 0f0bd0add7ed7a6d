//! Save-game serialization.
//!
//! The persisted layout keeps the historical field order: the flat adjacency
//! matrix, the properly-placed flags, then numeric fields as decimal tokens
//! (`move_count`, `room_count`, held item, current room, item locations,
//! item destinations, room occupancy). Unlike the historical format, every
//! numeric token is space-terminated, so decoding is unambiguous and values
//! are not capped at two digits. The manual-save counter is not persisted;
//! loading a game resets it.

use crate::graph::{MapCodecError, RoomGraph};
use crate::world::{GameWorld, ItemSlot, item_count_for};
use anyhow::{Context, Result};
use log::info;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Environment variable naming the autosave file.
pub const AUTOSAVE_ENV: &str = "GAME_AUTOSAVE";
/// Autosave fallback when neither the `-b` flag nor [`AUTOSAVE_ENV`] is set.
pub const DEFAULT_AUTOSAVE_PATH: &str = "./.game_autosave";

/// Failures while decoding a save file's contents.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SaveCodecError {
    #[error("save data ended early")]
    Truncated,
    #[error(transparent)]
    Map(#[from] MapCodecError),
    #[error("placed-flag block has {got} entries, expected {want}")]
    FlagCount { got: usize, want: usize },
    #[error("unexpected character {0:?} in placed-flag block")]
    BadFlag(char),
    #[error("bad numeric token {0:?}")]
    BadToken(String),
    #[error("{field} token {value} is out of range")]
    OutOfRange { field: &'static str, value: i64 },
    #[error("room count token {token} disagrees with map size {map}")]
    RoomCountMismatch { token: i64, map: usize },
    #[error("held item token disagrees with the location block")]
    HeldItemMismatch,
    #[error("room {room} occupancy token {token} disagrees with its {counted} resting items")]
    OccupancyMismatch { room: usize, token: usize, counted: usize },
    #[error("placed flag for item {0} disagrees with its location and destination")]
    PlacedFlagMismatch(usize),
}

/// Resolve the autosave path: `-b` argument, then [`AUTOSAVE_ENV`], then
/// [`DEFAULT_AUTOSAVE_PATH`].
pub fn resolve_autosave_path(cli: Option<PathBuf>) -> PathBuf {
    cli.or_else(|| env::var_os(AUTOSAVE_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_AUTOSAVE_PATH))
}

/// Render a world into the save-file text encoding.
pub fn encode(world: &GameWorld) -> String {
    let mut out = world.graph.to_flat_string();
    out.push(' ');
    for &placed in &world.properly_placed {
        out.push(if placed { '1' } else { '0' });
    }
    out.push(' ');
    push_token(&mut out, world.move_count.to_string());
    push_token(&mut out, world.room_count().to_string());
    // held item: -1 when empty handed, otherwise the item index
    push_token(
        &mut out,
        world.held_item.map_or_else(|| "-1".to_string(), |item| item.to_string()),
    );
    push_token(&mut out, world.current_room.to_string());
    for &slot in &world.item_location {
        push_token(&mut out, slot_token(slot));
    }
    for &dest in &world.item_destination {
        push_token(&mut out, dest.to_string());
    }
    for &count in &world.room_occupancy {
        push_token(&mut out, count.to_string());
    }
    out
}

fn push_token(out: &mut String, token: String) {
    out.push_str(&token);
    out.push(' ');
}

fn slot_token(slot: ItemSlot) -> String {
    match slot {
        ItemSlot::Room(room) => room.to_string(),
        ItemSlot::Held => "-1".to_string(),
    }
}

/// Rebuild a world from the save-file text encoding.
///
/// # Errors
/// Returns a [`SaveCodecError`] describing the first malformed field.
pub fn decode(raw: &str) -> Result<GameWorld, SaveCodecError> {
    let (graph_block, rest) = raw.split_once(' ').ok_or(SaveCodecError::Truncated)?;
    let graph = RoomGraph::from_flat_str(graph_block)?;
    let rooms = graph.room_count();
    let items = item_count_for(rooms);

    let (flag_block, rest) = rest.split_once(' ').ok_or(SaveCodecError::Truncated)?;
    if flag_block.len() != items {
        return Err(SaveCodecError::FlagCount {
            got: flag_block.len(),
            want: items,
        });
    }
    let mut properly_placed = Vec::with_capacity(items);
    for flag in flag_block.chars() {
        match flag {
            '0' => properly_placed.push(false),
            '1' => properly_placed.push(true),
            other => return Err(SaveCodecError::BadFlag(other)),
        }
    }

    let mut tokens = rest.split_ascii_whitespace();
    let move_token = next_token(&mut tokens)?;
    let move_count = u64::try_from(move_token).map_err(|_| SaveCodecError::OutOfRange {
        field: "move count",
        value: move_token,
    })?;
    let room_token = next_token(&mut tokens)?;
    if room_token != rooms as i64 {
        return Err(SaveCodecError::RoomCountMismatch {
            token: room_token,
            map: rooms,
        });
    }
    let held_item = match next_token(&mut tokens)? {
        -1 => None,
        value => Some(bounded(value, items, "held item")?),
    };
    let current_room = bounded(next_token(&mut tokens)?, rooms, "current room")?;

    let mut item_location = Vec::with_capacity(items);
    for _ in 0..items {
        item_location.push(match next_token(&mut tokens)? {
            -1 => ItemSlot::Held,
            value => ItemSlot::Room(bounded(value, rooms, "item location")?),
        });
    }
    let mut item_destination = Vec::with_capacity(items);
    for _ in 0..items {
        item_destination.push(bounded(next_token(&mut tokens)?, rooms, "item destination")?);
    }
    let mut room_occupancy = Vec::with_capacity(rooms);
    for _ in 0..rooms {
        let count = next_token(&mut tokens)?;
        room_occupancy.push(usize::try_from(count).map_err(|_| SaveCodecError::OutOfRange {
            field: "room occupancy",
            value: count,
        })?);
    }

    // Per-token bounds don't catch a tampered file whose blocks disagree
    // with each other; reject those before handing out the world.
    let held_slots = item_location.iter().filter(|&&slot| slot == ItemSlot::Held).count();
    let held_consistent = match held_item {
        Some(item) => held_slots == 1 && item_location[item] == ItemSlot::Held,
        None => held_slots == 0,
    };
    if !held_consistent {
        return Err(SaveCodecError::HeldItemMismatch);
    }
    for (room, &token) in room_occupancy.iter().enumerate() {
        let counted = item_location.iter().filter(|&&slot| slot == ItemSlot::Room(room)).count();
        if counted != token {
            return Err(SaveCodecError::OccupancyMismatch { room, token, counted });
        }
    }
    for item in 0..items {
        if properly_placed[item] != (item_location[item] == ItemSlot::Room(item_destination[item])) {
            return Err(SaveCodecError::PlacedFlagMismatch(item));
        }
    }

    Ok(GameWorld {
        graph: Arc::new(graph),
        item_location,
        item_destination,
        properly_placed,
        room_occupancy,
        held_item,
        current_room,
        move_count,
        save_count: 0,
    })
}

fn next_token<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<i64, SaveCodecError> {
    let token = tokens.next().ok_or(SaveCodecError::Truncated)?;
    token.parse().map_err(|_| SaveCodecError::BadToken(token.to_string()))
}

/// Check that a token lands in `0..limit` and return it as an index.
fn bounded(value: i64, limit: usize, field: &'static str) -> Result<usize, SaveCodecError> {
    match usize::try_from(value) {
        Ok(index) if index < limit => Ok(index),
        _ => Err(SaveCodecError::OutOfRange { field, value }),
    }
}

/// Write the full game state to `path`.
///
/// # Errors
/// Returns an error if the file cannot be written; callers decide whether
/// that ends the session (it never does -- saves are recoverable).
pub fn save_game(world: &GameWorld, path: &Path) -> Result<()> {
    fs::write(path, encode(world)).with_context(|| format!("writing save file {}", path.display()))?;
    info!("saved game ({} moves) to {}", world.move_count, path.display());
    Ok(())
}

/// Read and decode a full game state from `path`.
///
/// # Errors
/// Returns an error if the file cannot be read or does not decode.
pub fn load_game(path: &Path) -> Result<GameWorld> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading save file {}", path.display()))?;
    let world = decode(raw.trim_end()).with_context(|| format!("parsing save file {}", path.display()))?;
    info!("loaded game ({} moves) from {}", world.move_count, path.display());
    Ok(world)
}
