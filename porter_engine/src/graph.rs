//! The room graph: an undirected adjacency matrix describing which rooms
//! interconnect.
//!
//! A [`RoomGraph`] is built once per session -- randomly, from a directory
//! tree, or by decoding a map file -- and never mutated afterwards. Sessions
//! hold it behind an `Arc` so path-search workers can read it without
//! touching the world lock.

use anyhow::{Context, Result, bail};
use log::info;
use rand::Rng;
use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

/// Failures while decoding the flat `'0'`/`'1'` map encoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapCodecError {
    #[error("map data is empty")]
    Empty,
    #[error("map data length {0} is not a perfect square")]
    NotSquare(usize),
    #[error("unexpected character {0:?} in map data")]
    BadCell(char),
}

/// Square, symmetric boolean adjacency matrix over `room_count` rooms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomGraph {
    room_count: usize,
    edges: Vec<bool>,
}

impl RoomGraph {
    /// Create a graph with `room_count` rooms and no connections.
    pub fn new_empty(room_count: usize) -> Self {
        Self {
            room_count,
            edges: vec![false; room_count * room_count],
        }
    }

    /// Generate a random undirected map over `room_count` rooms.
    ///
    /// Every room below the last is guaranteed at least one edge to a
    /// later room, which keeps the whole graph connected.
    pub fn random(room_count: usize, rng: &mut impl Rng) -> Self {
        let mut graph = Self::new_empty(room_count);
        for i in 0..room_count.saturating_sub(1) {
            loop {
                let mut count = 0;
                for j in (i + 1)..room_count {
                    let connected = rng.random_bool(0.5);
                    graph.set(i, j, connected);
                    if connected {
                        count += 1;
                    }
                }
                if count > 0 {
                    break;
                }
            }
        }
        info!("generated random map with {room_count} rooms");
        graph
    }

    /// Build a map from a directory hierarchy: one room per directory, each
    /// directory connected to the most recently visited directory one level
    /// shallower.
    ///
    /// # Errors
    /// Returns an error if the tree cannot be walked or contains no
    /// directories at all (a plain file makes no rooms).
    pub fn from_dir_tree(root: &Path) -> Result<Self> {
        let mut levels = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = entry.with_context(|| format!("walking directory tree at {}", root.display()))?;
            if entry.file_type().is_dir() {
                levels.push(entry.depth());
            }
        }

        let room_count = levels.len();
        if room_count == 0 {
            bail!("{} is not a directory", root.display());
        }
        let mut graph = Self::new_empty(room_count);
        // Rooms arrive in preorder, so the parent level is always populated
        // before any of its children.
        let mut last_at_level = vec![0usize; 1];
        for (room, &level) in levels.iter().enumerate().skip(1) {
            if last_at_level.len() <= level {
                last_at_level.resize(level + 1, 0);
            }
            last_at_level[level] = room;
            graph.set(last_at_level[level - 1], room, true);
        }
        info!(
            "mapped directory tree at {} into {room_count} rooms",
            root.display()
        );
        Ok(graph)
    }

    fn set(&mut self, a: usize, b: usize, connected: bool) {
        self.edges[a * self.room_count + b] = connected;
        self.edges[b * self.room_count + a] = connected;
    }

    pub fn room_count(&self) -> usize {
        self.room_count
    }

    /// True if rooms `a` and `b` are directly connected.
    pub fn connects(&self, a: usize, b: usize) -> bool {
        a < self.room_count && b < self.room_count && self.edges[a * self.room_count + b]
    }

    /// Rooms reachable from `room` in a single move, in ascending order.
    pub fn neighbors(&self, room: usize) -> Vec<usize> {
        (0..self.room_count).filter(|&other| self.connects(room, other)).collect()
    }

    /// Row-major flattening of the matrix as a string of `'0'`/`'1'` cells.
    pub fn to_flat_string(&self) -> String {
        self.edges.iter().map(|&cell| if cell { '1' } else { '0' }).collect()
    }

    /// Decode a row-major `'0'`/`'1'` flattening back into a graph.
    ///
    /// # Errors
    /// Rejects empty input, input whose length is not a perfect square, and
    /// any cell character other than `'0'` or `'1'`.
    pub fn from_flat_str(raw: &str) -> Result<Self, MapCodecError> {
        if raw.is_empty() {
            return Err(MapCodecError::Empty);
        }
        let len = raw.len();
        let room_count = len.isqrt();
        if room_count * room_count != len {
            return Err(MapCodecError::NotSquare(len));
        }
        let mut edges = Vec::with_capacity(len);
        for cell in raw.chars() {
            match cell {
                '0' => edges.push(false),
                '1' => edges.push(true),
                other => return Err(MapCodecError::BadCell(other)),
            }
        }
        Ok(Self { room_count, edges })
    }

    /// Write the flat map encoding to `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_flat_string()).with_context(|| format!("writing map file {}", path.display()))?;
        info!("saved {}-room map to {}", self.room_count, path.display());
        Ok(())
    }

    /// Read and decode a flat map file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or does not decode.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("reading map file {}", path.display()))?;
        Self::from_flat_str(raw.trim_end()).with_context(|| format!("parsing map file {}", path.display()))
    }
}
