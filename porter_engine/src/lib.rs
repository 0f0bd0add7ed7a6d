#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const PORTER_VERSION: &str = env!("CARGO_PKG_VERSION");

// Core modules
pub mod autosave;
pub mod command;
pub mod graph;
pub mod pathfind;
pub mod repl;
pub mod save_files;
pub mod session;
pub mod shared;
pub mod style;
pub mod trigger;
pub mod world;

// Re-exports for convenience
pub use autosave::{AutosaveConfig, AutosaveTimer};
pub use graph::RoomGraph;
pub use pathfind::{PathSearchResult, find_path};
pub use repl::{run_menu, run_play_loop};
pub use session::Session;
pub use shared::SharedWorld;
pub use world::{GameWorld, ItemSlot};
