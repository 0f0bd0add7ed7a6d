//! The background autosave timer.
//!
//! A long-lived actor that polls once per interval and writes a full save
//! after the idle threshold passes without a manual save. Any manual save
//! (observed through the world's save counter) re-arms the timer. The actor
//! never ends a session on its own; a failed autosave is logged and retried
//! a threshold later.

use crate::save_files::save_game;
use crate::shared::SharedWorld;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Where and how often the timer saves.
#[derive(Debug, Clone)]
pub struct AutosaveConfig {
    pub path: PathBuf,
    pub poll_interval: Duration,
    pub idle_threshold: Duration,
}

impl AutosaveConfig {
    /// The standard cadence: poll every second, save after a minute idle.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            poll_interval: Duration::from_secs(1),
            idle_threshold: Duration::from_secs(60),
        }
    }
}

/// Handle to a running autosave thread.
///
/// Shutdown is cooperative: the stop flag is checked at every poll, so the
/// thread never dies while holding the world lock, and `shutdown` returns
/// within about one poll interval.
#[derive(Debug)]
pub struct AutosaveTimer {
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl AutosaveTimer {
    pub fn spawn(world: SharedWorld, config: AutosaveConfig) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_for_thread = Arc::clone(&stop);
        let join = thread::spawn(move || autosave_loop(&world, &config, &stop_for_thread));
        Self { stop, join: Some(join) }
    }

    /// Request a stop and wait for the thread to wind down.
    pub fn shutdown(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(join) = self.join.take()
            && join.join().is_err()
        {
            warn!("autosave thread panicked during shutdown");
        }
    }
}

impl Drop for AutosaveTimer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

fn autosave_loop(world: &SharedWorld, config: &AutosaveConfig, stop: &AtomicBool) {
    info!(
        "autosave timer running: {:?} idle threshold, saving to {}",
        config.idle_threshold,
        config.path.display()
    );
    let mut reference = Instant::now();
    let mut seen_save_count = world.lock().save_count;
    while !stop.load(Ordering::Relaxed) {
        thread::sleep(config.poll_interval);
        if stop.load(Ordering::Relaxed) {
            break;
        }
        let current = world.lock().save_count;
        if current != seen_save_count {
            // a manual save landed; re-arm
            seen_save_count = current;
            reference = Instant::now();
            continue;
        }
        if reference.elapsed() < config.idle_threshold {
            continue;
        }
        {
            let guard = world.lock();
            println!("\nAutosaving to {}", config.path.display());
            if let Err(err) = save_game(&guard, &config.path) {
                warn!("autosave to {} failed: {err:#}", config.path.display());
            }
        }
        reference = Instant::now();
    }
    info!("autosave timer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RoomGraph;
    use crate::save_files::load_game;
    use crate::world::GameWorld;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tempfile::tempdir;

    fn shared_world() -> SharedWorld {
        let mut rng = StdRng::seed_from_u64(77);
        let graph = Arc::new(RoomGraph::random(4, &mut rng));
        let mut world = GameWorld::new(graph);
        world.organize_items(&mut rng).unwrap();
        SharedWorld::new(world)
    }

    fn fast_config(path: PathBuf) -> AutosaveConfig {
        AutosaveConfig {
            path,
            poll_interval: Duration::from_millis(10),
            idle_threshold: Duration::from_millis(50),
        }
    }

    #[test]
    fn standard_cadence_is_one_second_and_one_minute() {
        let config = AutosaveConfig::new(PathBuf::from("x"));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.idle_threshold, Duration::from_secs(60));
    }

    #[test]
    fn fires_after_idle_threshold() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auto");
        let shared = shared_world();
        let timer = AutosaveTimer::spawn(shared.clone(), fast_config(path.clone()));
        thread::sleep(Duration::from_millis(500));
        timer.shutdown();

        let restored = load_game(&path).unwrap();
        let original = shared.lock();
        assert_eq!(restored.current_room, original.current_room);
        assert_eq!(restored.item_location, original.item_location);
    }

    #[test]
    fn shutdown_before_threshold_leaves_no_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auto");
        let shared = shared_world();
        let config = AutosaveConfig {
            path: path.clone(),
            poll_interval: Duration::from_millis(10),
            idle_threshold: Duration::from_secs(60),
        };
        let timer = AutosaveTimer::spawn(shared, config);
        // stop long before the minute of idleness can elapse
        timer.shutdown();
        assert!(!path.exists());
    }
}
