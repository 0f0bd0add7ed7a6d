//! Lifecycle of a session's background actors.
//!
//! One [`Session`] owns the autosave timer, the SIGUSR1 bridge, and the swap
//! listener. Teardown is ordered so nothing is cancelled mid-mutation: the
//! autosave timer stops at a poll boundary, closing the signal stream ends
//! the bridge, and the bridge dropping its sender unblocks the listener.

use crate::autosave::{AutosaveConfig, AutosaveTimer};
use crate::shared::SharedWorld;
use crate::trigger::{spawn_signal_bridge, spawn_swap_listener, SignalBridge};
use anyhow::Result;
use log::{info, warn};
use std::sync::mpsc::channel;
use std::thread::JoinHandle;

/// The background actors of one running game session.
pub struct Session {
    autosave: AutosaveTimer,
    bridge: SignalBridge,
    swap_listener: JoinHandle<()>,
}

impl Session {
    /// Spawn the autosave timer, signal bridge, and swap listener against
    /// `world`.
    ///
    /// # Errors
    /// Fails if the SIGUSR1 stream cannot be registered.
    pub fn start(world: &SharedWorld, autosave: AutosaveConfig) -> Result<Self> {
        let (pulse_tx, pulse_rx) = channel();
        let bridge = spawn_signal_bridge(pulse_tx)?;
        let swap_listener = spawn_swap_listener(world.clone(), pulse_rx);
        let autosave = AutosaveTimer::spawn(world.clone(), autosave);
        info!("session actors started");
        Ok(Self {
            autosave,
            bridge,
            swap_listener,
        })
    }

    /// Tear every actor down and wait for each to finish.
    pub fn shutdown(self) {
        self.autosave.shutdown();
        self.bridge.shutdown();
        if self.swap_listener.join().is_err() {
            warn!("swap listener panicked during shutdown");
        }
        info!("session actors stopped");
    }
}
