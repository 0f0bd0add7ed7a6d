//! The asynchronous item-swap trigger.
//!
//! The outside world can nudge a running session (historically via SIGUSR1)
//! and have two random items trade rooms. Mutation never happens inside a
//! signal-handler context: a bridge thread blocks on the signal stream and
//! forwards each delivery as a [`SwapPulse`] over a channel, and a listener
//! thread blocks on that channel and performs one locked mutation per pulse.
//! Tests drive the listener by sending pulses directly.

use crate::shared::SharedWorld;
use crate::style::GameStyle;
use crate::world::GameWorld;
use anyhow::{Context, Result};
use log::{info, warn};
use rand::Rng;
use signal_hook::consts::SIGUSR1;
use signal_hook::iterator::{Handle, Signals};
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

/// One external nudge asking for an inventory perturbation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapPulse;

/// Swap the rooms of two random resting items.
///
/// Picks two distinct item indices by rejection sampling, excluding the held
/// item, then swaps their locations and recomputes both placed flags.
/// Returns the swapped pair, or `None` when fewer than two free items exist.
pub fn apply_swap(world: &mut GameWorld, rng: &mut impl Rng) -> Option<(usize, usize)> {
    let items = world.item_count();
    let reserved = usize::from(world.held_item.is_some());
    if items - reserved < 2 {
        return None;
    }
    loop {
        let a = rng.random_range(0..items);
        let b = rng.random_range(0..items);
        if a != b && Some(a) != world.held_item && Some(b) != world.held_item {
            world.swap_items(a, b);
            return Some((a, b));
        }
    }
}

/// Spawn the listener that applies one swap per received pulse.
///
/// The thread exits cleanly once every [`Sender`] for `pulses` is gone.
pub fn spawn_swap_listener(world: SharedWorld, pulses: Receiver<SwapPulse>) -> JoinHandle<()> {
    thread::spawn(move || {
        info!("swap listener running");
        let mut rng = rand::rng();
        while pulses.recv().is_ok() {
            let (swapped, room_text, status_text) = {
                let mut guard = world.lock();
                let swapped = apply_swap(&mut guard, &mut rng);
                (swapped, guard.room_summary(), guard.status_summary())
            };
            match swapped {
                Some((a, b)) => {
                    println!("\n{}", format!("Swapped item {a} with item {b}.").notice_style());
                    println!("{room_text}");
                    println!("{status_text}");
                    info!("swap trigger exchanged items {a} and {b}");
                },
                None => warn!("swap pulse ignored: not enough free items to swap"),
            }
        }
        info!("swap listener stopped");
    })
}

/// Handle to the thread translating SIGUSR1 deliveries into pulses.
pub struct SignalBridge {
    handle: Handle,
    join: Option<JoinHandle<()>>,
}

/// Register for SIGUSR1 and forward each delivery to `pulses`.
///
/// # Errors
/// Fails if the signal iterator cannot be registered.
pub fn spawn_signal_bridge(pulses: Sender<SwapPulse>) -> Result<SignalBridge> {
    let mut signals = Signals::new([SIGUSR1]).context("registering SIGUSR1 handler")?;
    let handle = signals.handle();
    let join = thread::spawn(move || {
        for signal in &mut signals {
            if signal == SIGUSR1 && pulses.send(SwapPulse).is_err() {
                break;
            }
        }
        info!("signal bridge stopped");
    });
    Ok(SignalBridge { handle, join: Some(join) })
}

impl SignalBridge {
    /// Close the signal stream and wait for the forwarder to finish.
    ///
    /// Dropping the forwarder also drops its pulse sender, which is what
    /// unblocks the swap listener.
    pub fn shutdown(mut self) {
        self.handle.close();
        if let Some(join) = self.join.take()
            && join.join().is_err()
        {
            warn!("signal bridge panicked during shutdown");
        }
    }
}

impl Drop for SignalBridge {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}
