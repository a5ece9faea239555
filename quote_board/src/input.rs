//! Keyboard pump: a background thread that blocks on the next terminal event
//! and republishes it on a channel, so the main loop can `select!` over
//! input, timers and fetch results without ever blocking on the terminal.
use crossbeam_channel::{Receiver, unbounded};
use crossterm::event::{self, Event};
use log::{debug, error, info};
use std::thread;

/// Spawns the pump. It stops when the receiver is dropped or reading the
/// terminal fails; in both cases the channel disconnects.
pub fn spawn_input_pump() -> Receiver<Event> {
    let (tx, rx) = unbounded::<Event>();
    thread::spawn(move || {
        info!("Input pump started");
        loop {
            match event::read() {
                Ok(event) => {
                    if tx.send(event).is_err() {
                        debug!("Input receiver dropped");
                        break;
                    }
                }
                Err(e) => {
                    error!("Terminal read failed: {}", e);
                    break;
                }
            }
        }
        info!("Input pump stopping...");
    });
    rx
}
