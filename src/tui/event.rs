//! Terminal and tunnel events, funneled into one queue for the UI loop.

use std::sync::mpsc::{self, Receiver, RecvError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use tracing::warn;

use crate::tunnel::TunnelEvent;

#[derive(Debug)]
pub enum Event {
    /// Refresh interval elapsed.
    Tick,
    Key(KeyEvent),
    Resize(u16, u16),
    Tunnel(TunnelEvent),
}

/// Polls the terminal on a background thread and emits ticks.
pub struct EventHandler {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let poll_tx = tx.clone();

        let spawned = thread::Builder::new()
            .name("events".into())
            .spawn(move || {
                let mut last_tick = Instant::now();
                loop {
                    let timeout = tick_rate.saturating_sub(last_tick.elapsed());
                    let polled = match event::poll(timeout) {
                        Ok(ready) => ready,
                        Err(e) => {
                            warn!(error = %e, "terminal poll failed");
                            return;
                        }
                    };
                    if polled {
                        let sent = match event::read() {
                            Ok(CrosstermEvent::Key(key)) => poll_tx.send(Event::Key(key)),
                            Ok(CrosstermEvent::Resize(w, h)) => poll_tx.send(Event::Resize(w, h)),
                            Ok(_) => Ok(()),
                            Err(e) => {
                                warn!(error = %e, "terminal read failed");
                                return;
                            }
                        };
                        if sent.is_err() {
                            return;
                        }
                    }
                    if last_tick.elapsed() >= tick_rate {
                        if poll_tx.send(Event::Tick).is_err() {
                            return;
                        }
                        last_tick = Instant::now();
                    }
                }
            });
        if let Err(e) = spawned {
            warn!(error = %e, "unable to spawn event thread");
        }

        Self { tx, rx }
    }

    /// Sender for events produced off the UI thread.
    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    /// Blocks until the next event.
    pub fn next(&self) -> Result<Event, RecvError> {
        self.rx.recv()
    }
}
