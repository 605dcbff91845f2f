use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CEvent, KeyEvent};

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    /// Terminal resized; the next draw picks up the new size.
    Resize,
    Tick,
}

/// Polls crossterm on a background thread and forwards key, resize and tick
/// events over a channel. The thread exits once the receiver is dropped.
pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::channel();
        let tick_rate = Duration::from_millis(tick_rate_ms.max(50));

        thread::spawn(move || {
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate.saturating_sub(last_tick.elapsed());

                if event::poll(timeout).unwrap_or(false) {
                    let forwarded = match event::read() {
                        Ok(CEvent::Key(key)) => Some(Event::Key(key)),
                        Ok(CEvent::Resize(..)) => Some(Event::Resize),
                        Ok(_) => None,
                        Err(e) => {
                            log::error!("Reading terminal events failed: {}", e);
                            break;
                        }
                    };
                    if let Some(ev) = forwarded {
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if tx.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Self { rx }
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}
