//! Application main loop
//!
//! Each iteration checks the terminal size, draws a frame, polls at most one
//! input chunk without blocking, dispatches it, hands it to the caller and
//! then sleeps until the next frame is due.

use crate::config::Config;
use crate::input::{Decoder, Event, EventHandler};
use crate::screen::Screen;
use crate::terminal::{self, TerminalGeometry, TerminalGuard};
use anyhow::{Context, Result};
use std::time::{Duration, Instant};

/// What the application wants after handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Frame timing for the main loop
#[derive(Debug)]
pub struct FrameTimer {
    frame_duration: Duration,
    last_frame: Instant,
}

impl FrameTimer {
    pub fn new(fps: u32) -> Self {
        Self {
            frame_duration: Duration::from_nanos(1_000_000_000 / fps.max(1) as u64),
            last_frame: Instant::now(),
        }
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Time until next frame (zero if frame is due)
    pub fn time_to_next_frame(&self) -> Duration {
        self.frame_duration.saturating_sub(self.last_frame.elapsed())
    }

    /// Mark frame as rendered, returns true if we're on time
    pub fn tick(&mut self) -> bool {
        let elapsed = self.last_frame.elapsed();
        self.last_frame = Instant::now();
        elapsed <= self.frame_duration
    }

    /// Check if a frame is due now
    pub fn frame_due(&self) -> bool {
        self.last_frame.elapsed() >= self.frame_duration
    }
}

/// A full-screen application: terminal mode, screen and input reader
pub struct App {
    screen: Screen,
    events: EventHandler,
    timer: FrameTimer,
    // Dropped last so the terminal is restored after everything else
    _guard: TerminalGuard,
}

impl App {
    /// Take over the terminal and start reading input
    pub fn new(config: Config) -> Result<Self> {
        let guard = terminal::acquire(&config).context("failed to acquire terminal")?;
        let screen = Screen::new(&config).context("failed to set up screen")?;
        let decoder = Decoder::new(screen.renderer().capabilities());
        let events = EventHandler::start(&config, decoder).context("failed to start input reader")?;
        Ok(App {
            screen,
            events,
            timer: FrameTimer::new(config.target_fps),
            _guard: guard,
        })
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    /// Run until `handler` returns [`Control::Quit`] or something fails
    ///
    /// The terminal is restored before any error is returned.
    pub fn run<F>(mut self, handler: F) -> Result<()>
    where
        F: FnMut(&mut Screen, &Event) -> Control,
    {
        let result = self.run_loop(handler);
        if let Err(err) = self.events.shutdown() {
            tracing::error!(error = %err, "input reader did not shut down cleanly");
        }
        drop(self);
        result
    }

    fn run_loop<F>(&mut self, mut handler: F) -> Result<()>
    where
        F: FnMut(&mut Screen, &Event) -> Control,
    {
        loop {
            self.sync_geometry()?;
            self.screen.draw().context("failed to draw frame")?;

            match self.events.poll() {
                Some(event) => {
                    self.screen.dispatch(&event);
                    if handler(&mut self.screen, &event) == Control::Quit {
                        tracing::debug!("application quit");
                        return Ok(());
                    }
                }
                None if self.events.is_cancelled() => {
                    return Err(self.events.fatal_error()).context("input stopped");
                }
                None => {}
            }

            std::thread::sleep(self.timer.time_to_next_frame());
            if !self.timer.tick() {
                tracing::trace!("frame ran late");
            }
        }
    }

    fn sync_geometry(&mut self) -> Result<()> {
        let current = match TerminalGeometry::detect() {
            Ok(geometry) => geometry,
            Err(err) => {
                tracing::warn!(error = %err, "could not read terminal size");
                return Ok(());
            }
        };
        if current != self.screen.geometry() {
            self.screen
                .resize(current.cols, current.rows)
                .context("failed to resize screen")?;
        }
        Ok(())
    }
}
