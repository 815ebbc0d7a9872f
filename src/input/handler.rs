//! Background input reader feeding the application loop
//!
//! One worker thread waits for stdin to become readable, reads raw chunks
//! and pushes them into a bounded [`RingQueue`]. The main loop calls
//! [`EventHandler::poll`], which never blocks: it takes at most one chunk
//! per call, splits it into sequences and decodes them one at a time.
//!
//! Any OS error from waiting or reading, and end of input, cancels the
//! handler. The application treats a cancelled handler as fatal.

use super::decoder::Decoder;
use super::event::Event;
use super::queue::RingQueue;
use super::split::split;
use super::worker::{CancelToken, Worker};
use crate::config::Config;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Where raw input bytes come from
pub trait InputSource: Send + 'static {
    /// Wait up to `timeout` for input; `Ok(false)` means the wait timed out
    fn wait_readable(&mut self, timeout: Duration) -> io::Result<bool>;

    /// Read whatever is available; `Ok(0)` is end of input
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Standard input, waited on with `poll(2)`
#[derive(Debug, Default)]
pub struct StdinSource {
    _private: (),
}

impl StdinSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputSource for StdinSource {
    fn wait_readable(&mut self, timeout: Duration) -> io::Result<bool> {
        let mut fds = libc::pollfd {
            fd: libc::STDIN_FILENO,
            events: libc::POLLIN,
            revents: 0,
        };
        let millis = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;
        // SAFETY: `fds` is a valid pollfd for the duration of the call
        let ready = unsafe { libc::poll(&mut fds, 1, millis) };
        if ready < 0 {
            return Err(io::Error::last_os_error());
        }
        if ready == 0 {
            return Ok(false);
        }
        if fds.revents & (libc::POLLERR | libc::POLLNVAL) != 0 {
            return Err(io::Error::other(format!(
                "stdin poll reported revents {:#x}",
                fds.revents
            )));
        }
        // POLLHUP counts as readable so the next read observes end of input
        Ok(true)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // SAFETY: `buf` is valid for writes of `buf.len()` bytes
        let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(n as usize)
        }
    }
}

/// Settings the reader thread needs
#[derive(Debug, Clone, Copy)]
struct ReaderSettings {
    poll_timeout: Duration,
    chunk_size: usize,
}

/// Receives raw input on a background thread and decodes it on demand
#[derive(Debug)]
pub struct EventHandler {
    decoder: Decoder,
    queue: Arc<RingQueue<Vec<u8>>>,
    pending: VecDeque<Vec<u8>>,
    failure: Arc<Mutex<Option<String>>>,
    worker: Worker,
}

impl EventHandler {
    /// Start reading from stdin
    pub fn start(config: &Config, decoder: Decoder) -> Result<Self> {
        Self::with_source(StdinSource::new(), config, decoder)
    }

    /// Start reading from any input source
    pub fn with_source<S: InputSource>(source: S, config: &Config, decoder: Decoder) -> Result<Self> {
        let queue = Arc::new(RingQueue::new(config.queue_capacity, config.overflow_policy));
        let failure = Arc::new(Mutex::new(None));
        let settings = ReaderSettings {
            poll_timeout: config.poll_timeout,
            chunk_size: config.read_chunk_size.max(1),
        };

        let worker = {
            let queue = queue.clone();
            let failure = failure.clone();
            Worker::start("panelkit-input", move |token| {
                read_loop(source, &queue, &token, &failure, settings);
                queue.close();
            })?
        };

        Ok(EventHandler {
            decoder,
            queue,
            pending: VecDeque::new(),
            failure,
            worker,
        })
    }

    /// Decode the next pending sequence, if any; never blocks
    pub fn poll(&mut self) -> Option<Event> {
        if self.pending.is_empty() {
            let chunk = self.queue.try_pop_front()?;
            self.pending
                .extend(split(&chunk).into_iter().map(<[u8]>::to_vec));
        }
        let seq = self.pending.pop_front()?;
        let event = self.decoder.decode(&seq);
        if matches!(event.kind, super::event::EventKind::Unknown) {
            tracing::debug!(raw = ?event.raw, "undecodable input sequence");
        }
        Some(event)
    }

    /// True once the reader has stopped, by request or because it failed
    pub fn is_cancelled(&self) -> bool {
        self.worker.is_cancelled()
    }

    /// Why the reader stopped on its own, if it did
    pub fn failure(&self) -> Option<String> {
        self.failure.lock().clone()
    }

    /// The error the application loop should report for a cancelled reader
    pub fn fatal_error(&self) -> Error {
        Error::ReaderFatal(
            self.failure()
                .unwrap_or_else(|| "input reader was cancelled".to_string()),
        )
    }

    /// Stop the reader and wait for its thread
    pub fn shutdown(&mut self) -> Result<()> {
        self.worker.cancel();
        self.queue.close();
        self.worker.join()
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        // Wakes a reader blocked on a full queue; the worker joins on its own drop
        self.worker.cancel();
        self.queue.close();
    }
}

fn read_loop<S: InputSource>(
    mut source: S,
    queue: &RingQueue<Vec<u8>>,
    token: &CancelToken,
    failure: &Mutex<Option<String>>,
    settings: ReaderSettings,
) {
    let fail = |reason: String| {
        tracing::error!(reason = %reason, "input reader stopped");
        *failure.lock() = Some(reason);
        token.cancel();
    };

    let mut buf = vec![0u8; settings.chunk_size];
    tracing::debug!(chunk_size = settings.chunk_size, "input reader running");
    while !token.is_cancelled() {
        match source.wait_readable(settings.poll_timeout) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                fail(format!("waiting for input failed: {err}"));
                break;
            }
        }
        if token.is_cancelled() {
            break;
        }

        let n = match source.read(&mut buf) {
            Ok(0) => {
                fail("end of input".to_string());
                break;
            }
            Ok(n) => n,
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
                ) =>
            {
                continue
            }
            Err(err) => {
                fail(format!("reading input failed: {err}"));
                break;
            }
        };

        match queue.put(buf[..n].to_vec()) {
            Ok(None) => {}
            Ok(Some(dropped)) => {
                tracing::debug!(bytes = dropped.len(), "input queue full, dropped oldest chunk");
            }
            Err(Error::QueueClosed) => break,
            Err(err) => tracing::warn!(error = %err, bytes = n, "dropped input chunk"),
        }
    }
    tracing::debug!("input reader exiting");
}
