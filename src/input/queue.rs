//! Bounded queue between the input reader thread and the main loop

use crate::error::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::str::FromStr;
use std::time::Duration;

/// What `put` does when the queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Wait until the consumer makes room
    Block,
    /// Fail with [`Error::QueueFull`]
    Error,
    /// Drop the oldest entry
    #[default]
    OverwriteOldest,
}

impl FromStr for OverflowPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "block" => Ok(OverflowPolicy::Block),
            "error" => Ok(OverflowPolicy::Error),
            "overwrite" | "overwrite-oldest" | "overwrite_oldest" => {
                Ok(OverflowPolicy::OverwriteOldest)
            }
            other => Err(Error::invalid(format!("unknown overflow policy `{other}`"))),
        }
    }
}

#[derive(Debug)]
struct State<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Fixed-capacity FIFO shared between threads
#[derive(Debug)]
pub struct RingQueue<T> {
    state: Mutex<State<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
    policy: OverflowPolicy,
}

impl<T> RingQueue<T> {
    /// A zero capacity is raised to one
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        let capacity = capacity.max(1);
        RingQueue {
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity,
            policy,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Append `item`, applying the overflow policy when full
    ///
    /// Returns the entry dropped to make room, if any.
    pub fn put(&self, item: T) -> Result<Option<T>> {
        let mut state = self.state.lock();
        let mut dropped = None;
        loop {
            if state.closed {
                return Err(Error::QueueClosed);
            }
            if state.items.len() < self.capacity {
                break;
            }
            match self.policy {
                OverflowPolicy::Block => self.not_full.wait(&mut state),
                OverflowPolicy::Error => return Err(Error::QueueFull),
                OverflowPolicy::OverwriteOldest => {
                    dropped = state.items.pop_front();
                    break;
                }
            }
        }
        state.items.push_back(item);
        drop(state);
        self.not_empty.notify_one();
        Ok(dropped)
    }

    /// Take the oldest entry without waiting
    pub fn try_pop_front(&self) -> Option<T> {
        let item = self.state.lock().items.pop_front();
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /// Take the oldest entry, waiting up to `timeout` for one to arrive
    pub fn pop_front_timeout(&self, timeout: Duration) -> Option<T> {
        let mut state = self.state.lock();
        if state.items.is_empty() && !state.closed {
            let _ = self.not_empty.wait_for(&mut state, timeout);
        }
        let item = state.items.pop_front();
        drop(state);
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /// Refuse further puts and wake every blocked producer
    ///
    /// Entries already queued can still be popped.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }
}
