//! Signals - subscription registry used by widgets to publish UI events
//!
//! A [`Signal`] keeps callbacks keyed by connection id. A subscription may be
//! tied to a [`LifetimeToken`]; once every clone of the token is dropped the
//! subscription is pruned on the next [`Signal::emit`]. Dropping the signal
//! disconnects everything.
//!
//! ```ignore
//! let token = LifetimeToken::new();
//! let conn = signal.connect_with_token(&token, |info: &MouseInfo| { ... });
//! drop(token); // the callback will not fire again
//! assert!(!conn.is_connected());
//! ```

use std::fmt;
use std::rc::{Rc, Weak};

/// Identifier of a subscription within one signal
pub type ConnectionId = u64;

/// Liveness marker for subscriptions that should die with their owner
#[derive(Debug, Clone, Default)]
pub struct LifetimeToken {
    alive: Rc<()>,
}

impl LifetimeToken {
    pub fn new() -> Self {
        Self::default()
    }

    fn watch(&self) -> Weak<()> {
        Rc::downgrade(&self.alive)
    }
}

/// Handle returned by `connect`, used to query or drop a subscription
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    link: Weak<()>,
    token: Option<Weak<()>>,
}

impl Connection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// False once the subscription was disconnected, its token dropped,
    /// or the signal itself dropped
    pub fn is_connected(&self) -> bool {
        let token_alive = self
            .token
            .as_ref()
            .map(|t| t.strong_count() > 0)
            .unwrap_or(true);
        self.link.strong_count() > 0 && token_alive
    }
}

struct Subscription<T> {
    id: ConnectionId,
    // Held only so the connection's weak link stays upgradable
    _link: Rc<()>,
    token: Option<Weak<()>>,
    callback: Box<dyn FnMut(&T)>,
}

impl<T> Subscription<T> {
    fn is_alive(&self) -> bool {
        self.token
            .as_ref()
            .map(|t| t.strong_count() > 0)
            .unwrap_or(true)
    }
}

/// A list of callbacks invoked with a borrowed payload
pub struct Signal<T> {
    next_id: ConnectionId,
    subscriptions: Vec<Subscription<T>>,
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Signal {
            next_id: 1,
            subscriptions: Vec::new(),
        }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl<T> Signal<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe for the lifetime of the signal
    pub fn connect<F>(&mut self, callback: F) -> Connection
    where
        F: FnMut(&T) + 'static,
    {
        self.subscribe(None, Box::new(callback))
    }

    /// Subscribe until `token` (and all its clones) is dropped
    pub fn connect_with_token<F>(&mut self, token: &LifetimeToken, callback: F) -> Connection
    where
        F: FnMut(&T) + 'static,
    {
        self.subscribe(Some(token.watch()), Box::new(callback))
    }

    fn subscribe(&mut self, token: Option<Weak<()>>, callback: Box<dyn FnMut(&T)>) -> Connection {
        let id = self.next_id;
        self.next_id += 1;

        let link = Rc::new(());
        let connection = Connection {
            id,
            link: Rc::downgrade(&link),
            token: token.clone(),
        };
        self.subscriptions.push(Subscription {
            id,
            _link: link,
            token,
            callback,
        });
        connection
    }

    /// Drop a subscription; returns false if it was already gone
    pub fn disconnect(&mut self, connection: &Connection) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != connection.id);
        before != self.subscriptions.len()
    }

    /// Prune expired subscriptions, then invoke the rest in connection order
    ///
    /// Returns how many callbacks ran.
    pub fn emit(&mut self, value: &T) -> usize {
        self.subscriptions.retain(Subscription::is_alive);
        for sub in &mut self.subscriptions {
            (sub.callback)(value);
        }
        self.subscriptions.len()
    }

    /// Number of live subscriptions
    pub fn len(&self) -> usize {
        self.subscriptions.iter().filter(|s| s.is_alive()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}
