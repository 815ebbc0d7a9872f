//! Raw terminal input - decoding, splitting and the reader thread

mod decoder;
mod event;
mod handler;
mod queue;
mod split;
mod worker;

pub use decoder::{decode, Decoder};
pub use event::{
    ArrowDirection, Event, EventKind, Modifiers, MouseAction, MouseButton, MouseReport, NavKey,
    Timestamp,
};
pub use handler::{EventHandler, InputSource, StdinSource};
pub use queue::{OverflowPolicy, RingQueue};
pub use split::split;
pub use worker::{CancelToken, Worker};
