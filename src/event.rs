//! Event codes and queued commands.
//!
//! `NOTE_ON` / `NOTE_OFF` are opaque to the engine: they travel through the
//! `param` argument of a change and mean whatever the receiving box decides.
//!
//! [`Command`] mirrors every `Synth` operation so a control thread can hand
//! work to the thread that owns the engine without sharing it.

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::channel::ChannelParams;

pub const NOTE_ON: i32 = 0;
pub const NOTE_OFF: i32 = 1;

/// Named constants exposed to hosts.
pub const CONSTANTS: &[(&str, i32)] = &[("NOTE_ON", NOTE_ON), ("NOTE_OFF", NOTE_OFF)];

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Push {
        channel: usize,
        kind: String,
    },
    Free {
        channel: usize,
    },
    Set {
        channel: usize,
        params: ChannelParams,
    },
    Change {
        channel: usize,
        index: usize,
        param: i32,
        value: f32,
        elem: f32,
    },
    /// `None` stops every channel.
    Stop {
        channel: Option<usize>,
    },
    LoadSamples {
        channel: usize,
        samples: Vec<f32>,
        stereo: bool,
    },
}

pub trait CommandReceiver {
    fn pop(&mut self) -> Option<Command>;
}

#[cfg(feature = "rtrb")]
impl CommandReceiver for Consumer<Command> {
    fn pop(&mut self) -> Option<Command> {
        Consumer::pop(self).ok()
    }
}

/// Drain a plain queue, e.g. in tests or offline rendering.
impl CommandReceiver for std::collections::VecDeque<Command> {
    fn pop(&mut self) -> Option<Command> {
        self.pop_front()
    }
}
