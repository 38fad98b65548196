//! Channels - one stack of boxes with its mix parameters.
//!
//! The mixer walks each enabled channel once per frame. Stereo-capable boxes
//! set the channel's (left, right) pair when they have something to say;
//! mono-only boxes form a chain on a single running value, each one seeing
//! the previous mono box's output. The mono value is then added to both
//! sides before volume and pan are applied.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    boxes::{BoxInstance, StereoFrame, SynthBox},
    error::{Result, SynthError},
    CHANNELS_MAX, MAX_BOXES,
};

/// Partial update for [`Channel::set`]. `None` fields keep their value.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ChannelParams {
    pub enabled: Option<bool>,
    pub volume: Option<f32>,
    pub pan: Option<f32>,
}

impl ChannelParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn pan(mut self, pan: f32) -> Self {
        self.pan = Some(pan);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Channel {
    stack: Vec<BoxInstance>,
    enabled: bool,
    volume: f32,
    pan: f32,
}

impl Channel {
    /// A disabled, silent channel with an empty stack.
    pub fn new() -> Self {
        Self {
            stack: Vec::with_capacity(MAX_BOXES),
            enabled: false,
            volume: 0.0,
            pan: 0.0,
        }
    }

    /// Append a box. Returns `None` when the stack is already at `MAX_BOXES`.
    pub fn push(&mut self, instance: BoxInstance) -> Option<&mut BoxInstance> {
        if self.is_full() {
            return None;
        }
        self.stack.push(instance);
        self.stack.last_mut()
    }

    /// Finalize every box in stack order and empty the stack.
    pub fn free(&mut self) {
        for instance in self.stack.iter_mut() {
            instance.finalize();
        }
        self.stack.clear();
    }

    pub fn set(&mut self, params: ChannelParams) {
        if let Some(enabled) = params.enabled {
            self.enabled = enabled;
        }
        self.volume = params.volume.unwrap_or(self.volume);
        if let Some(pan) = params.pan {
            self.pan = pan.clamp(-1.0, 1.0);
        }
    }

    /// Free the stack and return to the silent default state.
    pub fn stop(&mut self) {
        self.free();
        self.enabled = false;
        self.volume = 0.0;
        self.pan = 0.0;
    }

    pub fn boxes(&self) -> &[BoxInstance] {
        &self.stack
    }

    pub fn box_mut(&mut self, index: usize) -> Option<&mut BoxInstance> {
        self.stack.get_mut(index)
    }

    pub fn is_full(&self) -> bool {
        self.stack.len() >= MAX_BOXES
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn pan(&self) -> f32 {
        self.pan
    }

    /// Left and right gain from volume and pan (pan is kept in [-1, 1]).
    ///
    /// Pan is a balance control: at 0 both sides get the full volume,
    /// moving towards +1 attenuates the left side and towards -1 the right.
    pub fn gains(&self) -> StereoFrame {
        let left = (1.0 - self.pan).min(1.0);
        let right = (1.0 + self.pan).min(1.0);
        (self.volume * left, self.volume * right)
    }

    /// Run the stack for one frame, before volume and pan.
    pub fn next_frame(&mut self) -> StereoFrame {
        let mut mono = 0.0;
        let mut frame = (0.0, 0.0);

        for instance in self.stack.iter_mut() {
            let caps = instance.capabilities();
            if caps.stereo {
                if let Some(pair) = instance.next_stereo() {
                    frame = pair;
                }
            } else if caps.mono {
                mono = instance.next_mono(mono);
            }
        }

        (frame.0 + mono, frame.1 + mono)
    }

    /// Accumulate `frames` frames into an interleaved stereo buffer.
    /// Does nothing for a disabled channel.
    pub fn render_into(&mut self, out: &mut [f32]) {
        if !self.enabled {
            return;
        }

        let (left_gain, right_gain) = self.gains();
        for pair in out.chunks_exact_mut(2) {
            let (left, right) = self.next_frame();
            pair[0] += left * left_gain;
            pair[1] += right * right_gain;
        }
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

/// The fixed set of channels, indexed `0..CHANNELS_MAX`.
#[derive(Debug, Clone)]
pub struct ChannelTable {
    channels: [Channel; CHANNELS_MAX],
}

impl ChannelTable {
    pub fn new() -> Self {
        Self {
            channels: std::array::from_fn(|_| Channel::new()),
        }
    }

    pub fn get(&self, index: usize) -> Result<&Channel> {
        self.channels
            .get(index)
            .ok_or(SynthError::InvalidChannel(index))
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut Channel> {
        self.channels
            .get_mut(index)
            .ok_or(SynthError::InvalidChannel(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Channel> {
        self.channels.iter_mut()
    }

    pub fn as_mut_slice(&mut self) -> &mut [Channel] {
        &mut self.channels
    }
}

impl Default for ChannelTable {
    fn default() -> Self {
        Self::new()
    }
}
