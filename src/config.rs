//! Engine-wide settings fixed at startup.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Settings handed to [`Synth::new`](crate::Synth::new).
///
/// `sample_rate` only matters to boxes that synthesize in real time
/// (the test tone); stored sample data is played back one sample per frame.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Master volume used when the caller doesn't pass one.
    pub master_volume: f32,
}

impl EngineConfig {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    pub fn master_volume(mut self, volume: f32) -> Self {
        self.master_volume = volume;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            master_volume: 1.0,
        }
    }
}
