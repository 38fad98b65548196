use std::f32::consts::TAU;

use super::SynthBox;

/// Pitch of the test tone in Hz.
pub const TEST_TONE_HZ: f32 = 440.0;
/// Peak amplitude of the test tone.
pub const TEST_TONE_LEVEL: f32 = 0.25;

/// Fixed sine used to check that a channel reaches the device.
///
/// It ignores its mono input and has no change capability, so it is
/// normally the first box on a stack.
#[derive(Debug, Clone)]
pub struct ToneBox {
    phase: f32,
    increment: f32,
}

impl ToneBox {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            increment: TEST_TONE_HZ / sample_rate.max(1.0),
        }
    }
}

impl SynthBox for ToneBox {
    fn next_mono(&mut self, _input: f32) -> f32 {
        let sample = (self.phase * TAU).sin() * TEST_TONE_LEVEL;
        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        sample
    }
}
