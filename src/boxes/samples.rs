//! Sample playback box.
//!
//! Plays its data once from the start, one sample per mono call or one
//! interleaved pair per stereo call. After the last sample the mono variant
//! passes its input through and the stereo variant contributes nothing, so
//! an exhausted player can stay on a stack without muting what precedes it.
//! Any change event rewinds to the start.

use super::{StereoFrame, SynthBox};

#[derive(Debug, Clone)]
pub struct SampleBox {
    stereo: bool,
    data: Vec<f32>,
    head: usize,
}

impl SampleBox {
    pub fn new(stereo: bool) -> Self {
        Self {
            stereo,
            data: Vec::new(),
            head: 0,
        }
    }

    /// Take ownership of the sample data. Stereo data is interleaved
    /// (left, right) and truncated to an even length.
    pub fn load(&mut self, mut data: Vec<f32>) {
        if self.stereo {
            data.truncate(data.len() & !1);
        }
        self.data = data;
        self.head = 0;
    }

    pub fn is_stereo(&self) -> bool {
        self.stereo
    }

    /// Read cursor, in samples.
    pub fn head(&self) -> usize {
        self.head
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.head >= self.data.len()
    }
}

impl SynthBox for SampleBox {
    fn change(&mut self, _param: i32, _elem: f32, _value: f32) {
        self.head = 0;
    }

    fn next_mono(&mut self, input: f32) -> f32 {
        match self.data.get(self.head) {
            Some(&sample) => {
                self.head += 1;
                sample
            }
            None => input,
        }
    }

    fn next_stereo(&mut self) -> Option<StereoFrame> {
        // Even length keeps head + 1 in bounds whenever head is
        let frame = (*self.data.get(self.head)?, *self.data.get(self.head + 1)?);
        self.head += 2;
        Some(frame)
    }

    fn finalize(&mut self) {
        self.data = Vec::new();
        self.head = 0;
    }
}
