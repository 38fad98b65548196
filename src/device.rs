//! Output devices for quantized PCM.
//!
//! The mixer only needs two things from a device: how much room it has
//! right now, and somewhere to put a finished chunk. Everything is
//! interleaved stereo `i16`, so one frame is four bytes.

#[cfg(feature = "rtrb")]
use rtrb::Producer;

/// Bytes in one interleaved stereo 16-bit frame.
pub const BYTES_PER_FRAME: usize = 2 * std::mem::size_of::<i16>();

/// A destination for interleaved stereo PCM.
pub trait AudioSink {
    /// Bytes the device can accept without blocking or dropping.
    fn available_bytes(&self) -> usize;

    /// Accept a chunk of interleaved samples. The mixer never writes more
    /// than the last reported capacity.
    fn write(&mut self, pcm: &[i16]);

    fn available_frames(&self) -> usize {
        self.available_bytes() / BYTES_PER_FRAME
    }
}

/// In-memory sink with a fixed capacity, for offline rendering and tests.
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    samples: Vec<i16>,
    capacity: usize,
}

impl BufferSink {
    /// A sink that accepts up to `frames` stereo frames in total.
    pub fn with_capacity(frames: usize) -> Self {
        Self {
            samples: Vec::with_capacity(frames * 2),
            capacity: frames * 2,
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }

    /// Hand back everything written so far and make the room available again.
    pub fn drain(&mut self) -> Vec<i16> {
        std::mem::take(&mut self.samples)
    }
}

impl AudioSink for BufferSink {
    fn available_bytes(&self) -> usize {
        self.capacity.saturating_sub(self.samples.len()) * std::mem::size_of::<i16>()
    }

    fn write(&mut self, pcm: &[i16]) {
        let room = self.capacity.saturating_sub(self.samples.len());
        self.samples.extend_from_slice(&pcm[..pcm.len().min(room)]);
    }
}

/// Feed a realtime callback through a lock-free ring. The consumer side
/// lives in the audio thread and pops samples as the hardware asks.
#[cfg(feature = "rtrb")]
impl AudioSink for Producer<i16> {
    fn available_bytes(&self) -> usize {
        self.slots() * std::mem::size_of::<i16>()
    }

    fn write(&mut self, pcm: &[i16]) {
        for &sample in pcm {
            if self.push(sample).is_err() {
                break; // drop remainder if full
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_sink_reports_room_in_bytes() {
        let mut sink = BufferSink::with_capacity(10);
        assert_eq!(sink.available_bytes(), 40);
        assert_eq!(sink.available_frames(), 10);

        sink.write(&[1, 2, 3, 4]);
        assert_eq!(sink.available_frames(), 8);
        assert_eq!(sink.frames(), 2);
    }

    #[test]
    fn buffer_sink_never_overfills() {
        let mut sink = BufferSink::with_capacity(1);
        sink.write(&[1, 2, 3, 4]);
        assert_eq!(sink.samples(), &[1, 2]);
        assert_eq!(sink.available_bytes(), 0);

        assert_eq!(sink.drain(), vec![1, 2]);
        assert_eq!(sink.available_frames(), 1);
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn ring_producer_tracks_free_slots() {
        let (mut tx, mut rx) = rtrb::RingBuffer::<i16>::new(8);
        // 8 slots of i16 = 16 bytes = 4 frames
        assert_eq!(tx.available_frames(), 4);

        tx.write(&[1, -1, 2, -2]);
        assert_eq!(tx.available_frames(), 2);
        assert_eq!(rx.pop(), Ok(1));
        assert_eq!(rx.pop(), Ok(-1));
        assert_eq!(tx.available_bytes(), 12);
    }
}
