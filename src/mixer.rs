use tracing::trace;

use crate::{
    channel::Channel,
    device::{AudioSink, BYTES_PER_FRAME},
    MIX_CHUNK_FRAMES,
};

/*
Mixing and Quantization
=======================

A mix request asks for N stereo frames. The device is asked once, up front,
how much room it has; the request is cut down to that, so the mixer never
produces audio the device would have to drop.

The work then proceeds in fixed chunks of MIX_CHUNK_FRAMES frames so the
scratch buffers stay small no matter how large the request is:

  for each chunk:
    1. zero the float accumulator (interleaved L R L R ...)
    2. every enabled channel adds its frames, scaled by its own gains
    3. scale the whole chunk by the master volume
    4. quantize to i16 and hand the chunk to the device

Quantization
------------

    pcm = round(sample × 32768)

Full scale is [-1.0, +1.0). There is no limiter in front of the cast: a
float outside that range lands on i16::MIN / i16::MAX because Rust's
float-to-int conversion saturates. Keeping the mix inside range is the
caller's business (channel and master volume).
*/

/// Convert one float sample to 16-bit PCM.
#[inline]
pub fn quantize_sample(sample: f32) -> i16 {
    (sample * 32768.0).round() as i16
}

/// Quantize a buffer of float samples into `out`.
#[inline]
pub fn quantize(samples: &[f32], out: &mut [i16]) {
    debug_assert_eq!(samples.len(), out.len());

    for (o, &s) in out.iter_mut().zip(samples.iter()) {
        *o = quantize_sample(s);
    }
}

/// Multiply a buffer by a gain in place.
#[inline]
pub fn apply_gain(samples: &mut [f32], gain: f32) {
    for sample in samples.iter_mut() {
        *sample *= gain;
    }
}

/// Sum every enabled channel into `out`, an interleaved stereo buffer.
///
/// `out` is zeroed first; boxes that contribute nothing leave it at zero.
pub fn mix_process(channels: &mut [Channel], master_volume: f32, out: &mut [f32]) {
    debug_assert!(out.len() % 2 == 0);

    out.fill(0.0);
    for channel in channels.iter_mut() {
        channel.render_into(out);
    }
    apply_gain(out, master_volume);
}

/// Chunked mixer with its scratch buffers.
#[derive(Debug, Clone)]
pub struct Mixer {
    floats: [f32; MIX_CHUNK_FRAMES * 2],
    pcm: [i16; MIX_CHUNK_FRAMES * 2],
}

impl Mixer {
    pub fn new() -> Self {
        Self {
            floats: [0.0; MIX_CHUNK_FRAMES * 2],
            pcm: [0; MIX_CHUNK_FRAMES * 2],
        }
    }

    /// Mix up to `frames` stereo frames into `sink`.
    ///
    /// Returns the number of frames produced: `frames`, or less if the sink
    /// reported less room before mixing started.
    pub fn mix<S: AudioSink + ?Sized>(
        &mut self,
        channels: &mut [Channel],
        frames: usize,
        master_volume: f32,
        sink: &mut S,
    ) -> usize {
        let available = sink.available_bytes() / BYTES_PER_FRAME;
        let produced = frames.min(available);

        let mut remaining = produced;
        while remaining > 0 {
            let nr = remaining.min(MIX_CHUNK_FRAMES);
            let floats = &mut self.floats[..nr * 2];
            let pcm = &mut self.pcm[..nr * 2];

            mix_process(channels, master_volume, floats);
            quantize(floats, pcm);
            sink.write(pcm);

            remaining -= nr;
        }

        trace!(requested = frames, available, produced, "mixed");
        produced
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        boxes::{BoxInstance, SampleBox},
        channel::ChannelParams,
        device::BufferSink,
    };

    fn stereo_channel(data: Vec<f32>, volume: f32) -> Channel {
        let mut samples = SampleBox::new(true);
        samples.load(data);
        let mut channel = Channel::new();
        channel.push(BoxInstance::Samples(samples));
        channel.set(ChannelParams::new().enabled(true).volume(volume));
        channel
    }

    #[test]
    fn quantize_rounds_to_nearest() {
        assert_eq!(quantize_sample(0.0), 0);
        assert_eq!(quantize_sample(0.5), 16384);
        assert_eq!(quantize_sample(-0.5), -16384);
        assert_eq!(quantize_sample(-1.0), i16::MIN);
        // 0.1 × 32768 = 3276.8
        assert_eq!(quantize_sample(0.1), 3277);
    }

    #[test]
    fn quantize_buffer() {
        let mut out = [0i16; 3];
        quantize(&[0.25, -0.25, 0.0], &mut out);
        assert_eq!(out, [8192, -8192, 0]);
    }

    #[test]
    fn mix_process_sums_channels_and_applies_master() {
        let mut channels = vec![
            stereo_channel(vec![0.25, 0.5], 1.0),
            stereo_channel(vec![0.25, -0.5], 1.0),
        ];
        let mut out = [9.0f32; 4];
        mix_process(&mut channels, 0.5, &mut out);
        assert_eq!(out, [0.25, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn mix_is_clamped_to_sink_capacity() {
        let mut channels = vec![stereo_channel(vec![0.5; 1000], 1.0)];
        let mut sink = BufferSink::with_capacity(300);
        let mut mixer = Mixer::new();

        let produced = mixer.mix(&mut channels, 1000, 1.0, &mut sink);
        assert_eq!(produced, 300);
        assert_eq!(sink.frames(), 300);
        assert!(sink.samples().iter().all(|&s| s == 16384));
    }

    #[test]
    fn mix_spans_multiple_chunks_without_gaps() {
        let frames = MIX_CHUNK_FRAMES * 2 + 7;
        let ramp: Vec<f32> = (0..frames * 2).map(|i| i as f32 / 32768.0).collect();
        let mut channels = vec![stereo_channel(ramp, 1.0)];
        let mut sink = BufferSink::with_capacity(frames);
        let mut mixer = Mixer::new();

        assert_eq!(mixer.mix(&mut channels, frames, 1.0, &mut sink), frames);
        let expected: Vec<i16> = (0..frames as i16 * 2).collect();
        assert_eq!(sink.samples(), expected.as_slice());
    }

    #[test]
    fn zero_request_writes_nothing() {
        let mut channels = vec![stereo_channel(vec![0.5; 4], 1.0)];
        let mut sink = BufferSink::with_capacity(16);
        assert_eq!(Mixer::new().mix(&mut channels, 0, 1.0, &mut sink), 0);
        assert!(sink.samples().is_empty());
    }
}
