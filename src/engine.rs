//! The engine context: channel table, mixer and configuration in one owner.
//!
//! Every operation takes `&mut self` and runs to completion, so a box can
//! never be freed while the mixer is reading it.

use tracing::{debug, warn};

use crate::{
    boxes::{BoxInstance, BoxKind, SynthBox},
    channel::{Channel, ChannelParams, ChannelTable},
    device::AudioSink,
    error::{Result, SynthError},
    event::{Command, CommandReceiver},
    mixer::Mixer,
    EngineConfig,
};

#[derive(Debug, Clone)]
pub struct Synth {
    config: EngineConfig,
    channels: ChannelTable,
    mixer: Mixer,
}

impl Synth {
    pub fn new(config: EngineConfig) -> Self {
        debug!(sample_rate = config.sample_rate, "synth initialized");
        Self {
            config,
            channels: ChannelTable::new(),
            mixer: Mixer::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn channel(&self, channel: usize) -> Result<&Channel> {
        self.channels.get(channel)
    }

    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter()
    }

    /// Push a registered box kind by name onto a channel's stack.
    pub fn push(&mut self, channel: usize, name: &str) -> Result<&mut BoxInstance> {
        let chan = self.channels.get(channel)?;
        if chan.is_full() {
            return Err(SynthError::StackFull(channel));
        }
        let kind =
            BoxKind::lookup(name).ok_or_else(|| SynthError::UnknownBoxKind(name.to_string()))?;
        self.push_kind(channel, kind)
    }

    /// Push any box kind, including those not reachable by name.
    pub fn push_kind(&mut self, channel: usize, kind: BoxKind) -> Result<&mut BoxInstance> {
        let instance = kind.instantiate(&self.config);
        let chan = self.channels.get_mut(channel)?;
        let depth = chan.boxes().len();
        let pushed = chan.push(instance).ok_or(SynthError::StackFull(channel))?;

        debug!(channel, kind = kind.name(), depth, "box pushed");
        Ok(pushed)
    }

    /// Finalize and remove every box on a channel. Freeing an empty channel
    /// is a no-op.
    pub fn free(&mut self, channel: usize) -> Result<()> {
        let chan = self.channels.get_mut(channel)?;
        if !chan.boxes().is_empty() {
            debug!(channel, boxes = chan.boxes().len(), "channel freed");
        }
        chan.free();
        Ok(())
    }

    /// Update channel parameters. Omitted fields keep their current value.
    pub fn set(&mut self, channel: usize, params: ChannelParams) -> Result<()> {
        self.channels.get_mut(channel)?.set(params);
        Ok(())
    }

    /// Send a change event to the box at `index` on `channel`.
    pub fn change(
        &mut self,
        channel: usize,
        index: usize,
        param: i32,
        value: f32,
        elem: f32,
    ) -> Result<()> {
        let instance = self
            .channels
            .get_mut(channel)?
            .box_mut(index)
            .ok_or(SynthError::InvalidStackIndex { channel, index })?;

        if !instance.capabilities().change {
            return Err(SynthError::ChangeUnsupported {
                channel,
                index,
                kind: instance.kind().name(),
            });
        }

        instance.change(param, elem, value);
        Ok(())
    }

    /// Mix up to `frames` stereo frames into `sink`, returning how many were
    /// produced. Never more than requested, never more than the sink had
    /// room for when the call started.
    pub fn mix<S: AudioSink + ?Sized>(
        &mut self,
        sink: &mut S,
        frames: usize,
        master_volume: f32,
    ) -> usize {
        self.mixer
            .mix(self.channels.as_mut_slice(), frames, master_volume, sink)
    }

    /// [`Synth::mix`] at the configured master volume.
    pub fn mix_default<S: AudioSink + ?Sized>(&mut self, sink: &mut S, frames: usize) -> usize {
        let volume = self.config.master_volume;
        self.mix(sink, frames, volume)
    }

    /// Free and silence one channel, or every channel for `None`.
    pub fn stop(&mut self, channel: Option<usize>) -> Result<()> {
        match channel {
            Some(channel) => {
                self.channels.get_mut(channel)?.stop();
                debug!(channel, "channel stopped");
            }
            None => self.stop_all(),
        }
        Ok(())
    }

    pub fn stop_all(&mut self) {
        for chan in self.channels.iter_mut() {
            chan.stop();
        }
        debug!("all channels stopped");
    }

    /// Replace a channel's stack with a single sample player holding
    /// `samples`. Stereo data is interleaved and truncated to even length.
    pub fn load_samples(&mut self, channel: usize, samples: Vec<f32>, stereo: bool) -> Result<()> {
        let kind = if stereo {
            BoxKind::SamplesStereo
        } else {
            BoxKind::Samples
        };
        let len = samples.len();

        self.free(channel)?;
        let instance = self.push_kind(channel, kind)?;
        if let Some(player) = instance.as_samples_mut() {
            player.load(samples);
        }

        debug!(channel, len, stereo, "samples loaded");
        Ok(())
    }

    /// Apply one queued command.
    pub fn apply(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Push { channel, kind } => self.push(channel, &kind).map(|_| ()),
            Command::Free { channel } => self.free(channel),
            Command::Set { channel, params } => self.set(channel, params),
            Command::Change {
                channel,
                index,
                param,
                value,
                elem,
            } => self.change(channel, index, param, value, elem),
            Command::Stop { channel } => self.stop(channel),
            Command::LoadSamples {
                channel,
                samples,
                stereo,
            } => self.load_samples(channel, samples, stereo),
        }
    }

    /// Apply every pending command. Failures are logged and skipped; the
    /// return value counts the commands that were applied.
    pub fn drain<R: CommandReceiver + ?Sized>(&mut self, rx: &mut R) -> usize {
        let mut applied = 0;
        while let Some(command) = rx.pop() {
            match self.apply(command) {
                Ok(()) => applied += 1,
                Err(err) => warn!(%err, "queued command rejected"),
            }
        }
        applied
    }
}

impl Default for Synth {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{event::NOTE_ON, CHANNELS_MAX, MAX_BOXES};

    #[test]
    fn push_validates_in_order() {
        let mut synth = Synth::default();
        assert_eq!(
            synth.push(CHANNELS_MAX, "test").err(),
            Some(SynthError::InvalidChannel(CHANNELS_MAX))
        );
        assert_eq!(
            synth.push(0, "fm").err(),
            Some(SynthError::UnknownBoxKind("fm".into()))
        );

        for _ in 0..MAX_BOXES {
            synth.push(0, "custom_stereo").unwrap();
        }
        // A full stack is reported before the name is looked at
        assert_eq!(synth.push(0, "fm").err(), Some(SynthError::StackFull(0)));
    }

    #[test]
    fn change_distinguishes_missing_box_from_missing_capability() {
        let mut synth = Synth::default();
        synth.push(2, "test").unwrap();

        assert_eq!(
            synth.change(2, 1, NOTE_ON, 1.0, 0.0),
            Err(SynthError::InvalidStackIndex {
                channel: 2,
                index: 1
            })
        );
        assert_eq!(
            synth.change(2, 0, NOTE_ON, 1.0, 0.0),
            Err(SynthError::ChangeUnsupported {
                channel: 2,
                index: 0,
                kind: "test"
            })
        );
        assert_eq!(
            synth.change(99, 0, NOTE_ON, 1.0, 0.0),
            Err(SynthError::InvalidChannel(99))
        );
    }

    #[test]
    fn change_reaches_ring_box() {
        let mut synth = Synth::default();
        synth.push(0, "custom_stereo").unwrap();
        synth.change(0, 0, NOTE_ON, 0.5, 0.25).unwrap();

        let ring = synth.channel(0).unwrap().boxes()[0].as_ring().unwrap();
        assert_eq!(ring.occupied(), 2);
    }

    #[test]
    fn load_samples_replaces_stack() {
        let mut synth = Synth::default();
        synth.push(1, "test").unwrap();
        synth.push(1, "custom_stereo").unwrap();

        synth.load_samples(1, vec![0.1, 0.2, 0.3], true).unwrap();
        let boxes = synth.channel(1).unwrap().boxes();
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].kind(), BoxKind::SamplesStereo);
        assert_eq!(boxes[0].as_samples().unwrap().len(), 2);
    }

    #[test]
    fn failed_operations_leave_state_untouched() {
        let mut synth = Synth::default();
        synth.set(0, ChannelParams::new().volume(0.3)).unwrap();
        assert!(synth.load_samples(CHANNELS_MAX, vec![1.0], false).is_err());
        assert!(synth.set(CHANNELS_MAX, ChannelParams::new().volume(1.0)).is_err());
        assert_eq!(synth.channel(0).unwrap().volume(), 0.3);
    }
}
