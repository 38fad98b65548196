//! Box kinds and the instances stacked on a channel.
//!
//! A box is a small unit of audio behaviour. Each kind declares which of the
//! optional capabilities it has (accepting change events, producing a mono
//! sample, producing a stereo pair); the channel skips the ones a kind
//! lacks. Instance state is typed per kind, so a `BoxInstance` is a closed
//! enum rather than an opaque block of memory.

/// Bounded FIFO of (value, envelope) pairs played out as stereo frames.
pub mod ring;
/// One-shot playback of caller-supplied sample data.
pub mod samples;
/// Fixed-pitch sine used to check the output path.
pub mod tone;

pub use ring::RingBox;
pub use samples::SampleBox;
pub use tone::ToneBox;

use crate::EngineConfig;

/// A (left, right) sample pair.
pub type StereoFrame = (f32, f32);

/// The optional capabilities a box kind provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub change: bool,
    pub mono: bool,
    pub stereo: bool,
}

/// Every box kind the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxKind {
    /// `test`: 440 Hz sine, mono.
    Tone,
    /// `custom_stereo`: circular buffer of stereo pairs.
    Custom,
    /// `samples`: mono sample playback.
    Samples,
    /// `samples-stereo`: interleaved stereo sample playback.
    SamplesStereo,
}

/// Kinds that can be pushed by name. Sample players are only created
/// through `Synth::load_samples`, which hands them their data.
const REGISTRY: &[BoxKind] = &[BoxKind::Tone, BoxKind::Custom];

impl BoxKind {
    pub const fn name(self) -> &'static str {
        match self {
            BoxKind::Tone => "test",
            BoxKind::Custom => "custom_stereo",
            BoxKind::Samples => "samples",
            BoxKind::SamplesStereo => "samples-stereo",
        }
    }

    /// Find a registered kind by name.
    pub fn lookup(name: &str) -> Option<Self> {
        REGISTRY.iter().copied().find(|kind| kind.name() == name)
    }

    /// Kinds reachable through [`BoxKind::lookup`], in registry order.
    pub fn registered() -> &'static [BoxKind] {
        REGISTRY
    }

    pub const fn capabilities(self) -> Capabilities {
        match self {
            BoxKind::Tone => Capabilities {
                change: false,
                mono: true,
                stereo: false,
            },
            BoxKind::Custom | BoxKind::SamplesStereo => Capabilities {
                change: true,
                mono: false,
                stereo: true,
            },
            BoxKind::Samples => Capabilities {
                change: true,
                mono: true,
                stereo: false,
            },
        }
    }

    /// Create a freshly initialized instance of this kind.
    pub(crate) fn instantiate(self, config: &EngineConfig) -> BoxInstance {
        match self {
            BoxKind::Tone => BoxInstance::Tone(ToneBox::new(config.sample_rate as f32)),
            BoxKind::Custom => BoxInstance::Custom(RingBox::new()),
            BoxKind::Samples => BoxInstance::Samples(SampleBox::new(false)),
            BoxKind::SamplesStereo => BoxInstance::Samples(SampleBox::new(true)),
        }
    }
}

/// Behaviour shared by all boxes.
///
/// Each method has an inert default; a kind only overrides the capabilities
/// it declares in [`Capabilities`].
pub trait SynthBox {
    /// Handle a change event. `param` is an opaque selector (e.g. `NOTE_ON`),
    /// `elem` an auxiliary value and `value` the primary one.
    fn change(&mut self, _param: i32, _elem: f32, _value: f32) {
        // Default: ignore
    }

    /// Produce the next mono sample given the previous mono box's output.
    fn next_mono(&mut self, input: f32) -> f32 {
        input
    }

    /// Produce the next stereo pair, or `None` when the box has nothing to
    /// contribute this frame. `None` leaves the caller's pair untouched.
    fn next_stereo(&mut self) -> Option<StereoFrame> {
        None
    }

    /// Release owned resources before the box is dropped from its stack.
    fn finalize(&mut self) {}
}

/// A box on a channel stack.
#[derive(Debug, Clone)]
pub enum BoxInstance {
    Tone(ToneBox),
    Custom(RingBox),
    Samples(SampleBox),
}

impl BoxInstance {
    pub fn kind(&self) -> BoxKind {
        match self {
            BoxInstance::Tone(_) => BoxKind::Tone,
            BoxInstance::Custom(_) => BoxKind::Custom,
            BoxInstance::Samples(s) if s.is_stereo() => BoxKind::SamplesStereo,
            BoxInstance::Samples(_) => BoxKind::Samples,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.kind().capabilities()
    }

    pub fn as_ring(&self) -> Option<&RingBox> {
        match self {
            BoxInstance::Custom(ring) => Some(ring),
            _ => None,
        }
    }

    pub fn as_samples(&self) -> Option<&SampleBox> {
        match self {
            BoxInstance::Samples(samples) => Some(samples),
            _ => None,
        }
    }

    pub(crate) fn as_samples_mut(&mut self) -> Option<&mut SampleBox> {
        match self {
            BoxInstance::Samples(samples) => Some(samples),
            _ => None,
        }
    }
}

impl SynthBox for BoxInstance {
    fn change(&mut self, param: i32, elem: f32, value: f32) {
        match self {
            BoxInstance::Tone(b) => b.change(param, elem, value),
            BoxInstance::Custom(b) => b.change(param, elem, value),
            BoxInstance::Samples(b) => b.change(param, elem, value),
        }
    }

    fn next_mono(&mut self, input: f32) -> f32 {
        match self {
            BoxInstance::Tone(b) => b.next_mono(input),
            BoxInstance::Custom(b) => b.next_mono(input),
            BoxInstance::Samples(b) => b.next_mono(input),
        }
    }

    fn next_stereo(&mut self) -> Option<StereoFrame> {
        match self {
            BoxInstance::Tone(b) => b.next_stereo(),
            BoxInstance::Custom(b) => b.next_stereo(),
            BoxInstance::Samples(b) => b.next_stereo(),
        }
    }

    fn finalize(&mut self) {
        match self {
            BoxInstance::Tone(b) => b.finalize(),
            BoxInstance::Custom(b) => b.finalize(),
            BoxInstance::Samples(b) => b.finalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_only_finds_registered_names() {
        assert_eq!(BoxKind::lookup("test"), Some(BoxKind::Tone));
        assert_eq!(BoxKind::lookup("custom_stereo"), Some(BoxKind::Custom));
        assert_eq!(BoxKind::lookup("samples"), None);
        assert_eq!(BoxKind::lookup("Custom_Stereo"), None);
    }

    #[test]
    fn instance_kind_follows_stereo_flag() {
        let config = EngineConfig::default();
        let mono = BoxKind::Samples.instantiate(&config);
        let stereo = BoxKind::SamplesStereo.instantiate(&config);
        assert_eq!(mono.kind(), BoxKind::Samples);
        assert_eq!(stereo.kind(), BoxKind::SamplesStereo);
        assert!(mono.capabilities().mono && !mono.capabilities().stereo);
        assert!(stereo.capabilities().stereo && !stereo.capabilities().mono);
    }

    #[test]
    fn tone_has_no_change_capability() {
        assert!(!BoxKind::Tone.capabilities().change);
        assert!(BoxKind::Custom.capabilities().change);
    }
}
