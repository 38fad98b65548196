pub mod boxes; // Box kinds and their per-instance state
pub mod channel; // Box stacks with volume/pan and the channel table
pub mod config;
pub mod device; // PCM sinks the mixer writes into
pub mod engine; // The `Synth` context object and its operations
pub mod error;
pub mod event; // Event codes and the queued command interface
pub mod mixer;

pub use config::EngineConfig;
pub use engine::Synth;
pub use error::{Result, SynthError};

/// Number of channels in the table.
pub const CHANNELS_MAX: usize = 32;
/// Maximum number of boxes stacked on one channel.
pub const MAX_BOXES: usize = 8;
/// Stereo frames mixed per chunk before handing PCM to the device.
pub const MIX_CHUNK_FRAMES: usize = 128;
