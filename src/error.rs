use thiserror::Error;

/// Errors reported synchronously by [`Synth`](crate::Synth) operations.
///
/// Every operation validates before it mutates, so an `Err` means the
/// channel table is exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthError {
    #[error("wrong channel number {0}")]
    InvalidChannel(usize),

    #[error("wrong stack position {index} on channel {channel}")]
    InvalidStackIndex { channel: usize, index: usize },

    #[error("maximum boxes reached on channel {0}")]
    StackFull(usize),

    #[error("unknown box name {0:?}")]
    UnknownBoxKind(String),

    /// The addressed box exists but has no change capability.
    #[error("box `{kind}` at position {index} on channel {channel} does not accept changes")]
    ChangeUnsupported {
        channel: usize,
        index: usize,
        kind: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, SynthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_position() {
        let err = SynthError::InvalidStackIndex {
            channel: 3,
            index: 5,
        };
        assert_eq!(err.to_string(), "wrong stack position 5 on channel 3");

        let err = SynthError::UnknownBoxKind("fm".into());
        assert_eq!(err.to_string(), "unknown box name \"fm\"");
    }
}
