/// Sequence length used when no deployment configuration is supplied.
pub const DEFAULT_SEQUENCE_LENGTH: usize = 50;

#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug)]
pub struct EncoderParams {
    /// Fixed character capacity every name is padded or truncated to.
    /// Deployed classifiers are trained against one specific value, so it
    /// must match the model artifact in use.
    sequence_length: usize,
}

impl EncoderParams {
    pub fn new(sequence_length: usize) -> Self {
        assert!(sequence_length > 0, "sequence_length must be positive");
        Self { sequence_length }
    }

    #[must_use]
    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }
}

impl Default for EncoderParams {
    fn default() -> Self {
        Self::new(DEFAULT_SEQUENCE_LENGTH)
    }
}

impl From<usize> for EncoderParams {
    fn from(sequence_length: usize) -> Self {
        Self::new(sequence_length)
    }
}
