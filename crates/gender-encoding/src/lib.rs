#[cfg(feature = "python")]
mod python;

pub mod encoder;

pub use encoder::{DEFAULT_SEQUENCE_LENGTH, EncoderParams, NameEncoder};
