#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod charmap;
mod name_encoder;
mod params;

pub use name_encoder::NameEncoder;
pub use params::{DEFAULT_SEQUENCE_LENGTH, EncoderParams};
