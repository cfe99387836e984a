use std::sync::{LazyLock, Mutex};

use ort::session::{Session, builder::GraphOptimizationLevel};

mod config {
    include!(concat!(env!("OUT_DIR"), "/model_config.rs"));
}

pub use config::{NEGATIVE_LABEL, POSITIVE_LABEL, SEQUENCE_LENGTH};

/// Version of the deployed model artifact pack.
pub const MODEL_VERSION: &str = env!("MODEL_VERSION");

static MODEL_BYTES: &[u8] = include_bytes!(concat!(
    env!("MODEL_ARTIFACTS_DIR"),
    "/",
    env!("CLASSIFIER_MODEL_FILENAME")
));

/// Process-global classifier session, created on first use and held for
/// the remainder of the process lifetime.
pub static MODEL: LazyLock<Mutex<Session>> = LazyLock::new(|| {
    Mutex::new(
        Session::builder()
            .expect("Unable to create ONNX Runtime session builder")
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .expect("Unable to set optimization level")
            .with_intra_threads(4)
            .expect("Unable to set intra threads")
            .commit_from_memory(MODEL_BYTES)
            .expect("Unable to load model from memory"),
    )
});
