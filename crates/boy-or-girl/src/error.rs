use thiserror::Error;

/// Failures surfaced by the prediction pipeline.
///
/// Encoding is total and never fails; every error here originates at the
/// classifier boundary. There is no retry and no partial-batch recovery;
/// one failure aborts the whole batch.
#[derive(Debug, Error)]
pub enum PredictionError {
    /// The classifier invocation itself failed.
    #[error("classifier invocation failed")]
    Classifier(#[from] ort::Error),

    /// The classifier returned a tensor this pipeline cannot interpret.
    /// Accepted shapes are `[batch]` and `[batch, 1]`.
    #[error("unexpected classifier output shape {0:?}")]
    OutputShape(Vec<usize>),
}
