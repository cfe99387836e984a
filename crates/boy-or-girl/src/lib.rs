//! # boy-or-girl
//!
//! Predicts whether a first name reads as a boy's or a girl's name.
//!
//! Names are encoded character by character into a fixed-shape matrix,
//! scored by a pre-trained binary classifier (ONNX runtime inference),
//! and the raw sigmoid scores are converted into labelled records with a
//! calibrated confidence in the winning label.
//!
//! ## Quick Start
//!
//! ```no_run
//! use boy_or_girl::Predictor;
//!
//! let predictor = Predictor::new();
//!
//! let predictions = predictor.predict(&["Kamala", "Joe"])?;
//! for prediction in &predictions {
//!     println!(
//!         "{}: {} ({:.0}%)",
//!         prediction.name,
//!         prediction.gender,
//!         prediction.probability * 100.0
//!     );
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Custom Labels
//!
//! ```no_run
//! use boy_or_girl::{Labels, Predictor};
//!
//! // Compact API wording instead of the default pair
//! let predictor = Predictor::new().with_labels(Labels::new("F", "M"));
//! let prediction = predictor.predict_one("Kamala")?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! The classifier is loaded once per process and shared by every
//! predictor; see [`Scorer`] for swapping it out.

#[cfg(feature = "cli")]
pub mod cli;

mod error;
mod model;
mod pipeline;

use anyhow::Context;
use gender_encoding::NameEncoder;

pub use error::PredictionError;
pub use model::{MODEL_VERSION, NEGATIVE_LABEL, POSITIVE_LABEL, SEQUENCE_LENGTH};
pub use pipeline::{DECISION_THRESHOLD, Labels, OnnxScorer, Prediction, Scorer};

/// Builder struct for configuring and running predictions.
///
/// Use `Predictor::new()` for the embedded classifier with the deployed
/// label pair, or chain `.with_labels()` to customize the reported
/// strings.
pub struct Predictor {
    scorer: Box<dyn Scorer>,
    encoder: NameEncoder,
    labels: Labels,
}

impl Predictor {
    /// Create a predictor over the embedded classifier.
    ///
    /// The underlying session is process-global and created on first
    /// prediction.
    #[must_use]
    pub fn new() -> Self {
        Self::with_scorer(OnnxScorer::global())
    }

    /// Create a predictor over a caller-supplied scorer.
    ///
    /// The scorer must return one sigmoid-range score per input row. This
    /// is the seam for exercising the pipeline without the model
    /// artifact.
    pub fn with_scorer(scorer: impl Scorer + 'static) -> Self {
        Self {
            scorer: Box::new(scorer),
            encoder: NameEncoder::new(SEQUENCE_LENGTH),
            labels: Labels::default(),
        }
    }

    /// Replace the reported label pair.
    #[must_use]
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    /// The label pair this predictor reports.
    #[must_use]
    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Predict labels for a batch of names.
    ///
    /// Records come back in input order with exact duplicates collapsed.
    /// An empty batch yields an empty vector without touching the
    /// classifier. A classifier failure aborts the whole batch.
    pub fn predict<T: AsRef<str> + Sync>(&self, names: &[T]) -> anyhow::Result<Vec<Prediction>> {
        pipeline::predict(self.scorer.as_ref(), &self.encoder, &self.labels, names)
            .with_context(|| "Failed to predict gender for the given names")
    }

    /// Predict a single name.
    pub fn predict_one<T: AsRef<str> + Sync>(&self, name: T) -> anyhow::Result<Prediction> {
        self.predict(std::slice::from_ref(&name))?
            .into_iter()
            .next()
            .context("classifier returned no prediction for the name")
    }
}

impl Default for Predictor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use ndarray::Array2;

    use super::*;

    /// Returns a fixed score per row and records how it was called.
    struct StubScorer {
        scores: Vec<f32>,
        calls: Arc<AtomicUsize>,
        seen_shape: Arc<std::sync::Mutex<Option<(usize, usize)>>>,
    }

    impl StubScorer {
        fn new(scores: Vec<f32>) -> Self {
            Self {
                scores,
                calls: Arc::new(AtomicUsize::new(0)),
                seen_shape: Arc::new(std::sync::Mutex::new(None)),
            }
        }
    }

    impl Scorer for StubScorer {
        fn score(&self, input: Array2<f32>) -> Result<Vec<f32>, PredictionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen_shape.lock().unwrap() = Some((input.nrows(), input.ncols()));
            Ok(self.scores.clone())
        }
    }

    #[test]
    fn end_to_end_with_stubbed_scores() {
        let predictor = Predictor::with_scorer(StubScorer::new(vec![0.9, 0.2]))
            .with_labels(Labels::new("F", "M"));

        let predictions = predictor.predict(&["Kamala", "Joe"]).unwrap();

        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].name, "Kamala");
        assert_eq!(predictions[0].gender, "M");
        assert_eq!(predictions[0].probability, 0.9);
        assert_eq!(predictions[1].name, "Joe");
        assert_eq!(predictions[1].gender, "F");
        assert_eq!(predictions[1].probability, 0.8);
    }

    #[test]
    fn scorer_receives_the_full_fixed_shape_batch() {
        let stub = StubScorer::new(vec![0.6, 0.6, 0.6]);
        let shape = Arc::clone(&stub.seen_shape);
        let predictor = Predictor::with_scorer(stub);

        predictor.predict(&["a", "bb", "ccc"]).unwrap();

        assert_eq!(shape.lock().unwrap().unwrap(), (3, SEQUENCE_LENGTH));
    }

    #[test]
    fn empty_batch_never_invokes_the_scorer() {
        let stub = StubScorer::new(vec![]);
        let calls = Arc::clone(&stub.calls);
        let predictor = Predictor::with_scorer(stub);

        let predictions = predictor.predict(&[] as &[&str]).unwrap();

        assert!(predictions.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn duplicate_input_names_collapse_to_one_record() {
        let predictor = Predictor::with_scorer(StubScorer::new(vec![0.2, 0.9, 0.2]));

        let predictions = predictor.predict(&["Alice", "Bob", "Alice"]).unwrap();

        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].name, "Alice");
        assert_eq!(predictions[1].name, "Bob");
    }

    #[test]
    fn predict_one_returns_a_single_record() {
        let predictor = Predictor::with_scorer(StubScorer::new(vec![0.3]));

        let prediction = predictor.predict_one("Joe").unwrap();

        assert_eq!(prediction.name, "Joe");
        assert_eq!(prediction.gender, predictor.labels().negative());
        assert_eq!(prediction.probability, 0.7);
    }

    #[test]
    fn default_labels_match_the_deployed_pair() {
        let predictor = Predictor::with_scorer(StubScorer::new(vec![]));
        assert_eq!(predictor.labels().negative(), NEGATIVE_LABEL);
        assert_eq!(predictor.labels().positive(), POSITIVE_LABEL);
    }

    #[test]
    fn scorer_failure_aborts_the_whole_batch() {
        struct FailingScorer;
        impl Scorer for FailingScorer {
            fn score(&self, input: Array2<f32>) -> Result<Vec<f32>, PredictionError> {
                Err(PredictionError::OutputShape(input.shape().to_vec()))
            }
        }

        let predictor = Predictor::with_scorer(FailingScorer);
        assert!(predictor.predict(&["Kamala", "Joe"]).is_err());
    }
}
