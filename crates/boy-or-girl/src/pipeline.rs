use core::fmt;
use std::sync::{LazyLock, Mutex};

use ahash::HashSet;
use gender_encoding::NameEncoder;
use ndarray::{Array2, ArrayViewD};
use ort::{
    session::Session,
    value::{Tensor, Value},
};
use tracing::debug;

use crate::{error::PredictionError, model};

/// Decision boundary on the raw sigmoid score.
///
/// The comparison is strictly greater-than: a score of exactly 0.5 falls
/// to the negative label. The classifier was trained with this convention
/// and switching to `>=` moves classifications at the margin.
pub const DECISION_THRESHOLD: f32 = 0.5;

/// The pair of labels a predictor reports.
///
/// The classifier itself only emits a positive-class score; which strings
/// the two classes surface as is deployment configuration ("Girl"/"Boy"
/// for the dashboard wording, "F"/"M" for the compact API wording).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Labels {
    negative: String,
    positive: String,
}

impl Labels {
    /// Create a label pair, negative class first (class 0, then class 1).
    pub fn new(negative: impl Into<String>, positive: impl Into<String>) -> Self {
        Self {
            negative: negative.into(),
            positive: positive.into(),
        }
    }

    /// Label reported when the score clears [`DECISION_THRESHOLD`].
    #[must_use]
    pub fn positive(&self) -> &str {
        &self.positive
    }

    /// Label reported otherwise.
    #[must_use]
    pub fn negative(&self) -> &str {
        &self.negative
    }
}

impl Default for Labels {
    /// Label pair shipped with the deployed model artifacts.
    fn default() -> Self {
        Self::new(model::NEGATIVE_LABEL, model::POSITIVE_LABEL)
    }
}

impl fmt::Display for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.negative, self.positive)
    }
}

/// A single scored name.
///
/// Serialized field names match the public JSON surface of the service
/// this crate backs.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Prediction {
    /// Input name, echoed verbatim and unnormalized.
    #[serde(rename = "Name")]
    pub name: String,

    /// Reported label, one of the configured pair.
    #[serde(rename = "Gender")]
    pub gender: String,

    /// Confidence in the reported label, rounded to two decimals.
    /// At least 0.5 by construction, except exactly 0.5 at the decision
    /// boundary.
    #[serde(rename = "Probability")]
    pub probability: f32,
}

/// Narrow interface to the opaque binary classifier.
///
/// One sigmoid-range score per input row, in row order. Implementations
/// must be safe for concurrent use; the pipeline adds no locking of its
/// own beyond what the implementation carries.
pub trait Scorer: Send + Sync {
    fn score(&self, input: Array2<f32>) -> Result<Vec<f32>, PredictionError>;
}

/// Scorer backed by the process-global ONNX session.
pub struct OnnxScorer {
    session: &'static LazyLock<Mutex<Session>>,
}

impl OnnxScorer {
    /// Scorer over the embedded model, loaded on first use.
    #[must_use]
    pub fn global() -> Self {
        Self {
            session: &model::MODEL,
        }
    }
}

impl Scorer for OnnxScorer {
    fn score(&self, input: Array2<f32>) -> Result<Vec<f32>, PredictionError> {
        let tensor = prepare_input(input)?;
        {
            let mut session = self.session.lock().unwrap();
            run_inference(&mut session, tensor)
        }
    }
}

fn prepare_input(
    input: Array2<f32>,
) -> Result<Value<ort::value::TensorValueType<f32>>, PredictionError> {
    let shape = input.shape().to_vec();
    let data = input.into_raw_vec_and_offset().0.into_boxed_slice();

    let tensor = Tensor::from_array((shape, data))?;
    Ok(tensor)
}

fn run_inference(
    session: &mut Session,
    input: Value<ort::value::TensorValueType<f32>>,
) -> Result<Vec<f32>, PredictionError> {
    let input_name = session.inputs[0].name.clone();
    let outputs = session.run(ort::inputs![input_name.as_str() => &input])?;
    squeeze_scores(&outputs[0].try_extract_array::<f32>()?)
}

/// Flattens a `[batch]` or `[batch, 1]` score tensor to one scalar per
/// row, squeezing the trailing singleton dimension when present.
fn squeeze_scores(array: &ArrayViewD<'_, f32>) -> Result<Vec<f32>, PredictionError> {
    match array.shape() {
        [_] | [_, 1] => Ok(array.iter().copied().collect()),
        shape => Err(PredictionError::OutputShape(shape.to_vec())),
    }
}

/// Run the full encode, score, postprocess pass for one batch.
///
/// An empty batch yields an empty result without invoking the scorer.
pub(crate) fn predict<T: AsRef<str> + Sync>(
    scorer: &dyn Scorer,
    encoder: &NameEncoder,
    labels: &Labels,
    names: &[T],
) -> Result<Vec<Prediction>, PredictionError> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let matrix = encoder.encode(names);
    debug!(batch = names.len(), "Scoring encoded batch");
    let scores = scorer.score(matrix)?;
    Ok(postprocess(names, &scores, labels))
}

/// Convert raw sigmoid scores into labelled records.
///
/// The reported probability always belongs to the winning label: the raw
/// score when it clears [`DECISION_THRESHOLD`], its complement otherwise.
/// Records keep input order; exact duplicate records collapse to their
/// first occurrence.
fn postprocess<T: AsRef<str>>(names: &[T], scores: &[f32], labels: &Labels) -> Vec<Prediction> {
    debug_assert_eq!(names.len(), scores.len(), "one score per input name");

    let mut seen: HashSet<(String, String, u32)> = HashSet::default();
    let mut predictions = Vec::with_capacity(names.len());

    for (name, &score) in names.iter().zip(scores) {
        let (gender, probability) = if score > DECISION_THRESHOLD {
            (labels.positive(), score)
        } else {
            (labels.negative(), 1.0 - score)
        };
        let probability = round2(probability);

        let name = name.as_ref().to_owned();
        let gender = gender.to_owned();
        // Keyed on the bit pattern so the set only needs hashable parts.
        if seen.insert((name.clone(), gender.clone(), probability.to_bits())) {
            predictions.push(Prediction {
                name,
                gender,
                probability,
            });
        }
    }

    debug!(records = predictions.len(), "Postprocessing complete");
    predictions
}

/// Round to two decimals with `f32::round` semantics (half away from
/// zero).
fn round2(probability: f32) -> f32 {
    (probability * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    fn labels() -> Labels {
        Labels::new("Girl", "Boy")
    }

    #[test]
    fn score_above_threshold_reports_positive_label_and_raw_score() {
        let records = postprocess(&["Kamala"], &[0.8], &labels());
        assert_eq!(records[0].gender, "Boy");
        assert_eq!(records[0].probability, 0.8);
    }

    #[test]
    fn score_below_threshold_reports_negative_label_and_complement() {
        let records = postprocess(&["Joe"], &[0.3], &labels());
        assert_eq!(records[0].gender, "Girl");
        assert_eq!(records[0].probability, 0.7);
    }

    #[test]
    fn exact_threshold_falls_to_the_negative_label() {
        let records = postprocess(&["Sam"], &[0.5], &labels());
        assert_eq!(records[0].gender, "Girl");
        assert_eq!(records[0].probability, 0.5);
    }

    #[test]
    fn barely_above_threshold_is_positive() {
        let records = postprocess(&["Sam"], &[0.500_000_1], &labels());
        assert_eq!(records[0].gender, "Boy");
        assert_eq!(records[0].probability, 0.5);
    }

    #[test]
    fn probabilities_round_to_two_decimals() {
        let records = postprocess(&["Ann", "Bea"], &[0.873_21, 0.128_6], &labels());
        assert_eq!(records[0].probability, 0.87);
        assert_eq!(records[1].probability, 0.87);
    }

    #[test]
    fn duplicate_records_collapse_preserving_first_occurrence_order() {
        let records = postprocess(
            &["Alice", "Bob", "Alice"],
            &[0.2, 0.9, 0.2],
            &labels(),
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Alice");
        assert_eq!(records[1].name, "Bob");
    }

    #[test]
    fn same_name_with_different_scores_does_not_collapse() {
        let records = postprocess(&["Alice", "Alice"], &[0.2, 0.9], &labels());
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn names_are_echoed_verbatim() {
        let records = postprocess(&["  AlIcE  "], &[0.1], &labels());
        assert_eq!(records[0].name, "  AlIcE  ");
    }

    #[test]
    fn squeeze_accepts_flat_and_column_outputs() {
        let flat = ArrayD::from_shape_vec(IxDyn(&[3]), vec![0.1, 0.5, 0.9]).unwrap();
        assert_eq!(squeeze_scores(&flat.view()).unwrap(), vec![0.1, 0.5, 0.9]);

        let column = ArrayD::from_shape_vec(IxDyn(&[3, 1]), vec![0.1, 0.5, 0.9]).unwrap();
        assert_eq!(squeeze_scores(&column.view()).unwrap(), vec![0.1, 0.5, 0.9]);
    }

    #[test]
    fn squeeze_rejects_wide_outputs() {
        let wide = ArrayD::from_shape_vec(IxDyn(&[2, 2]), vec![0.1, 0.9, 0.2, 0.8]).unwrap();
        let err = squeeze_scores(&wide.view()).unwrap_err();
        assert!(matches!(err, PredictionError::OutputShape(shape) if shape == vec![2, 2]));
    }

    #[test]
    fn record_serializes_with_public_field_names() {
        let record = Prediction {
            name: "Kamala".to_string(),
            gender: "F".to_string(),
            probability: 0.9,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["Name"], "Kamala");
        assert_eq!(value["Gender"], "F");
        assert_eq!(value["Probability"], 0.9);
    }

    #[test]
    fn default_labels_come_from_the_artifact_pack() {
        let labels = Labels::default();
        assert_eq!(labels.negative(), model::NEGATIVE_LABEL);
        assert_eq!(labels.positive(), model::POSITIVE_LABEL);
    }

    #[test]
    fn round2_is_half_away_from_zero() {
        assert_eq!(round2(0.875), 0.88);
        assert_eq!(round2(0.5), 0.5);
        assert_eq!(round2(0.994_9), 0.99);
    }
}
