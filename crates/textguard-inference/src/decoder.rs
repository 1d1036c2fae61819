//! Logit decoding: argmax, softmax confidence, label lookup

use textguard_core::{Error, PredictionResponse, Result};

use crate::engine::ModelOutput;
use crate::label_map::LabelMap;

/// Decode a model output into a label and confidence.
///
/// Only the first row is decoded: the pipeline's contract surfaces one label
/// per call even for multi-text requests. The selected class is the argmax
/// of the row (ties broken by lowest index) and the confidence is the
/// softmax-normalized mass of that class. An index absent from the label map
/// is a hard failure: serving an unlabeled class is worse than an explicit
/// error.
pub fn decode(output: &ModelOutput, labels: &LabelMap) -> Result<PredictionResponse> {
    let row = output
        .logits
        .first()
        .ok_or_else(|| Error::inference("model output contained no rows"))?;
    if row.is_empty() {
        return Err(Error::inference("model output row contained no class scores"));
    }

    let index = argmax(row);
    let confidence = softmax(row)[index];
    let label = labels.get(index)?;

    Ok(PredictionResponse::new(label, confidence))
}

/// Index of the maximum score; the lowest index wins on ties.
fn argmax(scores: &[f32]) -> usize {
    let mut best = 0;
    for (index, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = index;
        }
    }
    best
}

/// Numerically stable softmax.
fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|&s| (s - max).exp()).collect();
    let denom: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / denom).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> LabelMap {
        LabelMap::from_entries([
            (0, "benign".to_string()),
            (1, "spam".to_string()),
            (2, "restricted".to_string()),
        ])
    }

    #[test]
    fn test_decodes_argmax_of_first_row() {
        let output = ModelOutput {
            logits: vec![vec![0.1, 3.0, -1.0]],
        };
        let response = decode(&output, &labels()).unwrap();
        assert_eq!(response.prediction, "spam");
    }

    #[test]
    fn test_only_first_row_is_decoded() {
        let output = ModelOutput {
            logits: vec![vec![5.0, 0.0, 0.0], vec![0.0, 0.0, 5.0]],
        };
        let response = decode(&output, &labels()).unwrap();
        assert_eq!(response.prediction, "benign");
    }

    #[test]
    fn test_tie_breaks_to_lowest_index() {
        let output = ModelOutput {
            logits: vec![vec![2.0, 2.0, 0.5]],
        };
        let response = decode(&output, &labels()).unwrap();
        assert_eq!(response.prediction, "benign");
    }

    #[test]
    fn test_confidence_is_softmax_mass() {
        // Two equal logits: the winner holds exactly half the mass.
        let output = ModelOutput {
            logits: vec![vec![1.0, 1.0]],
        };
        let response = decode(&output, &labels()).unwrap();
        let confidence = response.confidence.unwrap();
        assert!((confidence - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_confidence_in_unit_interval() {
        let output = ModelOutput {
            logits: vec![vec![-40.0, 55.0, 3.0]],
        };
        let confidence = decode(&output, &labels()).unwrap().confidence.unwrap();
        assert!(confidence > 0.0 && confidence <= 1.0);
    }

    #[test]
    fn test_missing_label_is_lookup_error() {
        let sparse = LabelMap::from_entries([(0, "benign".to_string())]);
        let output = ModelOutput {
            logits: vec![vec![0.0, 9.0]],
        };
        assert!(matches!(
            decode(&output, &sparse).unwrap_err(),
            Error::LabelLookup(1)
        ));
    }

    #[test]
    fn test_empty_output_is_inference_error() {
        let output = ModelOutput { logits: vec![] };
        assert!(matches!(
            decode(&output, &labels()).unwrap_err(),
            Error::Inference(_)
        ));
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[0.3, -2.0, 4.5, 0.0]);
        let total: f32 = probs.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }
}
