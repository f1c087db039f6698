use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use super::error::EngineError;

/// Number of engagement classes the classifier distinguishes.
pub const NUM_CLASSES: usize = 3;

/// Display labels, indexed by class index.
pub const CLASS_LABELS: [&str; NUM_CLASSES] = ["Low Engagement", "Medium Engagement", "High Engagement"];

/// Tolerance used when checking that a score vector is already a distribution.
const PROBABILITY_TOLERANCE: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngagementClass {
    Low,
    Medium,
    High,
}

impl EngagementClass {
    pub const ALL: [EngagementClass; NUM_CLASSES] = [Self::Low, Self::Medium, Self::High];

    pub fn index(&self) -> usize {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(&self) -> &'static str {
        CLASS_LABELS[self.index()]
    }
}

impl fmt::Display for EngagementClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The classifier's own verdict: `class` is always the argmax of `probabilities`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPrediction {
    pub class: EngagementClass,
    pub confidence: f32,
    pub probabilities: [f32; NUM_CLASSES],
}

impl RawPrediction {
    /// Turns raw classifier scores into a prediction.
    ///
    /// Scores that already form a distribution are kept as-is; anything else
    /// (logits, unnormalised scores) goes through a softmax. Ties resolve to the
    /// lowest index.
    pub fn from_scores(scores: &[f32]) -> Result<Self, EngineError> {
        if scores.len() != NUM_CLASSES {
            return Err(EngineError::InferenceError(format!(
                "Expected {} class scores, got {}",
                NUM_CLASSES,
                scores.len()
            )));
        }
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(EngineError::InferenceError("Classifier produced non-finite scores".into()));
        }

        let mut probabilities = [0.0f32; NUM_CLASSES];
        probabilities.copy_from_slice(scores);
        if !is_distribution(&probabilities) {
            probabilities = softmax(&probabilities);
        }

        let mut best = 0;
        for (i, p) in probabilities.iter().enumerate() {
            if *p > probabilities[best] {
                best = i;
            }
        }
        let class = EngagementClass::ALL[best];

        Ok(Self {
            class,
            confidence: probabilities[best],
            probabilities,
        })
    }
}

fn is_distribution(values: &[f32; NUM_CLASSES]) -> bool {
    values.iter().all(|v| *v >= 0.0)
        && (values.iter().sum::<f32>() - 1.0).abs() <= PROBABILITY_TOLERANCE
}

fn softmax(values: &[f32; NUM_CLASSES]) -> [f32; NUM_CLASSES] {
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps = (*values).map(|v| (v - max).exp());
    let sum: f32 = exps.iter().sum();
    exps.map(|e| e / sum)
}

/// The prediction shown to the user.
///
/// `class` is the class the engine acted on. It may differ from the argmax of
/// `probabilities`, which are the classifier's scores kept for display.
///
/// Serialized with `classIndex` and `className` next to the stored fields.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub class: EngagementClass,
    pub confidence: f32,
    pub probabilities: [f32; NUM_CLASSES],
}

impl Prediction {
    /// A prediction that did not come from the classifier: full confidence,
    /// all-zero probabilities.
    pub fn synthesized(class: EngagementClass) -> Self {
        Self {
            class,
            confidence: 1.0,
            probabilities: [0.0; NUM_CLASSES],
        }
    }

    pub fn class_index(&self) -> usize {
        self.class.index()
    }

    pub fn class_name(&self) -> &'static str {
        self.class.label()
    }

    pub fn confidence_percent(&self) -> f32 {
        self.confidence * 100.0
    }

    /// Class labels paired with their displayed probability.
    pub fn labelled_probabilities(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        CLASS_LABELS.iter().copied().zip(self.probabilities.iter().copied())
    }

    pub fn is_model_derived(&self) -> bool {
        self.probabilities.iter().any(|p| *p > 0.0)
    }
}

impl Serialize for Prediction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut prediction = serializer.serialize_struct("Prediction", 5)?;
        prediction.serialize_field("class", &self.class)?;
        prediction.serialize_field("classIndex", &self.class_index())?;
        prediction.serialize_field("className", self.class_name())?;
        prediction.serialize_field("confidence", &self.confidence)?;
        prediction.serialize_field("probabilities", &self.probabilities)?;
        prediction.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_of_distribution() -> Result<(), EngineError> {
        let raw = RawPrediction::from_scores(&[0.1, 0.7, 0.2])?;
        assert_eq!(raw.class, EngagementClass::Medium);
        assert_eq!(raw.probabilities, [0.1, 0.7, 0.2]);
        assert!((raw.confidence - 0.7).abs() < f32::EPSILON);
        Ok(())
    }

    #[test]
    fn test_logits_are_normalised() -> Result<(), EngineError> {
        let raw = RawPrediction::from_scores(&[2.0, -1.0, 0.5])?;
        let sum: f32 = raw.probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(raw.probabilities.iter().all(|p| *p >= 0.0));
        assert_eq!(raw.class, EngagementClass::Low);
        assert_eq!(raw.confidence, raw.probabilities[0]);
        Ok(())
    }

    #[test]
    fn test_wrong_arity_is_rejected() {
        assert!(matches!(
            RawPrediction::from_scores(&[0.5, 0.5]),
            Err(EngineError::InferenceError(_))
        ));
        assert!(RawPrediction::from_scores(&[f32::NAN, 0.5, 0.5]).is_err());
    }

    #[test]
    fn test_ties_pick_lowest_index() -> Result<(), EngineError> {
        let raw = RawPrediction::from_scores(&[0.4, 0.4, 0.2])?;
        assert_eq!(raw.class, EngagementClass::Low);
        Ok(())
    }

    #[test]
    fn test_labels() {
        assert_eq!(EngagementClass::from_index(0).map(|c| c.label()), Some("Low Engagement"));
        assert_eq!(EngagementClass::from_index(2).map(|c| c.label()), Some("High Engagement"));
        assert_eq!(EngagementClass::from_index(3), None);
    }

    #[test]
    fn test_synthesized_prediction() {
        let prediction = Prediction::synthesized(EngagementClass::High);
        assert_eq!(prediction.class_index(), 2);
        assert_eq!(prediction.class_name(), "High Engagement");
        assert_eq!(prediction.confidence, 1.0);
        assert_eq!(prediction.probabilities, [0.0; 3]);
        assert!(!prediction.is_model_derived());
    }

    #[test]
    fn test_json_carries_index_and_name() {
        let raw = RawPrediction::from_scores(&[0.2, 0.5, 0.3]).unwrap();
        let prediction = Prediction {
            class: EngagementClass::Low,
            confidence: raw.confidence,
            probabilities: raw.probabilities,
        };
        let json = serde_json::to_value(prediction).unwrap();
        assert_eq!(json["classIndex"], 0);
        assert_eq!(json["className"], "Low Engagement");
        assert_eq!(json["confidence"], 0.5);

        let restored: Prediction = serde_json::from_value(json).unwrap();
        assert_eq!(restored, prediction);
    }
}
