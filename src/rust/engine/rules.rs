//! Business rules applied on top of the classifier's output.
//!
//! The age rule below is a demonstration override: it replaces the class the
//! classifier picked, while the classifier's probabilities are kept verbatim
//! for display. The two are not reconciled.

use log::debug;

use super::prediction::{EngagementClass, Prediction, RawPrediction};
use crate::profile::UserProfile;

/// Users at or above this age are treated as low engagement.
pub const SENIOR_AGE: u32 = 60;
/// Users at or below this age are treated as high engagement.
pub const YOUNG_AGE: u32 = 25;

/// The engagement class the override assigns for `age`.
pub fn engagement_for_age(age: u32) -> EngagementClass {
    if age >= SENIOR_AGE {
        EngagementClass::Low
    } else if age <= YOUNG_AGE {
        EngagementClass::High
    } else {
        EngagementClass::Medium
    }
}

/// Replaces the classifier's class with the age-derived one.
///
/// Confidence and probabilities are carried over from `raw` unchanged.
pub fn apply_override(raw: &RawPrediction, profile: &UserProfile) -> Prediction {
    let class = engagement_for_age(profile.age);
    if class != raw.class {
        debug!(
            "Age override: classifier chose '{}', using '{}' for age {}",
            raw.class, class, profile.age
        );
    }
    Prediction {
        class,
        confidence: raw.confidence,
        probabilities: raw.probabilities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_thresholds() {
        assert_eq!(engagement_for_age(65), EngagementClass::Low);
        assert_eq!(engagement_for_age(60), EngagementClass::Low);
        assert_eq!(engagement_for_age(59), EngagementClass::Medium);
        assert_eq!(engagement_for_age(40), EngagementClass::Medium);
        assert_eq!(engagement_for_age(26), EngagementClass::Medium);
        assert_eq!(engagement_for_age(25), EngagementClass::High);
        assert_eq!(engagement_for_age(18), EngagementClass::High);
    }

    #[test]
    fn test_override_keeps_probabilities() {
        let raw = RawPrediction {
            class: EngagementClass::High,
            confidence: 0.8,
            probabilities: [0.05, 0.15, 0.8],
        };
        let profile = UserProfile {
            age: 70,
            ..UserProfile::default()
        };
        let prediction = apply_override(&raw, &profile);
        assert_eq!(prediction.class_index(), 0);
        assert_eq!(prediction.class_name(), "Low Engagement");
        assert_eq!(prediction.probabilities, raw.probabilities);
        assert_eq!(prediction.confidence, raw.confidence);
    }

    #[test]
    fn test_override_ignores_everything_but_age() {
        let raw = RawPrediction {
            class: EngagementClass::Low,
            confidence: 0.9,
            probabilities: [0.9, 0.05, 0.05],
        };
        let a = UserProfile {
            age: 40,
            accessibility: 1,
            ..UserProfile::default()
        };
        let b = UserProfile {
            age: 40,
            accessibility: 5,
            animation_transitions: 1,
            ..UserProfile::default()
        };
        assert_eq!(apply_override(&raw, &a).class, apply_override(&raw, &b).class);
        assert_eq!(apply_override(&raw, &a).class, EngagementClass::Medium);
    }
}
