use std::collections::HashMap;
use log::warn;

use crate::profile::UserProfile;

/// Per-column lookup tables from category label to the integer code the
/// classifier was trained on.
pub type EncoderTables = HashMap<String, HashMap<String, i64>>;

/// Value substituted for columns the engine does not know how to fill.
pub const NEUTRAL_VALUE: f32 = 3.0;

/// A feature column the classifier may declare, resolved from its trained name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureColumn {
    Age,
    Gender,
    Platform,
    UserExperience,
    ColorScheme,
    VisualHierarchy,
    ImagesMultimedia,
    Layout,
    MobileResponsiveness,
    CtaButtons,
    FormsInputFields,
    FeedbackErrorMessages,
    LoadingSpeed,
    Personalization,
    Accessibility,
    AnimationTransitions,
    ScrollingBehavior,
    GesturesTouchControls,
    SearchFunctionality,
    SocialMediaIntegration,
}

/// The raw value a profile holds for one column, before encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    Numeric(f32),
    Category(&'static str),
}

impl FeatureValue {
    /// The key used to look the value up in an encoder table.
    fn lookup_key(&self) -> String {
        match self {
            Self::Numeric(v) => v.to_string(),
            Self::Category(label) => (*label).to_string(),
        }
    }
}

impl FeatureColumn {
    pub const ALL: [FeatureColumn; 20] = [
        Self::Age,
        Self::Gender,
        Self::Platform,
        Self::UserExperience,
        Self::ColorScheme,
        Self::VisualHierarchy,
        Self::ImagesMultimedia,
        Self::Layout,
        Self::MobileResponsiveness,
        Self::CtaButtons,
        Self::FormsInputFields,
        Self::FeedbackErrorMessages,
        Self::LoadingSpeed,
        Self::Personalization,
        Self::Accessibility,
        Self::AnimationTransitions,
        Self::ScrollingBehavior,
        Self::GesturesTouchControls,
        Self::SearchFunctionality,
        Self::SocialMediaIntegration,
    ];

    /// The column name as it appears in the training data.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Gender => "Gender",
            Self::Platform => "Platform",
            Self::UserExperience => "User_experience",
            Self::ColorScheme => "Color Scheme",
            Self::VisualHierarchy => "Visual Hierarchy",
            Self::ImagesMultimedia => "Images and Multimedia",
            Self::Layout => "Layout",
            Self::MobileResponsiveness => "Mobile Responsiveness",
            Self::CtaButtons => "CTA (Call to Action) Buttons",
            Self::FormsInputFields => "Forms and Input Fields",
            Self::FeedbackErrorMessages => "Feedback and Error Messages",
            Self::LoadingSpeed => "Loading Speed",
            Self::Personalization => "Personalization",
            Self::Accessibility => "Accessibility",
            Self::AnimationTransitions => "Animation and Transitions",
            Self::ScrollingBehavior => "Scrolling_Behavior",
            Self::GesturesTouchControls => "Gestures and Touch Controls",
            Self::SearchFunctionality => "Search Functionality",
            Self::SocialMediaIntegration => "Social_Media_Integration",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|column| column.name() == name)
    }

    pub fn value(&self, profile: &UserProfile) -> FeatureValue {
        use FeatureValue::{Category, Numeric};
        match self {
            Self::Age => Numeric(profile.age as f32),
            Self::Gender => Category(profile.gender.as_str()),
            Self::Platform => Category(profile.platform.as_str()),
            Self::UserExperience => Category(profile.user_experience.as_str()),
            Self::ColorScheme => Numeric(profile.color_scheme as f32),
            Self::VisualHierarchy => Numeric(profile.visual_hierarchy as f32),
            Self::ImagesMultimedia => Numeric(profile.images_multimedia as f32),
            Self::Layout => Numeric(profile.layout as f32),
            Self::MobileResponsiveness => Numeric(profile.mobile_responsiveness as f32),
            Self::CtaButtons => Numeric(profile.cta_buttons as f32),
            Self::FormsInputFields => Numeric(profile.forms_input_fields as f32),
            Self::FeedbackErrorMessages => Numeric(profile.feedback_error_messages as f32),
            Self::LoadingSpeed => Numeric(profile.loading_speed as f32),
            Self::Personalization => Numeric(profile.personalization as f32),
            Self::Accessibility => Numeric(profile.accessibility as f32),
            Self::AnimationTransitions => Numeric(profile.animation_transitions as f32),
            Self::ScrollingBehavior => Numeric(profile.scrolling_behavior as f32),
            Self::GesturesTouchControls => Numeric(profile.gestures_touch_controls as f32),
            Self::SearchFunctionality => Numeric(profile.search_functionality as f32),
            Self::SocialMediaIntegration => Numeric(profile.social_media_integration as f32),
        }
    }
}

/// Encodes a single value for `column_name`.
///
/// A table miss yields code 0 and a warning. A categorical value with no table
/// also yields 0, since there is no numeric form to pass through.
fn encode_value(column_name: &str, value: FeatureValue, encoders: &EncoderTables) -> f32 {
    match (encoders.get(column_name), value) {
        (Some(table), value) => {
            let key = value.lookup_key();
            match table.get(&key) {
                Some(&code) => code as f32,
                None => {
                    warn!(
                        "Unknown category '{}' for column '{}', encoding as 0",
                        key, column_name
                    );
                    0.0
                }
            }
        }
        (None, FeatureValue::Numeric(v)) => v,
        (None, FeatureValue::Category(label)) => {
            warn!(
                "Column '{}' has no encoder table for categorical value '{}', encoding as 0",
                column_name, label
            );
            0.0
        }
    }
}

/// Builds the classifier input vector for `profile`.
///
/// The i-th entry corresponds to `columns[i]`; the order must be the one the
/// classifier was trained with.
pub fn encode_features(
    profile: &UserProfile,
    columns: &[String],
    encoders: &EncoderTables,
) -> Vec<f32> {
    columns
        .iter()
        .map(|name| match FeatureColumn::from_name(name) {
            Some(column) => encode_value(name, column.value(profile), encoders),
            None => {
                warn!("Unrecognized feature column '{}', using neutral value", name);
                NEUTRAL_VALUE
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Gender, Platform, UserExperience};

    fn all_columns() -> Vec<String> {
        FeatureColumn::ALL.iter().map(|c| c.name().to_string()).collect()
    }

    fn tables() -> EncoderTables {
        let mut tables = EncoderTables::new();
        tables.insert(
            "Gender".into(),
            HashMap::from([("female".to_string(), 0), ("male".to_string(), 1)]),
        );
        tables.insert(
            "Platform".into(),
            HashMap::from([
                ("Facebook".to_string(), 0),
                ("Instagram".to_string(), 1),
                ("Website".to_string(), 3),
            ]),
        );
        tables.insert(
            "User_experience".into(),
            HashMap::from([("Confusing".to_string(), 2), ("User-Friendly".to_string(), 8)]),
        );
        tables
    }

    #[test]
    fn test_length_matches_columns() {
        let columns = all_columns();
        let encoded = encode_features(&UserProfile::default(), &columns, &tables());
        assert_eq!(encoded.len(), columns.len());

        let encoded = encode_features(&UserProfile::default(), &[], &tables());
        assert!(encoded.is_empty());
    }

    #[test]
    fn test_order_follows_artifact() {
        let profile = UserProfile {
            age: 42,
            accessibility: 5,
            layout: 2,
            ..UserProfile::default()
        };
        let columns = vec![
            "Layout".to_string(),
            "Age".to_string(),
            "Accessibility".to_string(),
        ];
        let encoded = encode_features(&profile, &columns, &tables());
        assert_eq!(encoded, vec![2.0, 42.0, 5.0]);
    }

    #[test]
    fn test_categorical_lookup() {
        let profile = UserProfile {
            gender: Gender::Female,
            platform: Platform::Website,
            user_experience: UserExperience::Confusing,
            ..UserProfile::default()
        };
        let columns = vec![
            "Gender".to_string(),
            "Platform".to_string(),
            "User_experience".to_string(),
        ];
        assert_eq!(encode_features(&profile, &columns, &tables()), vec![0.0, 3.0, 2.0]);
    }

    #[test]
    fn test_unknown_category_falls_back_to_zero() {
        let profile = UserProfile {
            platform: Platform::Youtube,
            ..UserProfile::default()
        };
        let encoded = encode_features(&profile, &["Platform".to_string()], &tables());
        assert_eq!(encoded, vec![0.0]);
    }

    #[test]
    fn test_categorical_without_table_is_zero() {
        let encoded = encode_features(
            &UserProfile::default(),
            &["Gender".to_string()],
            &EncoderTables::new(),
        );
        assert_eq!(encoded, vec![0.0]);
    }

    #[test]
    fn test_numeric_column_with_table_is_looked_up() {
        let mut tables = EncoderTables::new();
        tables.insert("Layout".into(), HashMap::from([("4".to_string(), 11)]));
        let encoded = encode_features(&UserProfile::default(), &["Layout".to_string()], &tables);
        assert_eq!(encoded, vec![11.0]);
    }

    #[test]
    fn test_unrecognized_column_uses_neutral_value() {
        let columns = vec!["Age".to_string(), "Shoe Size".to_string()];
        let encoded = encode_features(&UserProfile::default(), &columns, &tables());
        assert_eq!(encoded, vec![25.0, NEUTRAL_VALUE]);
    }

    #[test]
    fn test_column_names_round_trip() {
        for column in FeatureColumn::ALL {
            assert_eq!(FeatureColumn::from_name(column.name()), Some(column));
        }
        assert_eq!(FeatureColumn::from_name("age"), None);
    }
}
