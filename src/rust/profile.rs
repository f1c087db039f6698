use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::EngineError;

/// Lowest value a survey slider can take.
pub const SLIDER_MIN: u8 = 1;
/// Highest value a survey slider can take.
pub const SLIDER_MAX: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Website,
    Facebook,
    Instagram,
    Twitter,
    Youtube,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Website => "Website",
            Self::Facebook => "Facebook",
            Self::Instagram => "Instagram",
            Self::Twitter => "Twitter",
            Self::Youtube => "Youtube",
        }
    }
}

/// The free-text-like "user experience" answer of the survey.
///
/// Serialized with the exact labels the encoder tables were fitted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserExperience {
    Intuitive,
    #[serde(rename = "User-Friendly")]
    UserFriendly,
    Efficient,
    Engaging,
    #[serde(rename = "Clear and concise")]
    ClearAndConcise,
    #[serde(rename = "Well-structured")]
    WellStructured,
    Adequate,
    Confusing,
    #[serde(rename = "Inconsistent Navigation")]
    InconsistentNavigation,
    #[serde(rename = "Limited Menu Options")]
    LimitedMenuOptions,
}

impl UserExperience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intuitive => "Intuitive",
            Self::UserFriendly => "User-Friendly",
            Self::Efficient => "Efficient",
            Self::Engaging => "Engaging",
            Self::ClearAndConcise => "Clear and concise",
            Self::WellStructured => "Well-structured",
            Self::Adequate => "Adequate",
            Self::Confusing => "Confusing",
            Self::InconsistentNavigation => "Inconsistent Navigation",
            Self::LimitedMenuOptions => "Limited Menu Options",
        }
    }
}

macro_rules! impl_display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display_as_str!(Gender, Platform, UserExperience);

/// The survey record: demographic context plus UI/UX slider ratings.
///
/// Sliders are expected in `1..=5`. The engine does not enforce this; call
/// [`UserProfile::validate`] where the values enter the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub age: u32,
    pub gender: Gender,
    pub platform: Platform,
    pub user_experience: UserExperience,
    pub color_scheme: u8,
    pub visual_hierarchy: u8,
    pub images_multimedia: u8,
    pub layout: u8,
    pub mobile_responsiveness: u8,
    pub cta_buttons: u8,
    pub forms_input_fields: u8,
    pub feedback_error_messages: u8,
    pub loading_speed: u8,
    pub personalization: u8,
    pub accessibility: u8,
    pub animation_transitions: u8,
    pub scrolling_behavior: u8,
    pub gestures_touch_controls: u8,
    pub search_functionality: u8,
    pub social_media_integration: u8,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            age: 25,
            gender: Gender::Male,
            platform: Platform::Website,
            user_experience: UserExperience::UserFriendly,
            color_scheme: 4,
            visual_hierarchy: 4,
            images_multimedia: 4,
            layout: 4,
            mobile_responsiveness: 4,
            cta_buttons: 4,
            forms_input_fields: 4,
            feedback_error_messages: 4,
            loading_speed: 4,
            personalization: 4,
            accessibility: 4,
            animation_transitions: 4,
            scrolling_behavior: 4,
            gestures_touch_controls: 4,
            search_functionality: 4,
            social_media_integration: 4,
        }
    }
}

impl UserProfile {
    fn sliders(&self) -> [(&'static str, u8); 16] {
        [
            ("colorScheme", self.color_scheme),
            ("visualHierarchy", self.visual_hierarchy),
            ("imagesMultimedia", self.images_multimedia),
            ("layout", self.layout),
            ("mobileResponsiveness", self.mobile_responsiveness),
            ("ctaButtons", self.cta_buttons),
            ("formsInputFields", self.forms_input_fields),
            ("feedbackErrorMessages", self.feedback_error_messages),
            ("loadingSpeed", self.loading_speed),
            ("personalization", self.personalization),
            ("accessibility", self.accessibility),
            ("animationTransitions", self.animation_transitions),
            ("scrollingBehavior", self.scrolling_behavior),
            ("gesturesTouchControls", self.gestures_touch_controls),
            ("searchFunctionality", self.search_functionality),
            ("socialMediaIntegration", self.social_media_integration),
        ]
    }

    /// Checks that every field lies in its declared domain.
    ///
    /// Intended for the survey-editing boundary. The engine itself assumes
    /// validated input.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(1..=120).contains(&self.age) {
            return Err(EngineError::ValidationError(format!(
                "Age must be between 1 and 120, got {}",
                self.age
            )));
        }
        if let Some((name, value)) = self
            .sliders()
            .into_iter()
            .find(|(_, v)| !(SLIDER_MIN..=SLIDER_MAX).contains(v))
        {
            return Err(EngineError::ValidationError(format!(
                "Slider '{}' must be between {} and {}, got {}",
                name, SLIDER_MIN, SLIDER_MAX, value
            )));
        }
        Ok(())
    }

    /// Mean of the sliders that drive contrast for highly engaged users.
    pub(crate) fn contrast_affinity(&self) -> f32 {
        let sum = self.color_scheme as f32
            + self.visual_hierarchy as f32
            + self.layout as f32
            + self.accessibility as f32;
        sum / 4.0
    }

    /// Returns a copy of this profile with `update` applied on top.
    pub fn merged(&self, update: &UserProfileUpdate) -> Self {
        let mut next = self.clone();
        update.apply_to(&mut next);
        next
    }
}

/// A partial edit of a [`UserProfile`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfileUpdate {
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub platform: Option<Platform>,
    pub user_experience: Option<UserExperience>,
    pub color_scheme: Option<u8>,
    pub visual_hierarchy: Option<u8>,
    pub images_multimedia: Option<u8>,
    pub layout: Option<u8>,
    pub mobile_responsiveness: Option<u8>,
    pub cta_buttons: Option<u8>,
    pub forms_input_fields: Option<u8>,
    pub feedback_error_messages: Option<u8>,
    pub loading_speed: Option<u8>,
    pub personalization: Option<u8>,
    pub accessibility: Option<u8>,
    pub animation_transitions: Option<u8>,
    pub scrolling_behavior: Option<u8>,
    pub gestures_touch_controls: Option<u8>,
    pub search_functionality: Option<u8>,
    pub social_media_integration: Option<u8>,
}

macro_rules! merge_fields {
    ($src:expr, $dst:expr, $($field:ident),* $(,)?) => {
        $(if let Some(value) = $src.$field {
            $dst.$field = value;
        })*
    };
}

impl UserProfileUpdate {
    pub fn apply_to(&self, profile: &mut UserProfile) {
        merge_fields!(
            self,
            profile,
            age,
            gender,
            platform,
            user_experience,
            color_scheme,
            visual_hierarchy,
            images_multimedia,
            layout,
            mobile_responsiveness,
            cta_buttons,
            forms_input_fields,
            feedback_error_messages,
            loading_speed,
            personalization,
            accessibility,
            animation_transitions,
            scrolling_behavior,
            gestures_touch_controls,
            search_functionality,
            social_media_integration,
        );
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
